use super::AnswerSet;
use crate::scoring::ScoreReport;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::Path;

/// Load an answer snapshot from a JSON file.
///
/// The file maps question ids to answer objects; see [`super::Answer`] for
/// the accepted shapes.
pub fn load_answers(path: &Path) -> Result<AnswerSet> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open answers file at {}", path.display()))?;

    let answers: AnswerSet = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse answers file at {}", path.display()))?;

    Ok(answers)
}

/// Save a score report to a JSON file atomically
///
/// Uses atomic-write-file so the file is never left in a corrupted state.
pub fn save_report(path: &Path, report: &ScoreReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, report).context("Failed to serialize score report")?;

    file.commit().context("Failed to save score report")?;

    Ok(())
}
