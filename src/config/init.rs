use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::get_config_path;

/// Starter config written by `quizcast init`. Small but exercises every
/// question kind, a rule of each condition shape, and both output modes
/// (archetype mode commented out so the file scores as-is).
const STARTER_CONFIG: &str = r#"# quizcast configuration
#
# `dimensions` declares the bucket space every weight, boost and rule joins
# on. Unknown names elsewhere in this file are ignored at scoring time, so
# keep this list authoritative.
dimensions: [mood, energy, planning, novelty]

output:
  mode: profile            # profile | archetypes
  range: { min: -3, max: 3 }

questions:
  - id: week
    type: scale
    prompt: "How was your week?"
    scale: { min: 1, max: 7, left: "Rough", right: "Great" }
    weights:
      mood: "scale(-1,+1)"
      energy: "scale(-0.5,+0.5)"

  - id: evening
    type: single
    prompt: "A free evening appears. You..."
    options:
      - label: "Plan tomorrow"
        boosts: { planning: 1.0 }
      - label: "Try a new recipe"
        boosts: { novelty: 1.0, mood: 0.5 }
        flags: [experimenter]

  - id: recharge
    type: multi
    prompt: "What recharges you? (pick up to two)"
    max_select: 2
    options:
      - label: "A long walk"
        boosts: { energy: 0.5 }
      - label: "A tidy desk"
        boosts: { planning: 0.5 }
      - label: "Somewhere new"
        boosts: { novelty: 0.5 }

  - id: notes
    type: open
    prompt: "Anything else on your mind?"
    keywords:
      keysets:
        structure: [schedule, routine, checklist]
      map:
        - keys: structure
          boosts: { planning: 0.8 }
          flags: [organizer]

rules:
  - name: "planner momentum"
    when:
      dimensions_high: { planning: 1.5 }
    then:
      adjust: { energy: 0.5 }
      flags: [momentum]
  - name: "recipe night"
    when:
      any_selected: ["evening.option[Try a new recipe]"]
    then:
      adjust: { energy: 0.3 }

# To rank archetypes instead of printing a profile, set output.mode to
# archetypes and declare vectors over the same dimension names:
#
# archetypes:
#   - key: explorer
#     name: "The Explorer"
#     vector: { novelty: 1.0, energy: 0.7 }
#   - key: vanguard
#     name: "The Vanguard"
#     vector: { planning: 1.0, energy: 0.5 }
"#;

/// Write the starter config file.
///
/// Refuses to overwrite an existing file unless `force` is set. Creates
/// parent directories as needed.
pub fn write_starter_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = path.unwrap_or_else(get_config_path);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Pass --force to overwrite.",
            config_path.display()
        );
    }

    write_config_file(&config_path, STARTER_CONFIG)?;
    Ok(config_path)
}

fn write_config_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config to {}", path.display()))
}
