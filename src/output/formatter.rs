use std::collections::BTreeMap;
use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::scoring::{ArchetypeScore, ScoreReport};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Render a score report for the terminal.
pub fn format_report(report: &ScoreReport, use_colors: bool) -> String {
    match report {
        ScoreReport::Profile { dimensions, flags } => {
            let mut out = format_profile(dimensions, use_colors);
            out.push_str(&format_flags(flags, use_colors));
            out
        }
        ScoreReport::Archetypes { ranked, flags } => {
            let mut out = format_ranked(ranked, use_colors);
            out.push_str(&format_flags(flags, use_colors));
            out
        }
    }
}

/// Profile table: one row per dimension with a 0..100 score and a bar.
/// Columns: name (left), score (right-aligned, 3 chars), bar.
fn format_profile(dimensions: &BTreeMap<String, i64>, use_colors: bool) -> String {
    if dimensions.is_empty() {
        return "No dimensions scored.".to_string();
    }

    let name_width = dimensions.keys().map(|n| n.chars().count()).max().unwrap_or(0);
    let bar_width = bar_width(name_width);

    dimensions
        .iter()
        .map(|(name, score)| {
            let filled = (*score).clamp(0, 100) as usize * bar_width / 100;
            let bar = format!("{}{}", "#".repeat(filled), "-".repeat(bar_width - filled));
            // Pad before coloring; escape codes would throw the columns off.
            let name_padded = format!("{:<name_width$}", name);
            let score_padded = format!("{:>3}", score);
            if use_colors {
                format!(
                    "{}  {}  {}",
                    name_padded.cyan(),
                    score_padded.bold(),
                    bar.dimmed()
                )
            } else {
                format!("{}  {}  {}", name_padded, score_padded, bar)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Bar length that fits the terminal; 30 when piped or very narrow.
fn bar_width(name_width: usize) -> usize {
    const DEFAULT: usize = 30;
    match get_terminal_width() {
        Some(width) if width > name_width + 10 + DEFAULT => DEFAULT,
        Some(width) if width > name_width + 20 => width - name_width - 10,
        _ => DEFAULT,
    }
}

/// Ranked archetype table: "{index}. {score} {name}", top entry highlighted.
fn format_ranked(ranked: &[ArchetypeScore], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No archetypes ranked.".to_string();
    }

    ranked
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format!("{:>4}", entry.score);
            if use_colors {
                if idx == 0 {
                    format!(
                        "{} {}  {}",
                        index_str.dimmed(),
                        score_str.bold(),
                        entry.name.bold().cyan()
                    )
                } else {
                    format!("{} {}  {}", index_str.dimmed(), score_str, entry.name)
                }
            } else {
                format!("{} {}  {}", index_str, score_str, entry.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_flags(flags: &[String], use_colors: bool) -> String {
    if flags.is_empty() {
        return String::new();
    }
    let joined = flags.join(", ");
    if use_colors {
        format!("\n\nFlags: {}", joined.yellow())
    } else {
        format!("\n\nFlags: {}", joined)
    }
}

/// Format a report as tab-separated values for scripting
/// Profile rows: "name\tscore"; archetype rows: "key\tscore\tname".
/// A trailing "flags\t..." row appears only when flags were raised.
pub fn format_tsv(report: &ScoreReport) -> String {
    let mut lines: Vec<String> = match report {
        ScoreReport::Profile { dimensions, .. } => dimensions
            .iter()
            .map(|(name, score)| format!("{}\t{}", name, score))
            .collect(),
        ScoreReport::Archetypes { ranked, .. } => ranked
            .iter()
            .map(|entry| format!("{}\t{}\t{}", entry.key, entry.score, entry.name))
            .collect(),
    };
    let flags = report.flags();
    if !flags.is_empty() {
        lines.push(format!("flags\t{}", flags.join(",")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_report() -> ScoreReport {
        let mut dimensions = BTreeMap::new();
        dimensions.insert("mood".to_string(), 83);
        dimensions.insert("planning".to_string(), 0);
        ScoreReport::Profile {
            dimensions,
            flags: vec!["momentum".to_string()],
        }
    }

    fn ranked_report() -> ScoreReport {
        ScoreReport::Archetypes {
            ranked: vec![
                ArchetypeScore {
                    key: "alchemist".to_string(),
                    name: "The Alchemist".to_string(),
                    score: 100,
                },
                ArchetypeScore {
                    key: "keystone".to_string(),
                    name: "The Keystone".to_string(),
                    score: 61,
                },
            ],
            flags: vec![],
        }
    }

    #[test]
    fn test_format_profile_rows() {
        let out = format_report(&profile_report(), false);
        assert!(out.contains("mood"));
        assert!(out.contains(" 83"));
        assert!(out.contains("planning"));
        assert!(out.contains("Flags: momentum"));
    }

    #[test]
    fn test_profile_bar_scales_with_score() {
        let out = format_report(&profile_report(), false);
        let mood_line = out.lines().find(|l| l.starts_with("mood")).unwrap();
        let planning_line = out.lines().find(|l| l.starts_with("planning")).unwrap();
        assert!(mood_line.contains('#'));
        assert!(!planning_line.contains('#'));
    }

    #[test]
    fn test_format_ranked_rows() {
        let out = format_report(&ranked_report(), false);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("1."));
        assert!(lines[0].contains("100"));
        assert!(lines[0].contains("The Alchemist"));
        assert!(lines[1].contains("61"));
        assert!(!out.contains("Flags:"));
    }

    #[test]
    fn test_format_tsv_profile() {
        let out = format_tsv(&profile_report());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "mood\t83");
        assert_eq!(lines[1], "planning\t0");
        assert_eq!(lines[2], "flags\tmomentum");
    }

    #[test]
    fn test_format_tsv_ranked() {
        let out = format_tsv(&ranked_report());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "alchemist\t100\tThe Alchemist");
        assert_eq!(lines[1], "keystone\t61\tThe Keystone");
        assert_eq!(lines.len(), 2); // no flags row
    }
}
