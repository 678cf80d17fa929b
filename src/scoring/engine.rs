use super::accumulate::accumulate;
use super::adjust::apply_structural;
use super::normalize::{profile, rank, ArchetypeScore};
use super::rules::{apply_rules, compile_rules};
use crate::answers::AnswerSet;
use crate::config::{Config, OutputMode};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The one artifact the engine exposes to collaborators (rendering,
/// persistence).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ScoreReport {
    /// Profile mode: each dimension rescaled to 0..100.
    Profile {
        dimensions: BTreeMap<String, i64>,
        flags: Vec<String>,
    },
    /// Archetype mode: categories ranked by projected score.
    Archetypes {
        ranked: Vec<ArchetypeScore>,
        flags: Vec<String>,
    },
}

impl ScoreReport {
    pub fn flags(&self) -> &[String] {
        match self {
            ScoreReport::Profile { flags, .. } | ScoreReport::Archetypes { flags, .. } => flags,
        }
    }
}

/// Score an answer snapshot against the configuration.
///
/// One pure, synchronous pass: accumulate answers into buckets, apply the
/// rule list against the pre-rule snapshot, apply the structural corrections
/// (archetype mode only), then normalize and rank. Safe to call repeatedly
/// on the same inputs; equal inputs yield byte-identical reports.
///
/// Unresolvable references and malformed weights degrade to no-ops. The only
/// error is structural: an empty question list, an empty bucket space, or
/// archetype mode without archetypes. No meaningful result exists for
/// those, so scoring aborts up front.
pub fn score(config: &Config, answers: &AnswerSet) -> Result<ScoreReport> {
    if config.questions.is_empty() {
        anyhow::bail!("Config declares no questions; nothing to score");
    }
    if config.dimensions.is_empty() {
        anyhow::bail!("Config declares no dimensions; nothing to score into");
    }
    if config.output.mode == OutputMode::Archetypes && config.archetypes.is_empty() {
        anyhow::bail!("Output mode is archetypes but no archetypes are declared");
    }

    let accumulated = accumulate(&config.questions, &config.dimensions, answers);

    // Warnings here are surfaced by `quizcast check` / startup validation;
    // the scoring pass itself stays quiet.
    let (compiled, _warnings) = compile_rules(&config.questions, &config.dimensions, &config.rules);
    let adjusted = apply_rules(&compiled, &accumulated, answers);

    let flags: Vec<String> = adjusted.flags.iter().cloned().collect();

    match config.output.mode {
        OutputMode::Profile => Ok(ScoreReport::Profile {
            dimensions: profile(&adjusted, config.output.range),
            flags,
        }),
        OutputMode::Archetypes => {
            let corrected = apply_structural(&adjusted);
            Ok(ScoreReport::Archetypes {
                ranked: rank(&config.archetypes, &corrected),
                flags,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::Answer;
    use crate::config::{
        Archetype, ChoiceOption, OutputConfig, Question, QuestionKind, Rule, RuleThen, RuleWhen,
        ScaleSpec, ScoreRange,
    };
    use std::collections::BTreeMap;

    fn base_config(dimensions: &[&str]) -> Config {
        Config {
            dimensions: dimensions.iter().map(|s| s.to_string()).collect(),
            questions: vec![],
            rules: vec![],
            archetypes: vec![],
            output: OutputConfig::default(),
        }
    }

    fn scale_question(id: &str, min: f64, max: f64, weights: &[(&str, &str)]) -> Question {
        Question {
            id: id.to_string(),
            kind: QuestionKind::Scale,
            prompt: "p".to_string(),
            scale: Some(ScaleSpec {
                min,
                max,
                left: None,
                right: None,
            }),
            weights: Some(
                weights
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            options: vec![],
            max_select: None,
            keywords: None,
        }
    }

    fn single_question(id: &str, options: &[(&str, &[(&str, f64)], &[&str])]) -> Question {
        Question {
            id: id.to_string(),
            kind: QuestionKind::Single,
            prompt: "p".to_string(),
            scale: None,
            weights: None,
            options: options
                .iter()
                .map(|(label, boosts, flags)| ChoiceOption {
                    label: label.to_string(),
                    boosts: boosts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                    flags: flags.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
            max_select: None,
            keywords: None,
        }
    }

    fn archetype(key: &str, vector: &[(&str, f64)]) -> Archetype {
        Archetype {
            key: key.to_string(),
            name: None,
            vector: vector.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn test_structural_errors_abort() {
        let config = base_config(&["mood"]);
        assert!(score(&config, &AnswerSet::new()).is_err()); // no questions

        let mut config = base_config(&[]);
        config.questions = vec![scale_question("q1", 1.0, 5.0, &[])];
        assert!(score(&config, &AnswerSet::new()).is_err()); // no dimensions

        let mut config = base_config(&["mood"]);
        config.questions = vec![scale_question("q1", 1.0, 5.0, &[])];
        config.output.mode = OutputMode::Archetypes;
        assert!(score(&config, &AnswerSet::new()).is_err()); // no archetypes
    }

    #[test]
    fn test_empty_answers_give_midpoint_profile() {
        let mut config = base_config(&["mood"]);
        config.questions = vec![scale_question("q1", 1.0, 7.0, &[("mood", "scale(-1,+1)")])];

        let report = score(&config, &AnswerSet::new()).unwrap();
        match report {
            ScoreReport::Profile { dimensions, flags } => {
                // 0.0 in [-3,3] rescales to 50
                assert_eq!(dimensions["mood"], 50);
                assert!(flags.is_empty());
            }
            _ => panic!("expected profile report"),
        }
    }

    #[test]
    fn test_end_to_end_profile_example() {
        // scale 1..5 with mood scale(-2,+2) answered 5 -> +2
        // single-select option boosting mood +1 selected -> 3
        // clamp to [-3,3], rescale: (3+3)/6*100 = 100
        let mut config = base_config(&["mood"]);
        config.questions = vec![
            scale_question("q1", 1.0, 5.0, &[("mood", "scale(-2,+2)")]),
            single_question("q2", &[("Cheer up", &[("mood", 1.0)], &[])]),
        ];

        let mut answers = AnswerSet::new();
        answers.insert("q1", Answer::Scale { value: 5.0 });
        answers.insert("q2", Answer::Selection { indices: vec![0] });

        let report = score(&config, &answers).unwrap();
        match report {
            ScoreReport::Profile { dimensions, .. } => assert_eq!(dimensions["mood"], 100),
            _ => panic!("expected profile report"),
        }
    }

    #[test]
    fn test_determinism_byte_identical() {
        let mut config = base_config(&["mood", "focus", "planning"]);
        config.questions = vec![
            scale_question(
                "q1",
                1.0,
                7.0,
                &[("mood", "scale(-1,+1)"), ("focus", "scale(0,2)")],
            ),
            single_question(
                "q2",
                &[
                    ("A", &[("planning", 1.0)], &["planner"]),
                    ("B", &[("focus", 0.5)], &[]),
                ],
            ),
        ];
        config.rules = vec![Rule {
            name: None,
            when: RuleWhen {
                dimensions_high: Some([("focus".to_string(), 1.0)].into_iter().collect()),
                ..Default::default()
            },
            then: RuleThen {
                adjust: [("mood".to_string(), 0.25)].into_iter().collect(),
                flags: vec!["focused".to_string()],
            },
        }];

        let mut answers = AnswerSet::new();
        answers.insert("q1", Answer::Scale { value: 6.0 });
        answers.insert("q2", Answer::Selection { indices: vec![0] });

        let first = serde_json::to_string(&score(&config, &answers).unwrap()).unwrap();
        let second = serde_json::to_string(&score(&config, &answers).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rule_single_pass_at_engine_level() {
        let mut config = base_config(&["x"]);
        config.questions = vec![single_question("q1", &[("A", &[], &[])])];
        config.rules = vec![
            Rule {
                name: None,
                when: RuleWhen {
                    dimensions_high: Some([("x".to_string(), 0.0)].into_iter().collect()),
                    ..Default::default()
                },
                then: RuleThen {
                    adjust: [("x".to_string(), 1.0)].into_iter().collect(),
                    flags: vec![],
                },
            },
            Rule {
                name: None,
                when: RuleWhen {
                    dimensions_high: Some([("x".to_string(), 1.0)].into_iter().collect()),
                    ..Default::default()
                },
                then: RuleThen {
                    adjust: BTreeMap::new(),
                    flags: vec!["second_fired".to_string()],
                },
            },
        ];

        let report = score(&config, &AnswerSet::new()).unwrap();
        assert!(!report.flags().contains(&"second_fired".to_string()));
    }

    #[test]
    fn test_archetype_mode_end_to_end() {
        let mut config = base_config(&["creativity", "experimentation", "stability", "care"]);
        config.output.mode = OutputMode::Archetypes;
        config.questions = vec![single_question(
            "q1",
            &[
                (
                    "Invent something",
                    &[("creativity", 2.0), ("experimentation", 1.0)],
                    &["maker"],
                ),
                ("Keep things steady", &[("stability", 2.0), ("care", 1.0)], &[]),
            ],
        )];
        config.archetypes = vec![
            archetype(
                "alchemist",
                &[("creativity", 1.0), ("experimentation", 1.0)],
            ),
            archetype("keystone", &[("stability", 1.0), ("care", 1.0)]),
        ];

        let mut answers = AnswerSet::new();
        answers.insert("q1", Answer::Selection { indices: vec![0] });

        let report = score(&config, &answers).unwrap();
        match report {
            ScoreReport::Archetypes { ranked, flags } => {
                assert_eq!(ranked[0].key, "alchemist");
                assert_eq!(ranked[0].score, 100);
                // synergy fires: (2*1.1 + 1*1.1) = 3.3 vs 0 for keystone
                assert_eq!(ranked[1].score, 0);
                assert_eq!(flags, vec!["maker".to_string()]);
            }
            _ => panic!("expected archetype report"),
        }
    }

    #[test]
    fn test_adjuster_only_runs_in_archetype_mode() {
        // Saturation would pull 6.0 down to 4 + ln(3) ~= 5.1 (-> 51 on a
        // 0..10 range). Profile mode skips the structural corrections, so
        // the raw 6.0 rescales to 60.
        let mut config = base_config(&["creativity"]);
        config.questions = vec![single_question(
            "q1",
            &[("Max out", &[("creativity", 6.0)], &[])],
        )];
        config.output.range = ScoreRange { min: 0.0, max: 10.0 };

        let mut answers = AnswerSet::new();
        answers.insert("q1", Answer::Selection { indices: vec![0] });

        match score(&config, &answers).unwrap() {
            ScoreReport::Profile { dimensions, .. } => assert_eq!(dimensions["creativity"], 60),
            _ => panic!("expected profile report"),
        }
    }

    #[test]
    fn test_report_serde_roundtrip() {
        let report = ScoreReport::Archetypes {
            ranked: vec![ArchetypeScore {
                key: "alchemist".to_string(),
                name: "The Alchemist".to_string(),
                score: 100,
            }],
            flags: vec!["maker".to_string()],
        };
        let json = serde_json::to_string(&report).unwrap();
        let parsed: ScoreReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, parsed);
        assert!(json.contains("\"mode\":\"archetypes\""));
    }
}
