use super::expr::ScaleExpr;
use crate::answers::{Answer, AnswerSet};
use crate::config::{Question, QuestionKind};
use std::collections::{BTreeMap, BTreeSet};

/// Accumulated scoring state: one numeric bucket per declared dimension/tag
/// plus the flag set. Ordered containers keep scoring passes byte-for-byte
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    pub buckets: BTreeMap<String, f64>,
    pub flags: BTreeSet<String>,
}

impl Tally {
    /// All declared buckets at 0.0, no flags.
    pub fn new<'a>(bucket_names: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            buckets: bucket_names
                .into_iter()
                .map(|name| (name.clone(), 0.0))
                .collect(),
            flags: BTreeSet::new(),
        }
    }

    /// Add a contribution. Undeclared buckets and non-finite deltas are
    /// dropped silently per the degrade-not-fail policy.
    pub fn add(&mut self, bucket: &str, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        if let Some(value) = self.buckets.get_mut(bucket) {
            *value += delta;
        }
    }

    pub fn get(&self, bucket: &str) -> f64 {
        self.buckets.get(bucket).copied().unwrap_or(0.0)
    }

    pub fn add_flags<'a>(&mut self, flags: impl IntoIterator<Item = &'a String>) {
        for flag in flags {
            self.flags.insert(flag.clone());
        }
    }
}

/// Walk the answered questions and fold each answer into the bucket space.
///
/// Pure function of its inputs. Questions absent from the answer map, answers
/// whose shape does not match the question kind, and references that do not
/// resolve all contribute nothing.
pub fn accumulate(questions: &[Question], dimensions: &[String], answers: &AnswerSet) -> Tally {
    let mut tally = Tally::new(dimensions);

    for question in questions {
        let Some(answer) = answers.get(&question.id) else {
            continue;
        };
        match (question.kind, answer) {
            (QuestionKind::Scale, Answer::Scale { value }) => {
                apply_scale(&mut tally, question, *value);
            }
            (QuestionKind::Single | QuestionKind::Multi, Answer::Selection { indices }) => {
                apply_selection(&mut tally, question, indices);
            }
            (QuestionKind::Open, Answer::Text { text }) => {
                apply_keywords(&mut tally, question, text);
            }
            // Shape/kind mismatch: treated as unanswered.
            _ => {}
        }
    }

    tally
}

fn apply_scale(tally: &mut Tally, question: &Question, value: f64) {
    let (Some(scale), Some(weights)) = (&question.scale, &question.weights) else {
        return;
    };
    for (bucket, expr_str) in weights {
        let Ok(expr) = ScaleExpr::parse(expr_str) else {
            continue;
        };
        tally.add(bucket, expr.eval(value, scale.min, scale.max));
    }
}

fn apply_selection(tally: &mut Tally, question: &Question, indices: &[usize]) {
    for &index in indices {
        let Some(option) = question.options.get(index) else {
            continue;
        };
        for (bucket, boost) in &option.boosts {
            tally.add(bucket, *boost);
        }
        tally.add_flags(&option.flags);
    }
}

fn apply_keywords(tally: &mut Tally, question: &Question, text: &str) {
    let Some(spec) = &question.keywords else {
        return;
    };
    // Lower-case the answer once; keywords are matched case-insensitively.
    let text = text.to_lowercase();
    for rule in &spec.map {
        let Some(keyset) = spec.keysets.get(&rule.keys) else {
            continue;
        };
        let hit = keyset
            .iter()
            .any(|keyword| text.contains(&keyword.to_lowercase()));
        if hit {
            for (bucket, boost) in &rule.boosts {
                tally.add(bucket, *boost);
            }
            tally.add_flags(&rule.flags);
        }
    }
}
