use super::accumulate::Tally;
use crate::answers::AnswerSet;
use crate::config::{Question, Rule};
use anyhow::{bail, Result};

/// Parsed form of a "questionId.option[Label]" selection reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRef {
    pub question_id: String,
    pub label: String,
}

impl SelectionRef {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some((question_id, rest)) = s.split_once('.') else {
            bail!("Selection reference must have the form qid.option[Label]: {}", s);
        };
        let Some(label) = rest.strip_prefix("option[").and_then(|r| r.strip_suffix(']')) else {
            bail!("Selection reference must have the form qid.option[Label]: {}", s);
        };
        if question_id.is_empty() || label.is_empty() {
            bail!("Selection reference has an empty question id or label: {}", s);
        }
        Ok(SelectionRef {
            question_id: question_id.to_string(),
            label: label.to_string(),
        })
    }
}

/// A selection reference resolved to its option index at compile time, so
/// evaluation never re-parses strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRef {
    pub question_id: String,
    pub option_index: usize,
}

/// Compiled rule condition. Exactly one kind per rule; malformed shapes
/// compile to `Never` so scoring degrades instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// True if any referenced option is among the selected indices.
    AnySelected(Vec<ResolvedRef>),
    /// True if the dimension's pre-rule value is >= threshold.
    DimensionAtLeast { dimension: String, threshold: f64 },
    /// True only if every sub-threshold holds.
    AllDimensionsAtLeast(Vec<(String, f64)>),
    /// Malformed condition shape; never fires.
    Never,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub label: String,
    pub condition: Condition,
    /// Additive bucket adjustments.
    pub adjust: Vec<(String, f64)>,
    pub flags: Vec<String>,
}

/// Compile the configured rules against the question list and bucket space.
///
/// Returns the compiled rules together with configuration warnings: rules
/// declaring several (or no) condition shapes, unresolvable references, and
/// malformed threshold shapes. Warnings never block scoring.
pub fn compile_rules(
    questions: &[Question],
    dimensions: &[String],
    rules: &[Rule],
) -> (Vec<CompiledRule>, Vec<String>) {
    let mut compiled = Vec::with_capacity(rules.len());
    let mut warnings = Vec::new();

    for (i, rule) in rules.iter().enumerate() {
        let label = rule
            .name
            .clone()
            .unwrap_or_else(|| format!("rule[{}]", i));

        let shapes = [
            !rule.when.any_selected.is_empty(),
            rule.when.dimensions_high.is_some(),
            rule.when.dimensions_high_all.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();
        if shapes > 1 {
            warnings.push(format!(
                "{}: declares {} condition shapes; only the first (any_selected, \
                 then dimensions_high, then dimensions_high_all) is evaluated",
                label, shapes
            ));
        }
        if shapes == 0 {
            warnings.push(format!("{}: has no condition and will never fire", label));
        }

        // First shape present wins, matching the observed precedence.
        let condition = if !rule.when.any_selected.is_empty() {
            compile_any_selected(&label, &rule.when.any_selected, questions, &mut warnings)
        } else if let Some(entry) = &rule.when.dimensions_high {
            compile_threshold(&label, entry, dimensions, &mut warnings)
        } else if let Some(entries) = &rule.when.dimensions_high_all {
            compile_threshold_all(&label, entries, dimensions, &mut warnings)
        } else {
            Condition::Never
        };

        compiled.push(CompiledRule {
            label,
            condition,
            adjust: rule
                .then
                .adjust
                .iter()
                .map(|(bucket, delta)| (bucket.clone(), *delta))
                .collect(),
            flags: rule.then.flags.clone(),
        });
    }

    (compiled, warnings)
}

fn compile_any_selected(
    label: &str,
    refs: &[String],
    questions: &[Question],
    warnings: &mut Vec<String>,
) -> Condition {
    let mut resolved = Vec::with_capacity(refs.len());
    for raw in refs {
        let parsed = match SelectionRef::parse(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                warnings.push(format!("{}: {}", label, e));
                continue;
            }
        };
        let Some(question) = questions.iter().find(|q| q.id == parsed.question_id) else {
            warnings.push(format!(
                "{}: references unknown question \"{}\"",
                label, parsed.question_id
            ));
            continue;
        };
        let Some(option_index) = question
            .options
            .iter()
            .position(|o| o.label == parsed.label)
        else {
            warnings.push(format!(
                "{}: option label not found for {}: \"{}\"",
                label, parsed.question_id, parsed.label
            ));
            continue;
        };
        resolved.push(ResolvedRef {
            question_id: parsed.question_id,
            option_index,
        });
    }
    // Unresolved references behave as "not selected"; an empty list never
    // fires.
    Condition::AnySelected(resolved)
}

fn compile_threshold(
    label: &str,
    entry: &std::collections::BTreeMap<String, f64>,
    dimensions: &[String],
    warnings: &mut Vec<String>,
) -> Condition {
    if entry.len() != 1 {
        warnings.push(format!(
            "{}: dimensions_high must name exactly one dimension, found {}",
            label,
            entry.len()
        ));
        return Condition::Never;
    }
    let (dimension, threshold) = entry.iter().next().map(|(k, v)| (k.clone(), *v)).unwrap_or_default();
    if !threshold.is_finite() {
        warnings.push(format!("{}: non-finite threshold for \"{}\"", label, dimension));
        return Condition::Never;
    }
    if !dimensions.contains(&dimension) {
        warnings.push(format!(
            "{}: references undeclared dimension \"{}\"",
            label, dimension
        ));
        return Condition::Never;
    }
    Condition::DimensionAtLeast { dimension, threshold }
}

fn compile_threshold_all(
    label: &str,
    entries: &[std::collections::BTreeMap<String, f64>],
    dimensions: &[String],
    warnings: &mut Vec<String>,
) -> Condition {
    let mut thresholds = Vec::with_capacity(entries.len());
    for entry in entries {
        match compile_threshold(label, entry, dimensions, warnings) {
            Condition::DimensionAtLeast { dimension, threshold } => {
                thresholds.push((dimension, threshold));
            }
            // One malformed sub-condition poisons the conjunction.
            _ => return Condition::Never,
        }
    }
    if thresholds.is_empty() {
        return Condition::Never;
    }
    Condition::AllDimensionsAtLeast(thresholds)
}

impl Condition {
    /// Evaluate against the pre-rule snapshot and the raw answer map.
    pub fn evaluate(&self, snapshot: &Tally, answers: &AnswerSet) -> bool {
        match self {
            Condition::AnySelected(refs) => refs.iter().any(|r| {
                answers
                    .selected(&r.question_id)
                    .contains(&r.option_index)
            }),
            Condition::DimensionAtLeast { dimension, threshold } => {
                snapshot.get(dimension) >= *threshold
            }
            Condition::AllDimensionsAtLeast(thresholds) => thresholds
                .iter()
                .all(|(dimension, threshold)| snapshot.get(dimension) >= *threshold),
            Condition::Never => false,
        }
    }
}

/// Apply the rule list in declaration order.
///
/// Single-pass semantics: every condition reads the same pre-rule snapshot;
/// effects land on a working copy, so later rules never observe earlier
/// rules' adjustments.
pub fn apply_rules(compiled: &[CompiledRule], snapshot: &Tally, answers: &AnswerSet) -> Tally {
    let mut adjusted = snapshot.clone();

    for rule in compiled {
        if !rule.condition.evaluate(snapshot, answers) {
            continue;
        }
        for (bucket, delta) in &rule.adjust {
            adjusted.add(bucket, *delta);
        }
        adjusted.add_flags(&rule.flags);
    }

    adjusted
}
