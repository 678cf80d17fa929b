use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level quiz configuration.
///
/// One YAML document declares the bucket space, the questions, the adjustment
/// rules and (optionally) the archetype projection table.
///
/// Example YAML:
/// ```yaml
/// dimensions: [mood, focus]
/// output:
///   mode: profile
///   range: { min: -3, max: 3 }
/// questions:
///   - id: q1
///     type: scale
///     prompt: "How was your week?"
///     scale: { min: 1, max: 7 }
///     weights: { mood: "scale(-1,+1)" }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Declared bucket space: dimension names in profile mode, tag names in
    /// archetype mode. Every boost, weight and rule joins on these names.
    pub dimensions: Vec<String>,

    pub questions: Vec<Question>,

    /// Conditional adjustment rules, evaluated in declaration order.
    #[serde(default)]
    pub rules: Vec<Rule>,

    /// Classification targets for archetype mode. Declaration order is the
    /// ranking tie-break order.
    #[serde(default)]
    pub archetypes: Vec<Archetype>,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Output mode selection and the clamp range used by profile mode.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub mode: OutputMode,

    /// Symmetric clamp range for profile mode, rescaled to 0..100.
    #[serde(default)]
    pub range: ScoreRange,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Profile,
            range: ScoreRange::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Per-dimension 0..100 profile.
    #[default]
    Profile,
    /// Ranked archetype projection.
    Archetypes,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self { min: -3.0, max: 3.0 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Question {
    /// Unique question id, the join key for answers and rule references.
    pub id: String,

    #[serde(rename = "type")]
    pub kind: QuestionKind,

    pub prompt: String,

    /// Scale questions: numeric answer range plus optional end labels.
    #[serde(default)]
    pub scale: Option<ScaleSpec>,

    /// Scale questions: dimension -> "scale(a,b)" interpolation expression.
    #[serde(default)]
    pub weights: Option<BTreeMap<String, String>>,

    /// Single/multi questions: the selectable options.
    #[serde(default)]
    pub options: Vec<ChoiceOption>,

    /// Multi questions: cap on the number of selections. Enforced by the
    /// answer collector, not re-validated at scoring time.
    #[serde(default)]
    pub max_select: Option<usize>,

    /// Open questions: keyword groups and their boost mappings.
    #[serde(default)]
    pub keywords: Option<KeywordSpec>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Scale,
    Single,
    Multi,
    Open,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScaleSpec {
    pub min: f64,
    pub max: f64,

    /// Label shown at the minimum end (display only).
    #[serde(default)]
    pub left: Option<String>,

    /// Label shown at the maximum end (display only).
    #[serde(default)]
    pub right: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChoiceOption {
    pub label: String,

    /// Additive bucket contributions when this option is selected.
    #[serde(default)]
    pub boosts: BTreeMap<String, f64>,

    /// Flags unioned into the result when this option is selected.
    #[serde(default)]
    pub flags: Vec<String>,
}

/// Keyword matching for open-text questions.
///
/// `keysets` names groups of keywords; `map` ties a group to boosts/flags.
/// Matching is case-insensitive substring containment.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KeywordSpec {
    pub keysets: BTreeMap<String, Vec<String>>,
    pub map: Vec<KeywordRule>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KeywordRule {
    /// Name of the keyset this rule matches against.
    pub keys: String,

    #[serde(default)]
    pub boosts: BTreeMap<String, f64>,

    #[serde(default)]
    pub flags: Vec<String>,
}

/// A conditional adjustment rule: `when` a condition holds over the
/// accumulated (pre-rule) state, `then` apply additive adjusts and flags.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    #[serde(default)]
    pub name: Option<String>,

    pub when: RuleWhen,
    pub then: RuleThen,
}

/// Condition shapes. A rule should declare exactly one; declaring several is
/// a configuration warning and the first shape present wins (any_selected,
/// then dimensions_high, then dimensions_high_all).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RuleWhen {
    /// References of the form "questionId.option[Label]"; true if any
    /// referenced option is selected.
    #[serde(default)]
    pub any_selected: Vec<String>,

    /// Single {dimension: threshold} entry; true if the dimension's
    /// pre-rule value is >= threshold.
    #[serde(default)]
    pub dimensions_high: Option<BTreeMap<String, f64>>,

    /// List of single-entry threshold conditions; true only if all hold.
    #[serde(default)]
    pub dimensions_high_all: Option<Vec<BTreeMap<String, f64>>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RuleThen {
    /// Additive bucket adjustments.
    #[serde(default)]
    pub adjust: BTreeMap<String, f64>,

    #[serde(default)]
    pub flags: Vec<String>,
}

/// A classification target: a named category scored by projecting the bucket
/// space through its weight vector.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Archetype {
    pub key: String,

    /// Display name; falls back to `key` when absent.
    #[serde(default)]
    pub name: Option<String>,

    /// Tag -> weight vector, dotted against the adjusted bucket values.
    pub vector: BTreeMap<String, f64>,
}

impl Archetype {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}
