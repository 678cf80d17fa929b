mod storage;

pub use storage::{load_answers, save_report};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One recorded answer, shape depending on the question kind:
/// `{"value": 5}` for scale, `{"indices": [0, 2]}` for single/multi,
/// `{"text": "..."}` for open questions.
///
/// An answer whose shape does not match its question's kind is treated as
/// unanswered at scoring time.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Answer {
    Scale { value: f64 },
    Selection { indices: Vec<usize> },
    Text { text: String },
}

/// Complete immutable answer snapshot keyed by question id. Questions absent
/// from the map are unanswered and contribute nothing.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct AnswerSet {
    pub answers: BTreeMap<String, Answer>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    /// Selected option indices for a question, empty if unanswered or the
    /// answer is not a selection.
    pub fn selected(&self, question_id: &str) -> &[usize] {
        match self.answers.get(question_id) {
            Some(Answer::Selection { indices }) => indices,
            _ => &[],
        }
    }

    pub fn insert(&mut self, question_id: impl Into<String>, answer: Answer) {
        self.answers.insert(question_id.into(), answer);
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
