use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answers keyed by question id; the value is the chosen option text.
/// Matching is by option text, so duplicate texts are only safe within a
/// single question.
pub type AnswerMap = BTreeMap<i32, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: i32,
    pub question: String,
    #[serde(default)]
    pub category: Option<String>,
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl Question {
    pub fn correct_option(&self) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}
