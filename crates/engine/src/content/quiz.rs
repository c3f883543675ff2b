use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::database::{parse_json_with_path, ContentError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSource {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl QuizSource {
    pub fn citation(&self) -> Option<String> {
        match (&self.title, &self.url) {
            (Some(title), Some(url)) => Some(format!("{title} ({url})")),
            (Some(title), None) => Some(title.clone()),
            (None, Some(url)) => Some(url.clone()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub choices: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source: Option<QuizSource>,
}

impl QuizQuestion {
    pub fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question text is empty".to_string());
        }
        if self.choices.is_empty() {
            return Err("no choices".to_string());
        }
        if !self.choices.iter().any(|choice| *choice == self.answer) {
            return Err(format!("answer '{}' is not one of the choices", self.answer));
        }
        Ok(())
    }
}

/// Parses a question bank. The top level must be an array; individual
/// records that are malformed are logged and skipped.
pub fn parse_question_bank_json(
    origin: &str,
    raw: &str,
) -> Result<Vec<QuizQuestion>, ContentError> {
    let records: Vec<Value> = parse_json_with_path(origin, raw)?;
    let mut questions = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let question = match serde_json::from_value::<QuizQuestion>(record) {
            Ok(question) => question,
            Err(error) => {
                warn!(origin, index, error = %error, "quiz_record_skipped");
                continue;
            }
        };
        if let Err(reason) = question.validate() {
            warn!(origin, index, reason = %reason, "quiz_record_skipped");
            continue;
        }
        questions.push(question);
    }
    Ok(questions)
}
