use engine::{AssetCache, QuizQuestion};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

pub(crate) const GENERAL_CATEGORY: &str = "general";

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum QuizDataError {
    #[error("no assets are attached to the quiz scene")]
    AssetsUnavailable,
    #[error("question bank '{key}' is not loaded")]
    BankMissing { key: String },
    #[error("question bank '{key}' has no questions for category {category:?}")]
    NoQuestions {
        key: String,
        category: Option<String>,
    },
}

/// Question pool for one bank. Draws are without replacement; the pool is
/// refilled from the filtered set once it runs dry.
#[derive(Debug)]
pub(crate) struct QuizDataManager {
    bank_key: String,
    loaded_category: Option<Option<String>>,
    questions: Vec<QuizQuestion>,
    available: Vec<usize>,
}

impl QuizDataManager {
    pub(crate) fn new(bank_key: impl Into<String>) -> Self {
        Self {
            bank_key: bank_key.into(),
            loaded_category: None,
            questions: Vec::new(),
            available: Vec::new(),
        }
    }

    /// Loads the questions matching `category`. Reloading the category that
    /// is already loaded keeps the current pool so draws stay unique across
    /// encounters.
    pub(crate) fn load(
        &mut self,
        assets: Option<&AssetCache>,
        category: Option<&str>,
    ) -> Result<usize, QuizDataError> {
        let requested = category.map(str::to_string);
        if self.loaded_category.as_ref() == Some(&requested) && !self.questions.is_empty() {
            return Ok(self.questions.len());
        }

        let assets = assets.ok_or(QuizDataError::AssetsUnavailable)?;
        let bank = assets
            .question_bank(&self.bank_key)
            .ok_or_else(|| QuizDataError::BankMissing {
                key: self.bank_key.clone(),
            })?;

        let questions = bank
            .iter()
            .filter(|question| matches_category(question, category))
            .cloned()
            .collect::<Vec<_>>();
        if questions.is_empty() {
            self.loaded_category = None;
            self.questions.clear();
            self.available.clear();
            return Err(QuizDataError::NoQuestions {
                key: self.bank_key.clone(),
                category: requested,
            });
        }

        info!(
            bank = %self.bank_key,
            category = category.unwrap_or("*"),
            question_count = questions.len(),
            "quiz_questions_loaded"
        );
        self.available = (0..questions.len()).collect();
        self.questions = questions;
        self.loaded_category = Some(requested);
        Ok(self.questions.len())
    }

    pub(crate) fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<QuizQuestion> {
        if self.questions.is_empty() {
            return None;
        }
        if self.available.is_empty() {
            self.available = (0..self.questions.len()).collect();
            debug!(bank = %self.bank_key, "quiz_pool_reset");
        }
        let pick = rng.gen_range(0..self.available.len());
        let index = self.available.swap_remove(pick);
        self.questions.get(index).cloned()
    }

    pub(crate) fn available_count(&self) -> usize {
        self.available.len()
    }

    pub(crate) fn total_count(&self) -> usize {
        self.questions.len()
    }
}

/// No category takes everything; `general` also takes uncategorized
/// questions; anything else must match (ignoring ASCII case).
pub(crate) fn matches_category(question: &QuizQuestion, category: Option<&str>) -> bool {
    let Some(wanted) = category else {
        return true;
    };
    match question.category.as_deref() {
        Some(actual) => actual.eq_ignore_ascii_case(wanted),
        None => wanted.eq_ignore_ascii_case(GENERAL_CATEGORY),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn question(text: &str, category: Option<&str>) -> QuizQuestion {
        QuizQuestion {
            question: text.to_string(),
            choices: vec!["a".to_string(), "b".to_string()],
            answer: "a".to_string(),
            category: category.map(str::to_string),
            source: None,
        }
    }

    fn assets() -> AssetCache {
        let mut assets = AssetCache::default();
        assets.insert_question_bank(
            "questions",
            vec![
                question("q1", None),
                question("q2", Some("general")),
                question("q3", Some("science")),
            ],
        );
        assets
    }

    #[test]
    fn draws_are_unique_until_the_pool_resets() {
        let assets = assets();
        let mut data = QuizDataManager::new("questions");
        assert_eq!(data.load(Some(&assets), None), Ok(3));
        let mut rng = StdRng::seed_from_u64(7);

        let drawn = (0..3)
            .map(|_| data.draw(&mut rng).expect("question").question)
            .collect::<HashSet<_>>();
        assert_eq!(drawn.len(), 3);
        assert_eq!(data.available_count(), 0);

        let fourth = data.draw(&mut rng).expect("question").question;
        assert!(drawn.contains(&fourth));
        assert_eq!(data.available_count(), 2);
    }

    #[test]
    fn general_category_includes_uncategorized() {
        let assets = assets();
        let mut data = QuizDataManager::new("questions");
        assert_eq!(data.load(Some(&assets), Some("general")), Ok(2));
        assert_eq!(data.load(Some(&assets), Some("Science")), Ok(1));
    }

    #[test]
    fn reloading_same_category_keeps_the_pool() {
        let assets = assets();
        let mut data = QuizDataManager::new("questions");
        let mut rng = StdRng::seed_from_u64(1);
        data.load(Some(&assets), None).expect("load");
        data.draw(&mut rng).expect("question");
        assert_eq!(data.available_count(), 2);

        data.load(Some(&assets), None).expect("reload");
        assert_eq!(data.available_count(), 2);

        data.load(Some(&assets), Some("science")).expect("switch");
        assert_eq!(data.available_count(), 1);
    }

    #[test]
    fn unknown_category_and_missing_bank_are_errors() {
        let assets = assets();
        let mut data = QuizDataManager::new("questions");
        assert_eq!(
            data.load(Some(&assets), Some("history")),
            Err(QuizDataError::NoQuestions {
                key: "questions".to_string(),
                category: Some("history".to_string()),
            })
        );
        assert_eq!(data.total_count(), 0);
        assert!(data.draw(&mut StdRng::seed_from_u64(0)).is_none());

        let mut missing = QuizDataManager::new("nope");
        assert!(matches!(
            missing.load(Some(&assets), None),
            Err(QuizDataError::BankMissing { .. })
        ));
        assert_eq!(
            missing.load(None, None),
            Err(QuizDataError::AssetsUnavailable)
        );
    }
}
