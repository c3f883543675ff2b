mod database;
mod level;
mod quiz;

pub use database::{AssetCache, ContentError, LEVELS_DIR_NAME, QUIZ_DIR_NAME};
pub use level::{parse_level_json, LevelData, MapObject};
pub use quiz::{parse_question_bank_json, QuizQuestion, QuizSource};
