use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use super::level::{parse_level_json, LevelData};
use super::quiz::{parse_question_bank_json, QuizQuestion};

pub const LEVELS_DIR_NAME: &str = "levels";
pub const QUIZ_DIR_NAME: &str = "quiz";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content directory is missing: {path}")]
    MissingDir { path: PathBuf },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {origin} at {path}: {source}")]
    ParseAt {
        origin: String,
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn parse_json_with_path<T: DeserializeOwned>(
    origin: &str,
    raw: &str,
) -> Result<T, ContentError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(value) => Ok(value),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(ContentError::Parse {
                    origin: origin.to_string(),
                    source,
                })
            } else {
                Err(ContentError::ParseAt {
                    origin: origin.to_string(),
                    path,
                    source,
                })
            }
        }
    }
}

/// Loaded levels and question banks, keyed by file stem.
#[derive(Debug, Clone, Default)]
pub struct AssetCache {
    levels: HashMap<String, LevelData>,
    question_banks: HashMap<String, Vec<QuizQuestion>>,
}

impl AssetCache {
    /// Loads `<assets_dir>/levels/*.json` and `<assets_dir>/quiz/*.json`.
    pub fn load_from_dir(assets_dir: &Path) -> Result<Self, ContentError> {
        let mut cache = Self::default();

        for path in list_json_files(&assets_dir.join(LEVELS_DIR_NAME))? {
            let key = file_key(&path);
            let raw = read_file(&path)?;
            let level = parse_level_json(&key, &raw)?;
            info!(
                level = %key,
                object_count = level.objects.len(),
                "level_loaded"
            );
            cache.levels.insert(key, level);
        }

        for path in list_json_files(&assets_dir.join(QUIZ_DIR_NAME))? {
            let key = file_key(&path);
            let raw = read_file(&path)?;
            let questions = parse_question_bank_json(&key, &raw)?;
            info!(
                bank = %key,
                question_count = questions.len(),
                "question_bank_loaded"
            );
            cache.question_banks.insert(key, questions);
        }

        Ok(cache)
    }

    pub fn insert_level(&mut self, key: impl Into<String>, level: LevelData) {
        self.levels.insert(key.into(), level);
    }

    pub fn insert_question_bank(&mut self, key: impl Into<String>, questions: Vec<QuizQuestion>) {
        self.question_banks.insert(key.into(), questions);
    }

    pub fn level(&self, key: &str) -> Option<&LevelData> {
        self.levels.get(key)
    }

    pub fn question_bank(&self, key: &str) -> Option<&[QuizQuestion]> {
        self.question_banks.get(key).map(Vec::as_slice)
    }

    pub fn level_keys(&self) -> Vec<&str> {
        let mut keys = self.levels.keys().map(String::as_str).collect::<Vec<_>>();
        keys.sort_unstable();
        keys
    }

    pub fn question_bank_keys(&self) -> Vec<&str> {
        let mut keys = self
            .question_banks
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>();
        keys.sort_unstable();
        keys
    }
}

fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
    if !dir.is_dir() {
        return Err(ContentError::MissingDir {
            path: dir.to_path_buf(),
        });
    }
    let entries = fs::read_dir(dir).map_err(|source| ContentError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ContentError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_file(path: &Path) -> Result<String, ContentError> {
    fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn file_key(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
