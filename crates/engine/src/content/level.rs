use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::database::{parse_json_with_path, ContentError};

/// A level file: world size plus the free-form object layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub objects: Vec<MapObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl MapObject {
    pub fn number(&self, key: &str) -> Option<f32> {
        self.properties
            .get(key)
            .and_then(Value::as_f64)
            .map(|value| value as f32)
    }

    pub fn number_or(&self, key: &str, default: f32) -> f32 {
        self.number(key).unwrap_or(default)
    }

    pub fn integer_or(&self, key: &str, default: u32) -> u32 {
        self.properties
            .get(key)
            .and_then(Value::as_u64)
            .map(|value| value.min(u32::MAX as u64) as u32)
            .unwrap_or(default)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

pub fn parse_level_json(origin: &str, raw: &str) -> Result<LevelData, ContentError> {
    parse_json_with_path(origin, raw)
}
