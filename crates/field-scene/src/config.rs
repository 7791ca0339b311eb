//! Scene description as read from JSON
//!
//! Keys are case-insensitive: every object key is lowercased before
//! deserializing, so `startPoints`, `StartPoints` and `startpoints` are the same
//! key. Elements and start points stay as raw JSON here and are validated one
//! at a time by [`SceneConfig::build`](crate::SceneConfig::build).

use crate::error::SceneError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Component formulas of a simple vector field.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldConfig {
    pub x: String,
    pub y: String,
    pub z: String,
}

/// One visualisation.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Name under which the scene is registered
    pub name: Option<String>,
    /// Drawing surface identifier
    pub canvas: Option<String>,
    pub scale: Option<f64>,
    /// `"electric field"` (default) or `"simple vector field"`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub elements: Vec<Value>,
    #[serde(rename = "startpoints")]
    pub start_points: Vec<Value>,
    pub field: Option<FieldConfig>,
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, SceneError> {
        Ok(serde_json::from_value(lowercase_keys(value))?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        log::info!("Loading scene from {}", path.display());
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Lowercase every object key, recursively.
pub fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), lowercase_keys(v)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}
