//! Model loading functionality

use super::model::{Model, ModelState};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Load a model from a JSON checkpoint.
pub fn load_model(path: impl AsRef<Path>) -> Result<Model> {
    let content = fs::read_to_string(path.as_ref())?;
    let state: ModelState = serde_json::from_str(&content)
        .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}")))?;
    Model::from_state(state)
}
