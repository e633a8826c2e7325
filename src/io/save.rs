//! Model saving functionality

use super::model::Model;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Save a model to a JSON file, creating parent directories on demand.
pub fn save_model(model: &Model, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let state = model.to_state();
    let data = serde_json::to_string_pretty(&state)
        .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;

    fs::write(path, data)?;
    Ok(())
}

/// Checkpoint name derived from the run configuration.
pub fn checkpoint_name(arch: &str, adversarial: bool) -> String {
    format!("{arch}{}", if adversarial { "_adv" } else { "" })
}
