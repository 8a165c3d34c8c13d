//! Persistent client identifier.
//!
//! The backend keys stored birth dates by an opaque user id. One is created
//! on first run and kept in `<data_dir>/user_id`.

use crate::error::{AppError, Result};
use std::path::Path;
use uuid::Uuid;

/// Prefix of generated identifiers.
pub const USER_ID_PREFIX: &str = "user_";

/// A fresh `user_<uuid>` identifier.
pub fn generate_user_id() -> String {
    format!("{USER_ID_PREFIX}{}", Uuid::new_v4().simple())
}

/// Read the identifier at `path`, creating and saving one if it is missing or empty.
///
/// # Errors
///
/// Returns [`AppError::Identity`] if the file exists but cannot be read, or
/// a new identifier cannot be written.
pub fn load_or_create(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let id = content.trim();
            if !id.is_empty() {
                tracing::debug!(path = %path.display(), "loaded user id");
                return Ok(id.to_owned());
            }
            tracing::warn!(path = %path.display(), "user id file is empty, regenerating");
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(AppError::Identity(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    }

    let id = generate_user_id();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Identity(format!("cannot create {}: {e}", parent.display())))?;
    }
    std::fs::write(path, format!("{id}\n"))
        .map_err(|e| AppError::Identity(format!("cannot write {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "created new user id");
    Ok(id)
}
