//! The signed-in credential, persisted as one JSON file between invocations.

use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use client_core::Credential;

pub fn load(path: &Path) -> Result<Option<Credential>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read credential file '{}'", path.display()));
        }
    };
    let credential = serde_json::from_str(&raw)
        .with_context(|| format!("credential file '{}' is corrupt; sign in again", path.display()))?;
    Ok(Some(credential))
}

pub fn save(path: &Path, credential: &Credential) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create credential directory '{}'", parent.display()))?;
    }
    let raw = serde_json::to_string(credential)?;
    fs::write(path, raw).with_context(|| format!("failed to write credential file '{}'", path.display()))
}

/// Returns whether a stored credential was removed.
pub fn clear(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("failed to remove credential file '{}'", path.display())),
    }
}

#[cfg(test)]
#[path = "tests/credential_store_tests.rs"]
mod tests;
