use std::fs;
use std::path::Path;

use super::error::{Result, RotationError};

/// Pool bundled with the binary, used when no external file is configured.
pub const DEFAULT_POOL: &str = include_str!("../data/messages.json");

/// Decode a pool definition: a JSON array of strings. Empty strings are kept
/// here and dropped by `RotationStore::load`.
pub fn parse_pool(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str::<Vec<String>>(raw)
        .map_err(|err| RotationError::load(format!("pool is not a JSON array of strings: {}", err)))
}

pub fn read_pool_file(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .map_err(|err| RotationError::load(format!("cannot read {}: {}", path.display(), err)))?;
    parse_pool(&raw)
}

pub fn default_pool() -> Result<Vec<String>> {
    parse_pool(DEFAULT_POOL)
}
