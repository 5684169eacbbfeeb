use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    pub notes: Option<String>,
}

impl StoreConfig {
    /// Directory-safe key for this store, e.g. `"no frills"` -> `"no-frills"`.
    #[must_use]
    pub fn store_key(&self) -> String {
        store_key(&self.name)
    }
}

/// Derive a store key from a store name: trimmed, lowercased, spaces to hyphens.
///
/// Keys name the per-store image directories and artifact files, so the
/// derivation must stay stable across runs.
#[must_use]
pub fn store_key(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// Reverse of [`store_key`] for display: hyphens back to spaces.
#[must_use]
pub fn store_display_name(key: &str) -> String {
    key.replace('-', " ")
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<StoreConfig>,
    /// Store keys skipped during analysis (stale directories under the image root).
    #[serde(default)]
    pub exclude_keys: Vec<String>,
}

/// Load and validate the store allowlist from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let stores_file: StoresFile =
        serde_yaml::from_str(&content).map_err(ConfigError::StoresFileParse)?;

    validate_stores(&stores_file)?;

    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_keys = HashSet::new();

    for store in &stores_file.stores {
        if store.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store name must be non-empty".to_string(),
            ));
        }

        let lower_name = store.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate store name: '{}'",
                store.name
            )));
        }

        let key = store.store_key();
        if !seen_keys.insert(key.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store key: '{}' (from store '{}')",
                key, store.name
            )));
        }
    }

    Ok(())
}
