//! Static trait-code → archetype-name registry.
//!
//! Loaded once from the first usable file in a priority-ordered candidate
//! list; read-only for the process lifetime. Unreadable or empty candidates
//! are skipped, and with no usable file the registry degrades to a one-entry
//! built-in mapping rather than failing startup.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CANDIDATES: [&str; 2] = ["archetypes_full.json", "archetypes.json"];

const FALLBACK_CODE: &str = "Low-Low-Low-Low-Low";
const FALLBACK_NAME: &str = "Aquashine";

#[derive(Debug, Clone, Default)]
pub struct ArchetypeRegistry {
    names: HashMap<String, String>,
}

impl ArchetypeRegistry {
    /// Load from the first candidate that exists and parses to a non-empty
    /// JSON object, else fall back to the built-in single entry.
    #[must_use]
    pub fn load(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            match read_mapping(path) {
                Ok(Some(names)) => {
                    log::info!("Loaded {} archetypes from {}", names.len(), path.display());
                    return Self { names };
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!("Skipping registry candidate {}: {err}", path.display());
                }
            }
        }
        log::warn!("No archetype registry file found; using built-in fallback");
        Self::builtin_fallback()
    }

    #[must_use]
    pub fn builtin_fallback() -> Self {
        let mut names = HashMap::new();
        names.insert(FALLBACK_CODE.to_string(), FALLBACK_NAME.to_string());
        Self { names }
    }

    #[must_use]
    pub fn from_map(names: HashMap<String, String>) -> Self {
        Self { names }
    }

    #[must_use]
    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn read_mapping(path: &Path) -> std::io::Result<Option<HashMap<String, String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let parsed: HashMap<String, String> = serde_json::from_str(&raw)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    if parsed.is_empty() {
        return Ok(None);
    }
    Ok(Some(parsed))
}
