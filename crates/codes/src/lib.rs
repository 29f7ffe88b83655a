//! Single-use free-access codes.
//!
//! A code is an 8-character uppercase hex token with a one-way `used` flag:
//! generated unused, optionally redeemed exactly once, never deleted. The
//! file-backed store serializes every load-check-mutate-persist sequence
//! through one async mutex, so two concurrent redemptions of the same code
//! cannot both succeed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::Mutex;

pub type Result<T> = std::result::Result<T, CodeStoreError>;

const TOKEN_BYTES: usize = 4;

#[derive(Error, Debug)]
pub enum CodeStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no entropy source available: {0}")]
    Entropy(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeRecord {
    pub used: bool,
}

/// Keyed store of access codes. The seam where the flat-file backend could
/// be swapped for a transactional one.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Mint a fresh unused code, persist it, and return the token.
    async fn generate(&self) -> Result<String>;

    /// Redeem a code: true iff it exists and was unused; marks it used
    /// before returning. Every other case is a plain `false`.
    async fn redeem(&self, code: &str) -> Result<bool>;
}

/// Whole-file JSON map `token → {used}`. Writes land via temp file + rename
/// so an interrupted write cannot truncate the store.
pub struct FileCodeStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCodeStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<HashMap<String, CodeRecord>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn persist(&self, codes: &HashMap<String, CodeRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(codes)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CodeStore for FileCodeStore {
    async fn generate(&self) -> Result<String> {
        let _guard = self.lock.lock().await;
        // No collision check: 32 bits of entropy is plenty at this volume.
        let token = random_token()?;
        let mut codes = self.load().await?;
        codes.insert(token.clone(), CodeRecord { used: false });
        self.persist(&codes).await?;
        log::info!("Generated free access code {token}");
        Ok(token)
    }

    async fn redeem(&self, code: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut codes = self.load().await?;
        match codes.get_mut(code) {
            Some(record) if !record.used => {
                record.used = true;
                self.persist(&codes).await?;
                log::info!("Redeemed free access code {code}");
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn random_token() -> Result<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    getrandom::getrandom(&mut bytes).map_err(|e| CodeStoreError::Entropy(e.to_string()))?;
    let mut token = String::with_capacity(TOKEN_BYTES * 2);
    for byte in bytes {
        token.push_str(&format!("{byte:02X}"));
    }
    Ok(token)
}
