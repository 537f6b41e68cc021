//! Log configuration and key inputs.
//!
//! ```toml
//! max_page_size = 16
//! log_filter = "ctlog=debug"
//!
//! [storage]
//! backend = "sqlite"
//! path = "/var/lib/ctlog/log.db"
//! ```

use std::{fmt, path::Path, path::PathBuf};

use ctlog_primitives::constants::DEFAULT_MAX_PAGE_SIZE;
use ed25519_dalek::SigningKey;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
    encryption::PayloadCipher,
    errors::{LogError, LogResult},
    signatures::LogAuthority,
    storage::{AnyRepository, MemoryRepository, SqliteRepository},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,
    Sqlite {
        path: PathBuf,
    },
}

impl StorageConfig {
    pub fn open(&self) -> LogResult<AnyRepository> {
        Ok(match self {
            Self::Memory => MemoryRepository::new().into(),
            Self::Sqlite { path } => SqliteRepository::open(path)?.into(),
        })
    }
}

fn default_page_size() -> u64 {
    DEFAULT_MAX_PAGE_SIZE
}

fn default_log_filter() -> String {
    "info".to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upper bound on leaves returned by one `get_entries` call.
    #[serde(default = "default_page_size")]
    pub max_page_size: u64,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            max_page_size: default_page_size(),
            log_filter: default_log_filter(),
        }
    }
}

impl LogConfig {
    pub fn from_toml_str(s: &str) -> LogResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| LogError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> LogResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LogError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> LogResult<()> {
        if self.max_page_size == 0 {
            return Err(LogError::Config("max_page_size must be positive".into()));
        }
        Ok(())
    }
}

/// Secrets the log runs with: the authority signing key and the payload key.
pub struct KeyMaterial {
    pub signing_key: SigningKey,
    pub encryption_key: [u8; 32],
}

impl KeyMaterial {
    #[must_use]
    pub fn generate() -> Self {
        let mut encryption_key = [0u8; 32];
        OsRng.fill_bytes(&mut encryption_key);
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
            encryption_key,
        }
    }

    #[must_use]
    pub fn from_bytes(signing_seed: &[u8; 32], encryption_key: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(signing_seed),
            encryption_key,
        }
    }

    #[must_use]
    pub fn authority(&self) -> LogAuthority {
        LogAuthority::new(self.signing_key.clone())
    }

    #[must_use]
    pub fn cipher(&self) -> PayloadCipher {
        PayloadCipher::new(&self.encryption_key)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_key", &self.signing_key.verifying_key())
            .finish_non_exhaustive()
    }
}
