//! Token cache backends
//!
//! Authentication data is cached under `host + username` so that clients for the
//! same login reuse one token until it expires. The cache is never authoritative: a
//! failed request forces reauthentication, which overwrites the entry.

mod file;
mod memory;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::AuthData;
use crate::error::Result;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

/// Default time-to-live for cached tokens, in seconds
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// TTL values at or below this are replaced by [`DEFAULT_TTL_SECS`]
pub const MIN_TTL_SECS: u64 = 60;

/// Keyed persistence of [`AuthData`] with expiry
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Cached value, or `None` when absent or expired
    fn get(&self, key: &str) -> Result<Option<AuthData>>;

    /// Store a value; it expires after the store's TTL
    fn set(&self, key: &str, data: &AuthData) -> Result<()>;

    /// Remove a value; removing a missing key is not an error
    fn delete(&self, key: &str) -> Result<()>;
}

/// Which backend to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    #[default]
    Memory,
    File,
}

impl fmt::Display for TokenStoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenStoreKind::Memory => write!(f, "memory"),
            TokenStoreKind::File => write!(f, "file"),
        }
    }
}

impl std::str::FromStr for TokenStoreKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(TokenStoreKind::Memory),
            "file" => Ok(TokenStoreKind::File),
            _ => Err(format!("Token store type '{s}' is not implemented")),
        }
    }
}

/// Token store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStoreConfig {
    #[serde(rename = "type", default)]
    pub kind: TokenStoreKind,

    /// Entry lifetime in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u64,

    /// Directory for the file backend; defaults to the system temp dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_ttl() -> u64 {
    DEFAULT_TTL_SECS
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self {
            kind: TokenStoreKind::Memory,
            ttl: DEFAULT_TTL_SECS,
            path: None,
        }
    }
}

impl TokenStoreConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>, ttl: u64) -> Self {
        Self {
            kind: TokenStoreKind::File,
            ttl,
            path: Some(path.into()),
        }
    }

    /// TTL actually applied by the backends
    pub fn effective_ttl(&self) -> u64 {
        effective_ttl(self.ttl)
    }

    /// Build the configured backend
    pub fn build(&self) -> Arc<dyn TokenStore> {
        match self.kind {
            TokenStoreKind::Memory => Arc::new(MemoryTokenStore::new(self.ttl)),
            TokenStoreKind::File => {
                let dir = self.path.clone().unwrap_or_else(std::env::temp_dir);
                Arc::new(FileTokenStore::new(dir, self.ttl))
            }
        }
    }
}

pub(crate) fn effective_ttl(ttl: u64) -> u64 {
    if ttl > MIN_TTL_SECS {
        ttl
    } else {
        DEFAULT_TTL_SECS
    }
}

pub(crate) fn now_epoch() -> i64 {
    jiff::Timestamp::now().as_second()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_ttl() {
        assert_eq!(effective_ttl(7200), 7200);
        assert_eq!(effective_ttl(61), 61);
        assert_eq!(effective_ttl(60), DEFAULT_TTL_SECS);
        assert_eq!(effective_ttl(0), DEFAULT_TTL_SECS);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("FILE".parse::<TokenStoreKind>().unwrap(), TokenStoreKind::File);
        assert_eq!("memory".parse::<TokenStoreKind>().unwrap(), TokenStoreKind::Memory);
        assert!("redis".parse::<TokenStoreKind>().is_err());
    }

    #[test]
    fn test_config_deserialize() {
        let config: TokenStoreConfig =
            toml::from_str("type = \"file\"\nttl = 600\npath = \"/var/cache/osc\"").unwrap();
        assert_eq!(config.kind, TokenStoreKind::File);
        assert_eq!(config.ttl, 600);
        assert_eq!(config.path, Some(PathBuf::from("/var/cache/osc")));

        let config: TokenStoreConfig = toml::from_str("").unwrap();
        assert_eq!(config, TokenStoreConfig::default());
    }

    #[test]
    fn test_build_memory_store() {
        let store = TokenStoreConfig::memory().build();
        let data = AuthData {
            storage_url: "https://os.example.com/v1/AUTH_a".into(),
            auth_token: "tk".into(),
        };
        store.set("k", &data).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(data));
    }
}
