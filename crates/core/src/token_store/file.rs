//! Durable token store: one file per key
//!
//! File name: `objectStorage_key_<sha256 of key>`; content:
//! `{expiration epoch}||{json auth data}`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::{TokenStore, effective_ttl, now_epoch};
use crate::auth::AuthData;
use crate::error::{Error, Result};

const FILE_PREFIX: &str = "objectStorage_key_";
const TIMESTAMP_DELIMITER: &str = "||";

/// Token store persisting entries as files in a directory
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
    ttl: u64,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>, ttl: u64) -> Self {
        Self {
            dir: dir.into(),
            ttl: effective_ttl(ttl),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    /// Location of the file holding `key`
    pub fn file_path(&self, key: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        self.dir.join(format!("{FILE_PREFIX}{digest}"))
    }

    fn get_at(&self, key: &str, now: i64) -> Result<Option<AuthData>> {
        let path = self.file_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::TokenStore(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let parsed = content
            .split_once(TIMESTAMP_DELIMITER)
            .and_then(|(expires, json)| Some((expires.trim().parse::<i64>().ok()?, json)));

        match parsed {
            Some((expires, json)) if expires > now => match serde_json::from_str(json) {
                Ok(data) => Ok(Some(data)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt token file");
                    self.delete(key)?;
                    Ok(None)
                }
            },
            Some(_) => {
                tracing::debug!(path = %path.display(), "Cached token expired");
                self.delete(key)?;
                Ok(None)
            }
            None => {
                tracing::warn!(path = %path.display(), "Discarding malformed token file");
                self.delete(key)?;
                Ok(None)
            }
        }
    }

    fn set_at(&self, key: &str, data: &AuthData, now: i64) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::TokenStore(format!("Failed to create {}: {e}", self.dir.display()))
        })?;

        let json = serde_json::to_string(data)
            .map_err(|e| Error::TokenStore(format!("Failed to serialize token: {e}")))?;
        let expires = now + self.ttl as i64;
        let path = self.file_path(key);

        fs::write(&path, format!("{expires}{TIMESTAMP_DELIMITER}{json}")).map_err(|e| {
            Error::TokenStore(format!("Failed to write {}: {e}", path.display()))
        })
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<AuthData>> {
        self.get_at(key, now_epoch())
    }

    fn set(&self, key: &str, data: &AuthData) -> Result<()> {
        self.set_at(key, data, now_epoch())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.file_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::TokenStore(format!(
                "Failed to delete {}: {e}",
                path.display()
            ))),
        }
    }
}
