//! In-process token store

use std::collections::HashMap;
use std::sync::Mutex;

use super::{TokenStore, effective_ttl, now_epoch};
use crate::auth::AuthData;
use crate::error::Result;

/// Token store backed by a process-local map
#[derive(Debug)]
pub struct MemoryTokenStore {
    ttl: u64,
    entries: Mutex<HashMap<String, (i64, AuthData)>>,
}

impl MemoryTokenStore {
    pub fn new(ttl: u64) -> Self {
        Self {
            ttl: effective_ttl(ttl),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, key: &str, now: i64) -> Option<AuthData> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some((expires, data)) if *expires > now => Some(data.clone()),
            Some(_) => {
                tracing::debug!(key_len = key.len(), "Cached token expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set_at(&self, key: &str, data: &AuthData, now: i64) {
        let expires = now + self.ttl as i64;
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), (expires, data.clone()));
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new(super::DEFAULT_TTL_SECS)
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<AuthData>> {
        Ok(self.get_at(key, now_epoch()))
    }

    fn set(&self, key: &str, data: &AuthData) -> Result<()> {
        self.set_at(key, data, now_epoch());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}
