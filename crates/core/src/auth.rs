//! Credentials and the authentication data derived from them

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Login for one cluster
///
/// `username` may encode `account:user`; the account part is required for admin
/// operations.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Validate and build credentials; all three values are required
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let host = host.into().trim().trim_end_matches('/').to_string();
        let username = username.into();
        let password = password.into();

        if host.is_empty() || username.is_empty() || password.is_empty() {
            return Err(Error::Config(
                "You must provide object storage host, username and password".to_string(),
            ));
        }

        url::Url::parse(&host)
            .map_err(|e| Error::Config(format!("Invalid object storage host '{host}': {e}")))?;

        Ok(Self {
            host,
            username,
            password,
        })
    }

    /// Token cache key: plain concatenation of host and username
    pub fn cache_key(&self) -> String {
        format!("{}{}", self.host, self.username)
    }

    /// Account part of an `account:user` username
    pub fn account(&self) -> Result<&str> {
        match self.username.split_once(':') {
            Some((account, _)) if !account.is_empty() => Ok(account),
            _ => Err(Error::Config(format!(
                "Username '{}' does not name an account (expected account:user)",
                self.username
            ))),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Storage URL and token returned by a successful authentication
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    pub storage_url: String,
    pub auth_token: String,
}

impl fmt::Debug for AuthData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthData")
            .field("storage_url", &self.storage_url)
            .finish_non_exhaustive()
    }
}
