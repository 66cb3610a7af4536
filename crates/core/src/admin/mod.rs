//! Account administration
//!
//! User management on the auth service. These calls authenticate with the admin
//! credentials on every request (`X-Auth-Admin-User` / `X-Auth-Admin-Key`) instead of a
//! token, and are never retried.

mod types;

pub use types::{AccountInfo, AccountUser, UserRole};

use crate::client::ClusterClient;
use crate::error::{Error, HttpError, Result};
use crate::transport::{HttpRequest, Method};

impl ClusterClient {
    /// Raw account document, JSON as returned by the cluster
    pub fn cluster_info(&self) -> Result<String> {
        let request = self.admin_request(Method::Get, None)?;
        let response = self.send(request)?;
        if !response.is_success() {
            return Err(HttpError::with_context(response.status, "Failed to retrieve users.").into());
        }
        Ok(response.body_text())
    }

    /// Parsed account document
    pub fn account_info(&self) -> Result<AccountInfo> {
        let body = self.cluster_info()?;
        serde_json::from_str(&body).map_err(|e| Error::Listing(format!("account info: {e}")))
    }

    /// Create a user in the admin's account
    pub fn add_user(&self, username: &str, password: &str, role: UserRole) -> Result<bool> {
        let username = required(username, "Username")?;
        let password = required(password, "Password")?;

        let mut request = self
            .admin_request(Method::Put, Some(username))?
            .header("X-Auth-User-Key", password);
        if role.is_admin() {
            request = request.header("X-Auth-User-Admin", "true");
        }

        tracing::info!(username, role = %role, "Adding user");
        let response = self.send(request)?;
        if !response.is_success() {
            return Err(HttpError::with_context(response.status, "Failed to create user.").into());
        }
        Ok(true)
    }

    /// Remove a user from the admin's account
    pub fn delete_user(&self, username: &str) -> Result<bool> {
        let username = required(username, "Username")?;
        let request = self.admin_request(Method::Delete, Some(username))?;

        tracing::info!(username, "Deleting user");
        let response = self.send(request)?;
        if !response.is_success() {
            return Err(HttpError::with_context(response.status, "Failed to delete user.").into());
        }
        Ok(true)
    }

    fn admin_request(&self, method: Method, user: Option<&str>) -> Result<HttpRequest> {
        let credentials = self.credentials();
        let account = credentials.account()?;

        let mut url = format!("{}/auth/v2/{}", credentials.host, urlencoding::encode(account));
        if let Some(user) = user {
            url.push('/');
            url.push_str(&urlencoding::encode(user));
        }

        Ok(HttpRequest::new(method, url)
            .header("X-Auth-Admin-User", &credentials.username)
            .header("X-Auth-Admin-Key", &credentials.password))
    }
}

fn required<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Config(format!("{what} cannot be empty.")));
    }
    Ok(value)
}
