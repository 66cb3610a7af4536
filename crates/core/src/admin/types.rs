//! Admin API type definitions
//!
//! Shapes of the account document returned by `GET /auth/v2/{account}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// User role within an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Can read and write the account's containers
    #[default]
    Regular,
    /// Can also manage the account's users
    Admin,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Regular => write!(f, "regular"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" | "user" => Ok(UserRole::Regular),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

/// A user listed in an account document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUser {
    pub name: String,
}

/// Account document: id, service endpoints and users
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Storage account id, e.g. `AUTH_0123abcd`
    #[serde(default)]
    pub account_id: String,

    /// Service name to endpoint map, e.g. `storage -> {default: local, local: https://...}`
    #[serde(default)]
    pub services: BTreeMap<String, BTreeMap<String, String>>,

    #[serde(default)]
    pub users: Vec<AccountUser>,
}

impl AccountInfo {
    /// User names in listing order
    pub fn user_names(&self) -> Vec<&str> {
        self.users.iter().map(|u| u.name.as_str()).collect()
    }

    /// Default endpoint of a service, following its `default` entry
    pub fn default_endpoint(&self, service: &str) -> Option<&str> {
        let endpoints = self.services.get(service)?;
        let default = endpoints.get("default")?;
        endpoints.get(default).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("Regular".parse::<UserRole>().unwrap(), UserRole::Regular);
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::default().is_admin());
    }

    #[test]
    fn test_account_info_deserialization() {
        let json = r#"{
            "account_id": "AUTH_0123abcd",
            "services": {
                "storage": {
                    "default": "local",
                    "local": "https://os.example.com/v1/AUTH_0123abcd"
                }
            },
            "users": [{"name": "admin"}, {"name": "reader"}]
        }"#;

        let info: AccountInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.account_id, "AUTH_0123abcd");
        assert_eq!(info.user_names(), vec!["admin", "reader"]);
        assert_eq!(
            info.default_endpoint("storage"),
            Some("https://os.example.com/v1/AUTH_0123abcd")
        );
        assert_eq!(info.default_endpoint("cdn"), None);
    }

    #[test]
    fn test_account_info_missing_fields() {
        let info: AccountInfo = serde_json::from_str(r#"{"users": []}"#).unwrap();
        assert!(info.account_id.is_empty());
        assert!(info.services.is_empty());
        assert!(info.user_names().is_empty());
    }
}
