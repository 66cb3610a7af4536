//! Request and response state carried by a storage entity
//!
//! Header names are normalized on the way in (first character upper-case, the rest
//! lower-case) so `X-Object-Meta-Color` and `x-object-meta-color` address the same
//! slot. Insertion order is preserved and the last write wins.

use std::path::{Path, PathBuf};

/// Normalize a header name: `X-OBJECT-META-Color` becomes `X-object-meta-color`
pub fn normalize_header_name(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Ordered header collection with normalized keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a header, looked up case-insensitively
    pub fn get(&self, name: &str) -> Option<&str> {
        let key = normalize_header_name(name);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a header, replacing any existing value in place
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let key = normalize_header_name(name);
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove a header, returning its previous value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let key = normalize_header_name(name);
        let idx = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.set(k.as_ref(), v);
        }
        headers
    }
}

/// Outbound request intent accumulated on an entity
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub headers: Headers,
    body: Vec<u8>,
    local_file: Option<PathBuf>,
}

impl Request {
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Local file used as the upload source; takes precedence over the body
    pub fn local_file(&self) -> Option<&Path> {
        self.local_file.as_deref()
    }

    pub fn set_local_file(&mut self, path: impl Into<PathBuf>) {
        self.local_file = Some(path.into());
    }

    pub fn clear_local_file(&mut self) {
        self.local_file = None;
    }
}

/// Result of the last exchange with the cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
