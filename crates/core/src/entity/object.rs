use std::fmt;
use std::path::{Path, PathBuf};

use super::{Context, EntityState, StorageEntity};
use crate::client::ClusterClient;
use crate::error::{Error, Result};
use crate::mime::mime_for_path;
use crate::path::EntityKind;
use crate::transport::{Method, Payload};

const OBJECT_PROTECTED_HEADERS: &[&str] = &[
    "ETag",
    "Accept-Ranges",
    "Last-Modified",
    "Date",
    "Connection",
    "Content-Length",
];

/// An object inside a container
#[derive(Clone)]
pub struct Object {
    client: ClusterClient,
    state: EntityState,
}

impl Object {
    pub(crate) fn new(client: ClusterClient, path: impl Into<String>) -> Self {
        Self {
            client,
            state: EntityState::new(path),
        }
    }

    /// Upload the content of a local file instead of the body
    pub fn set_local_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.state.request_mut().set_local_file(path);
        self
    }

    pub fn local_file(&self) -> Option<&Path> {
        self.state.request().local_file()
    }

    /// Schedule deletion at a Unix timestamp
    pub fn delete_at(&mut self, epoch_seconds: i64) -> &mut Self {
        self.set_header("X-Delete-At", epoch_seconds)
    }

    /// Schedule deletion after a number of seconds
    pub fn delete_after(&mut self, seconds: u64) -> &mut Self {
        self.set_header("X-Delete-After", seconds)
    }

    /// Evict the object from the CDN edge caches
    pub fn purge_cache(&mut self) -> Result<bool> {
        self.set_context(Context::Cdn).set_header("X-Cdn-Purge", "true");
        self.cdn_update()
    }

    /// Preload the object into the CDN edge caches
    pub fn load_cache(&mut self) -> Result<bool> {
        self.set_context(Context::Cdn).set_header("X-Cdn-Load", "true");
        self.cdn_update()
    }

    fn cdn_update(&mut self) -> Result<bool> {
        let client = self.client.clone();
        client.with_retry(Method::Post, || client.update(self))?;
        Ok(true)
    }
}

impl StorageEntity for Object {
    fn kind(&self) -> EntityKind {
        EntityKind::Object
    }

    fn client(&self) -> &ClusterClient {
        &self.client
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }

    fn meta_prefix(&self) -> &'static str {
        "X-object-meta-"
    }

    fn protected_headers(&self) -> &'static [&'static str] {
        OBJECT_PROTECTED_HEADERS
    }

    fn prepare_create(&mut self) -> Result<Payload> {
        // a failed file check must leave the request untouched
        let payload = match self.state.request().local_file() {
            Some(path) => file_payload(path.to_path_buf())?,
            None => Payload::Bytes(self.state.request().body().to_vec()),
        };

        match &payload {
            Payload::File { len, .. } => {
                self.state.request_mut().headers.set("Content-Length", len.to_string());
            }
            _ => {
                let missing_length = self
                    .state
                    .request()
                    .headers
                    .get("Content-Length")
                    .is_none_or(|v| v.trim().parse::<u64>().unwrap_or(0) == 0);
                if missing_length {
                    self.state
                        .request_mut()
                        .headers
                        .set("Content-Length", payload.len().to_string());
                }
            }
        }

        let has_type = self
            .state
            .request()
            .headers
            .get("Content-Type")
            .is_some_and(|v| !v.is_empty());
        if !has_type {
            let mime = mime_for_path(self.state.path());
            self.state.request_mut().headers.set("Content-Type", mime);
        }

        Ok(payload)
    }

    fn prepare_update(&mut self) -> Result<Payload> {
        let request = self.state.request_mut();
        for name in OBJECT_PROTECTED_HEADERS {
            request.headers.remove(name);
        }
        let len = request.body().len();
        request.headers.set("Content-Length", len.to_string());

        Ok(Payload::Bytes(request.body().to_vec()))
    }
}

fn file_payload(path: PathBuf) -> Result<Payload> {
    let meta = std::fs::metadata(&path).map_err(|e| {
        Error::Config(format!("Local file {} is not readable: {e}", path.display()))
    })?;
    if !meta.is_file() {
        return Err(Error::Config(format!(
            "Local file {} is not a regular file",
            path.display()
        )));
    }

    let len = meta.len();
    Ok(Payload::File { path, len })
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("path", &self.state.path())
            .field("context", &self.state.context())
            .field("status", &self.state.response().status)
            .field("local_file", &self.local_file())
            .finish()
    }
}
