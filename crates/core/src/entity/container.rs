use std::fmt;

use super::listing::parse_listing;
use super::{Context, EntityState, PROTECTED_HEADERS, StorageEntity};
use crate::client::ClusterClient;
use crate::entity::{Entity, Object};
use crate::error::Result;
use crate::path::EntityKind;
use crate::transport::Payload;

/// A container, or the account root when the path is empty
#[derive(Clone)]
pub struct Container {
    client: ClusterClient,
    state: EntityState,
    containers: Vec<Container>,
    objects: Vec<Object>,
}

impl Container {
    pub(crate) fn new(client: ClusterClient, path: impl Into<String>) -> Self {
        Self {
            client,
            state: EntityState::new(path),
            containers: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Containers found by the last listing (account root or search)
    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    /// Objects found by the last listing
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn into_children(self) -> (Vec<Container>, Vec<Object>) {
        (self.containers, self.objects)
    }

    /// Make the container publicly readable; takes effect on create or update
    pub fn enable_cdn(&mut self) -> &mut Self {
        self.set_header("X-Container-Read", ".r:*")
    }

    /// Make the container private; takes effect on create or update
    pub fn disable_cdn(&mut self) -> &mut Self {
        self.set_header("X-Container-Read", "")
    }

    /// Attach a CNAME; the cluster allows one per container
    pub fn add_cname(&mut self, cname: &str, cname_type: &str) -> &mut Self {
        self.set_context(Context::Cdn)
            .set_header("X-Cdn-Cname", cname)
            .set_header("X-Cdn-Cname-Type", cname_type)
            .set_header("X-Cdn-Cname-Action", "add")
    }

    pub fn remove_cname(&mut self, cname: &str) -> &mut Self {
        self.set_context(Context::Cdn)
            .set_header("X-Cdn-Cname", cname)
            .set_header("X-Cdn-Cname-Action", "delete")
    }
}

impl StorageEntity for Container {
    fn kind(&self) -> EntityKind {
        EntityKind::Container
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
        "X-container-meta-"
    }

    fn protected_headers(&self) -> &'static [&'static str] {
        PROTECTED_HEADERS
    }

    fn prepare_create(&mut self) -> Result<Payload> {
        Ok(Payload::Empty)
    }

    fn prepare_update(&mut self) -> Result<Payload> {
        for name in self.protected_headers() {
            self.state.request_mut().headers.remove(name);
        }
        Ok(Payload::Empty)
    }

    fn after_get(&mut self) -> Result<()> {
        self.containers.clear();
        self.objects.clear();

        let response = self.state.response();
        if response.body.is_empty() {
            return Ok(());
        }

        let paths = parse_listing(
            self.state.format(),
            self.state.context(),
            self.state.path(),
            &response.body,
        )?;

        for path in paths {
            match self.client.with(&path) {
                Entity::Container(c) => self.containers.push(c),
                Entity::Object(o) => self.objects.push(o),
            }
        }

        tracing::debug!(
            path = %self.state.path(),
            containers = self.containers.len(),
            objects = self.objects.len(),
            "Parsed listing"
        );

        if self.state.context() == Context::Search {
            let (containers, objects) = (self.containers.len(), self.objects.len());
            self.state.set_counts(containers as u64, objects as u64);
        }

        Ok(())
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("path", &self.state.path())
            .field("context", &self.state.context())
            .field("status", &self.state.response().status)
            .field("containers", &self.containers.len())
            .field("objects", &self.objects.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::testing::{STORAGE_URL, recording_client};
    use crate::message::Response;
    use crate::transport::Method;

    #[test]
    fn test_enable_cdn_on_create() {
        let (client, sent) = recording_client(Response::new(201));

        let mut container = client.container("public").unwrap();
        container.enable_cdn().set_ttl(600).create().unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].method, Method::Put);
        assert_eq!(sent[0].url, format!("{STORAGE_URL}/public"));
        assert_eq!(sent[0].header_value("X-Container-Read"), Some(".r:*"));
        assert_eq!(sent[0].header_value("X-Cdn-Ttl"), Some("600"));
    }

    #[test]
    fn test_disable_cdn_on_update() {
        let (client, sent) = recording_client(Response::new(204));

        let mut container = client.container("public").unwrap();
        container.enable_cdn().disable_cdn().update().unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].header_value("X-Container-Read"), Some(""));
    }

    #[test]
    fn test_add_cname() {
        let (client, sent) = recording_client(Response::new(204));

        let mut container = client.container("site").unwrap();
        container.add_cname("files.example.com", "HTTPS").update().unwrap();
        assert_eq!(container.context(), Context::Cdn);

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].header_value("X-Context"), Some("CDN"));
        assert_eq!(sent[0].header_value("X-Cdn-Cname"), Some("files.example.com"));
        assert_eq!(sent[0].header_value("X-Cdn-Cname-Type"), Some("HTTPS"));
        assert_eq!(sent[0].header_value("X-Cdn-Cname-Action"), Some("add"));
    }

    #[test]
    fn test_remove_cname() {
        let (client, sent) = recording_client(Response::new(204));

        let mut container = client.container("site").unwrap();
        container.remove_cname("files.example.com").update().unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].header_value("X-Context"), Some("CDN"));
        assert_eq!(sent[0].header_value("X-Cdn-Cname"), Some("files.example.com"));
        assert_eq!(sent[0].header_value("X-Cdn-Cname-Action"), Some("delete"));
        assert_eq!(sent[0].header_value("X-Cdn-Cname-Type"), None);
    }

    #[test]
    fn test_update_strips_protected_headers() {
        let (client, sent) = recording_client(Response::new(204));

        let mut container = client.container("c").unwrap();
        container
            .set_header("ETag", "abc")
            .set_header("Date", "today")
            .set_meta("Owner", "ops")
            .update()
            .unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].header_value("ETag"), None);
        assert_eq!(sent[0].header_value("Date"), None);
        assert_eq!(sent[0].header_value("X-Container-Meta-Owner"), Some("ops"));
    }
}
