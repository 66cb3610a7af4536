//! Storage entities: containers and objects
//!
//! An entity collects request intent (headers, meta, body, query parameters, search
//! filters, context) and talks to the cluster only when a verb is called. Entities
//! are plain owned values created fresh by [`ClusterClient::with`]; the setters take
//! `&mut self` and return `&mut Self` so calls can be chained.
//!
//! ```ignore
//! let mut container = client.container("photos")?;
//! container.set_meta("Description", "Holiday pictures").create()?;
//!
//! let mut object = client.object("photos/cat.jpg")?;
//! object.set_local_file("/tmp/cat.jpg").create()?;
//! ```

mod container;
mod listing;
mod object;
#[cfg(test)]
mod testing;

use std::fmt;
use std::str::FromStr;

use crate::client::ClusterClient;
use crate::error::{Error, Result};
use crate::message::{Request, Response};
use crate::path::EntityKind;
use crate::transport::{Method, Payload};

pub use container::Container;
pub use object::Object;

/// Page size used by [`StorageEntity::get`]
pub const DEFAULT_LIMIT: u32 = 100;

/// Response-only headers never sent back on update
pub const PROTECTED_HEADERS: &[&str] = &["ETag", "Accept-Ranges", "Last-Modified", "Date", "Connection"];

/// Request mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Context {
    #[default]
    Default,
    Cdn,
    Search,
}

impl Context {
    /// Value sent in the `X-Context` header
    pub fn header_value(&self) -> Option<&'static str> {
        match self {
            Context::Default => None,
            Context::Cdn => Some("CDN"),
            Context::Search => Some("SEARCH"),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Default => write!(f, "default"),
            Context::Cdn => write!(f, "cdn"),
            Context::Search => write!(f, "search"),
        }
    }
}

impl FromStr for Context {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "" | "DEFAULT" => Ok(Context::Default),
            "CDN" => Ok(Context::Cdn),
            "SEARCH" => Ok(Context::Search),
            _ => Err(Error::Config(format!("Invalid context: {s}"))),
        }
    }
}

/// Listing body format requested through the `Accept` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFormat {
    Json,
    Xml,
    Text,
}

impl ListingFormat {
    pub fn accept_header(&self) -> &'static str {
        match self {
            ListingFormat::Json => "application/json; charset=utf-8",
            ListingFormat::Xml => "application/xml; charset=utf-8",
            ListingFormat::Text => "plain/text; charset=utf-8",
        }
    }
}

impl FromStr for ListingFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "JSON" => Ok(ListingFormat::Json),
            "XML" => Ok(ListingFormat::Xml),
            "TEXT" => Ok(ListingFormat::Text),
            _ => Err(Error::Config(format!("Invalid MIME type is provided: {s}"))),
        }
    }
}

/// State shared by both entity kinds
#[derive(Debug, Clone)]
pub struct EntityState {
    path: String,
    context: Context,
    format: Option<ListingFormat>,
    request: Request,
    response: Response,
    limit: Option<u32>,
    marker: String,
    params: Vec<(String, String)>,
    filters: Vec<(String, String)>,
    container_count: Option<u64>,
    object_count: Option<u64>,
}

impl EntityState {
    pub(crate) fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            context: Context::Default,
            format: None,
            request: Request::default(),
            response: Response::default(),
            limit: None,
            marker: String::new(),
            params: Vec::new(),
            filters: Vec::new(),
            container_count: None,
            object_count: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn format(&self) -> Option<ListingFormat> {
        self.format
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    pub fn container_count(&self) -> Option<u64> {
        self.container_count
    }

    pub fn object_count(&self) -> Option<u64> {
        self.object_count
    }

    /// Replace the response with the result of the latest exchange
    pub(crate) fn apply_response(&mut self, response: Response) {
        let count = |name: &str| response.header(name).and_then(|v| v.trim().parse().ok());

        self.container_count =
            count("X-Cdn-Enabled-Item-Count").or_else(|| count("X-Account-Container-Count"));
        self.object_count = count("X-Container-Object-Count");
        self.response = response;
    }

    pub(crate) fn set_counts(&mut self, containers: u64, objects: u64) {
        self.container_count = Some(containers);
        self.object_count = Some(objects);
    }

    /// Query pairs for a GET/HEAD in wire order: marker, params, limit, filters
    pub(crate) fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if !self.marker.is_empty() {
            pairs.push(("marker".to_string(), self.marker.clone()));
        }
        pairs.extend(self.params.iter().cloned());
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if self.context == Context::Search {
            pairs.extend(self.filters.iter().cloned());
        }

        pairs
    }

    /// Query string shown by [`StorageEntity::url`]: marker, filters, params, unencoded
    pub(crate) fn display_query(&self) -> String {
        let mut parts = Vec::new();

        if !self.marker.is_empty() {
            parts.push(format!("marker={}", self.marker));
        }
        parts.extend(self.filters.iter().map(|(k, v)| format!("{k}={v}")));
        parts.extend(self.params.iter().map(|(k, v)| format!("{k}={v}")));

        parts.join("&")
    }
}

fn upsert(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    match pairs.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value,
        None => pairs.push((key.to_string(), value)),
    }
}

/// Behaviour common to containers and objects
///
/// The required methods are the per-kind capabilities; everything else is shared.
pub trait StorageEntity: Sized {
    fn kind(&self) -> EntityKind;

    fn client(&self) -> &ClusterClient;

    fn state(&self) -> &EntityState;

    fn state_mut(&mut self) -> &mut EntityState;

    /// Header prefix for user meta data, e.g. `X-object-meta-`
    fn meta_prefix(&self) -> &'static str;

    /// Headers removed from the request before an update
    fn protected_headers(&self) -> &'static [&'static str];

    /// Fill in defaults for a PUT and produce its body
    fn prepare_create(&mut self) -> Result<Payload>;

    /// Strip response-only headers for a POST and produce its body
    fn prepare_update(&mut self) -> Result<Payload>;

    /// Interpret the body of a successful GET
    fn after_get(&mut self) -> Result<()> {
        Ok(())
    }

    // ========== Accessors ==========

    fn path(&self) -> &str {
        self.state().path()
    }

    fn context(&self) -> Context {
        self.state().context()
    }

    fn request(&self) -> &Request {
        self.state().request()
    }

    fn response(&self) -> &Response {
        self.state().response()
    }

    /// Status code of the last exchange, 0 before any
    fn status_code(&self) -> u16 {
        self.state().response().status
    }

    /// Response header by name, case-insensitive
    fn header(&self, name: &str) -> Option<&str> {
        self.state().response().header(name)
    }

    fn headers(&self) -> &crate::message::Headers {
        &self.state().response().headers
    }

    /// Response body
    fn body(&self) -> &[u8] {
        &self.state().response().body
    }

    /// Meta value from the last response
    fn meta(&self, key: &str) -> Option<&str> {
        let name = format!("{}{}", self.meta_prefix(), key.to_lowercase());
        self.state().response().header(&name)
    }

    /// CDN TTL from the last response
    fn ttl(&self) -> Option<u64> {
        self.header("X-Cdn-Ttl").and_then(|v| v.trim().parse().ok())
    }

    fn container_count(&self) -> Option<u64> {
        self.state().container_count()
    }

    fn object_count(&self) -> Option<u64> {
        self.state().object_count()
    }

    // ========== Builder ==========

    fn set_meta(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let name = format!("{}{}", self.meta_prefix(), key.to_lowercase());
        self.state_mut().request.headers.set(&name, value.to_string());
        self
    }

    fn set_meta_list<I, K, V>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        for (key, value) in entries {
            self.set_meta(key.as_ref(), value);
        }
        self
    }

    fn set_account_meta(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let name = format!("X-Account-Meta-{}", key.to_lowercase());
        self.state_mut().request.headers.set(&name, value.to_string());
        self
    }

    fn set_header(&mut self, name: &str, value: impl ToString) -> &mut Self {
        self.state_mut().request.headers.set(name, value.to_string());
        self
    }

    fn set_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        for (name, value) in headers {
            self.set_header(name.as_ref(), value);
        }
        self
    }

    fn remove_header(&mut self, name: &str) -> &mut Self {
        self.state_mut().request.headers.remove(name);
        self
    }

    fn set_body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.state_mut().request.set_body(body);
        self
    }

    /// Add a URL query parameter
    fn set_param(&mut self, key: &str, value: impl ToString) -> &mut Self {
        upsert(&mut self.state_mut().params, key, value.to_string());
        self
    }

    /// Add a search filter; only valid in [`Context::Search`]
    fn set_filter(&mut self, key: &str, value: impl ToString) -> Result<&mut Self> {
        if self.context() != Context::Search {
            return Err(Error::Config(
                "Filter can be set within the \"search\" context only".to_string(),
            ));
        }
        upsert(&mut self.state_mut().filters, key, value.to_string());
        Ok(self)
    }

    fn set_context(&mut self, context: Context) -> &mut Self {
        let state = self.state_mut();
        state.context = context;
        match context.header_value() {
            Some(value) => state.request.headers.set("X-Context", value),
            None => {
                state.request.headers.remove("X-Context");
            }
        }
        self
    }

    fn remove_context(&mut self) -> &mut Self {
        self.set_context(Context::Default)
    }

    /// CDN cache lifetime in seconds
    fn set_ttl(&mut self, seconds: u64) -> &mut Self {
        self.set_header("X-Cdn-Ttl", seconds)
    }

    fn set_format(&mut self, format: ListingFormat) -> &mut Self {
        let state = self.state_mut();
        state.request.headers.set("Accept", format.accept_header());
        state.format = Some(format);
        self
    }

    /// Like [`set_format`](Self::set_format) from a `JSON`/`XML`/`TEXT` string
    fn set_mime(&mut self, mime: &str) -> Result<&mut Self> {
        let format = mime.parse()?;
        Ok(self.set_format(format))
    }

    // ========== Verbs ==========

    /// Display URL including query state; the wire request encodes the path instead
    fn url(&self) -> Result<String> {
        let auth = self.client().authentication_data()?;
        let mut url = format!(
            "{}/{}",
            auth.storage_url,
            self.path().trim_start_matches('/')
        );
        let query = self.state().display_query();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        Ok(url)
    }

    /// GET with the default page size
    fn get(&mut self) -> Result<&mut Self> {
        self.get_page(DEFAULT_LIMIT, "")
    }

    /// GET with an explicit page size and marker; both are ignored for objects
    fn get_page(&mut self, limit: u32, marker: &str) -> Result<&mut Self> {
        {
            let state = self.state_mut();
            state.limit = Some(limit);
            state.marker = marker.to_string();
        }

        let client = self.client().clone();
        client.with_retry(Method::Get, || client.fetch(self, true))?;
        self.after_get()?;
        Ok(self)
    }

    /// Re-read the entity; same as [`get`](Self::get)
    fn reload(&mut self) -> Result<&mut Self> {
        self.get()
    }

    /// HEAD: headers and meta data only
    fn get_info(&mut self) -> Result<&mut Self> {
        let client = self.client().clone();
        client.with_retry(Method::Head, || client.fetch(self, false))?;
        Ok(self)
    }

    /// PUT
    fn create(&mut self) -> Result<&mut Self> {
        let client = self.client().clone();
        client.with_retry(Method::Put, || client.create(self))?;
        Ok(self)
    }

    /// POST
    fn update(&mut self) -> Result<&mut Self> {
        let client = self.client().clone();
        client.with_retry(Method::Post, || client.update(self))?;
        Ok(self)
    }

    /// DELETE; failures are errors, so `Ok` always carries `true`
    fn delete(&mut self) -> Result<bool> {
        let client = self.client().clone();
        client.with_retry(Method::Delete, || client.delete(self))
    }

    /// Public CDN URLs, probing the cluster when they are not already known
    fn cdn_urls(&mut self) -> Result<Vec<String>> {
        let client = self.client().clone();
        client.with_retry(Method::Head, || client.cdn_urls(self))
    }
}

/// A resolved entity of either kind
#[derive(Debug, Clone)]
pub enum Entity {
    Container(Container),
    Object(Object),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Container(_) => EntityKind::Container,
            Entity::Object(_) => EntityKind::Object,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Entity::Container(c) => c.path(),
            Entity::Object(o) => o.path(),
        }
    }

    pub fn state(&self) -> &EntityState {
        match self {
            Entity::Container(c) => c.state(),
            Entity::Object(o) => o.state(),
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Entity::Container(c) => Some(c),
            Entity::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Entity::Object(o) => Some(o),
            Entity::Container(_) => None,
        }
    }

    pub fn into_container(self) -> Option<Container> {
        match self {
            Entity::Container(c) => Some(c),
            Entity::Object(_) => None,
        }
    }

    pub fn into_object(self) -> Option<Object> {
        match self {
            Entity::Object(o) => Some(o),
            Entity::Container(_) => None,
        }
    }

    /// HEAD on either kind
    pub fn get_info(&mut self) -> Result<&EntityState> {
        match self {
            Entity::Container(c) => c.get_info().map(|c| c.state()),
            Entity::Object(o) => o.get_info().map(|o| o.state()),
        }
    }

    /// GET on either kind
    pub fn get(&mut self) -> Result<&EntityState> {
        match self {
            Entity::Container(c) => c.get().map(|c| c.state()),
            Entity::Object(o) => o.get().map(|o| o.state()),
        }
    }

    pub fn delete(&mut self) -> Result<bool> {
        match self {
            Entity::Container(c) => c.delete(),
            Entity::Object(o) => o.delete(),
        }
    }
}

impl From<Container> for Entity {
    fn from(c: Container) -> Self {
        Entity::Container(c)
    }
}

impl From<Object> for Entity {
    fn from(o: Object) -> Self {
        Entity::Object(o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_str() {
        assert_eq!("cdn".parse::<Context>().unwrap(), Context::Cdn);
        assert_eq!("Search".parse::<Context>().unwrap(), Context::Search);
        assert_eq!("".parse::<Context>().unwrap(), Context::Default);
        assert!(matches!("bogus".parse::<Context>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_listing_format_from_str() {
        assert_eq!("json".parse::<ListingFormat>().unwrap(), ListingFormat::Json);
        assert_eq!("XML".parse::<ListingFormat>().unwrap(), ListingFormat::Xml);
        assert_eq!("Text".parse::<ListingFormat>().unwrap(), ListingFormat::Text);
        assert!(matches!("yaml".parse::<ListingFormat>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_query_pairs_order() {
        let mut state = EntityState::new("photos");
        state.marker = "cat.jpg".into();
        state.limit = Some(10);
        state.params.push(("prefix".into(), "2024/".into()));
        state.filters.push(("q".into(), "cat".into()));

        let keys: Vec<String> = state.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["marker", "prefix", "limit"]);

        state.context = Context::Search;
        let keys: Vec<String> = state.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["marker", "prefix", "limit", "q"]);
    }

    #[test]
    fn test_zero_limit_is_omitted() {
        let mut state = EntityState::new("photos");
        state.limit = Some(0);
        assert!(state.query_pairs().is_empty());
    }

    #[test]
    fn test_display_query_order() {
        let mut state = EntityState::new("");
        state.marker = "m".into();
        state.params.push(("format".into(), "json".into()));
        state.filters.push(("type".into(), "object".into()));
        assert_eq!(state.display_query(), "marker=m&type=object&format=json");
    }

    #[test]
    fn test_apply_response_counts() {
        let mut state = EntityState::new("");
        state.apply_response(
            Response::new(204)
                .with_header("X-Account-Container-Count", "3")
                .with_header("X-Container-Object-Count", "12"),
        );
        assert_eq!(state.container_count(), Some(3));
        assert_eq!(state.object_count(), Some(12));

        state.apply_response(
            Response::new(204)
                .with_header("X-Account-Container-Count", "3")
                .with_header("X-Cdn-Enabled-Item-Count", "2"),
        );
        assert_eq!(state.container_count(), Some(2));
        assert_eq!(state.object_count(), None);
    }

    #[test]
    fn test_ttl_round_trip() {
        let (client, sent) =
            testing::recording_client(Response::new(204).with_header("X-Cdn-Ttl", "900"));

        let mut container = client.container("public").unwrap();
        assert_eq!(container.ttl(), None);
        container.set_context(Context::Cdn).set_ttl(900).update().unwrap();

        assert_eq!(container.ttl(), Some(900));
        assert_eq!(sent.lock().unwrap()[0].header_value("X-Cdn-Ttl"), Some("900"));
    }

    #[test]
    fn test_set_account_meta() {
        let (client, sent) = testing::recording_client(Response::new(204));

        client.root().set_account_meta("Quota", 1024).update().unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].url, format!("{}/", testing::STORAGE_URL));
        assert_eq!(sent[0].header_value("X-Account-Meta-Quota"), Some("1024"));
    }

    #[test]
    fn test_remove_context() {
        let (client, sent) = testing::recording_client(Response::new(204));

        let mut container = client.container("c").unwrap();
        container.set_context(Context::Cdn).remove_context();
        assert_eq!(container.context(), Context::Default);
        container.get_info().unwrap();

        assert_eq!(sent.lock().unwrap()[0].header_value("X-Context"), None);
    }

    #[test]
    fn test_set_headers() {
        let (client, sent) = testing::recording_client(Response::new(204));

        client
            .object("c/a.txt")
            .unwrap()
            .set_headers([("X-Trace", "abc"), ("X-Object-Manifest", "c/parts/")])
            .get_info()
            .unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].method, Method::Head);
        assert_eq!(sent[0].header_value("X-Trace"), Some("abc"));
        assert_eq!(sent[0].header_value("X-Object-Manifest"), Some("c/parts/"));
    }

    #[test]
    fn test_reload_repeats_get() {
        let (client, sent) = testing::recording_client(Response::new(200).with_body("a\n"));

        let mut container = client.container("c").unwrap();
        container.get().unwrap();
        container.reload().unwrap();

        assert_eq!(container.objects().len(), 1);
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|r| r.method == Method::Get));
        assert_eq!(sent[1].url, format!("{}/c?limit=100", testing::STORAGE_URL));
    }
}
