//! Cluster client
//!
//! [`ClusterClient`] owns the credentials, the transport and the token store for
//! one cluster. It resolves paths into entities and performs the HTTP exchange behind
//! every entity verb. Clones share the same inner state.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::{AuthData, Credentials};
use crate::entity::{Container, Context, Entity, Object, StorageEntity};
use crate::error::{Error, HttpError, Result};
use crate::message::Response;
use crate::path::{EntityKind, resolve};
use crate::retry::{RetryPolicy, retry_after_reauth};
use crate::token_store::{MemoryTokenStore, TokenStore};
use crate::transport::{HttpRequest, Method, Transport};

/// Default connect/read timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Response headers that carry public CDN URLs
const CDN_URL_HEADERS: &[&str] = &[
    "X-Cdn-Url",
    "X-Cdn-Stream-Http-Url",
    "X-Cdn-Stream-Flash-Url",
    "X-Cdn-Custom-Url",
    "X-Cdn-Custom-Stream-Http-Url",
    "X-Cdn-Custom-Stream-Flash-Url",
];

/// Transport options fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Connect and read timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: false,
        }
    }
}

impl ClientOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Client for one storage cluster and one login
#[derive(Clone)]
pub struct ClusterClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    credentials: Credentials,
    transport: Box<dyn Transport>,
    token_store: Arc<dyn TokenStore>,
    retry: RetryPolicy,
    auth: Mutex<Option<AuthData>>,
}

/// Builder for [`ClusterClient`]
pub struct ClusterClientBuilder {
    credentials: Credentials,
    transport: Box<dyn Transport>,
    token_store: Option<Arc<dyn TokenStore>>,
    retry: RetryPolicy,
}

impl ClusterClientBuilder {
    /// Share a token store between clients; defaults to a private in-memory store
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn build(self) -> ClusterClient {
        let token_store = self
            .token_store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::default()));

        ClusterClient {
            inner: Arc::new(ClientInner {
                credentials: self.credentials,
                transport: self.transport,
                token_store,
                retry: self.retry,
                auth: Mutex::new(None),
            }),
        }
    }
}

impl ClusterClient {
    pub fn builder(
        credentials: Credentials,
        transport: impl Transport + 'static,
    ) -> ClusterClientBuilder {
        ClusterClientBuilder {
            credentials,
            transport: Box::new(transport),
            token_store: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.inner.token_store
    }

    // ========== Authentication ==========

    /// Exchange the credentials for a storage URL and token; never cached, never retried
    pub fn authenticate(&self) -> Result<AuthData> {
        let credentials = &self.inner.credentials;
        let request = HttpRequest::new(Method::Get, format!("{}/auth/v1.0", credentials.host))
            .header("X-Auth-User", &credentials.username)
            .header("X-Auth-Key", &credentials.password);

        tracing::info!(
            host = %credentials.host,
            username = %credentials.username,
            "Authenticating"
        );

        let response = self.inner.transport.send(request).map_err(|e| match e {
            Error::Transport(msg) => Error::Authentication(msg),
            other => other,
        })?;

        if !response.is_success() {
            return Err(HttpError::new(response.status).into());
        }

        let storage_url = response.header("X-Storage-Url").unwrap_or_default();
        let auth_token = response.header("X-Auth-Token").unwrap_or_default();
        if storage_url.is_empty() || auth_token.is_empty() {
            return Err(Error::Authentication(
                "Response did not include a storage URL and token".to_string(),
            ));
        }

        Ok(AuthData {
            storage_url: storage_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.to_string(),
        })
    }

    /// Authentication data from this client, then the token store, then the cluster
    pub fn authentication_data(&self) -> Result<AuthData> {
        let mut slot = self.lock_auth();
        if let Some(data) = slot.as_ref() {
            return Ok(data.clone());
        }

        let key = self.inner.credentials.cache_key();
        let cached = self.inner.token_store.get(&key).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Token store read failed; authenticating");
            None
        });
        let data = match cached {
            Some(data) => {
                tracing::debug!(username = %self.inner.credentials.username, "Using cached token");
                data
            }
            None => {
                let data = self.authenticate()?;
                self.store_token(&key, &data);
                data
            }
        };

        *slot = Some(data.clone());
        Ok(data)
    }

    /// Authenticate again, replacing both the in-process and the stored token
    pub fn reload_authentication_data(&self) -> Result<bool> {
        let data = self.authenticate()?;
        self.store_token(&self.inner.credentials.cache_key(), &data);
        *self.lock_auth() = Some(data);
        Ok(true)
    }

    /// The store is only a cache; a failed write leaves the in-process token in use
    fn store_token(&self, key: &str, data: &AuthData) {
        if let Err(e) = self.inner.token_store.set(key, data) {
            tracing::warn!(error = %e, "Token store write failed");
        }
    }

    fn lock_auth(&self) -> MutexGuard<'_, Option<AuthData>> {
        self.inner.auth.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========== Entities ==========

    /// Resolve a path into a fresh container or object
    pub fn with(&self, path: &str) -> Entity {
        let resolved = resolve(path);
        match resolved.kind() {
            EntityKind::Container => Container::new(self.clone(), resolved.path).into(),
            EntityKind::Object => Object::new(self.clone(), resolved.path).into(),
        }
    }

    /// The account root, used for account listings and search
    pub fn root(&self) -> Container {
        Container::new(self.clone(), "")
    }

    pub fn container(&self, path: &str) -> Result<Container> {
        self.with(path).into_container().ok_or_else(|| {
            Error::Config(format!("'{path}' is an object path, not a container"))
        })
    }

    pub fn object(&self, path: &str) -> Result<Object> {
        self.with(path).into_object().ok_or_else(|| {
            Error::Config(format!("'{path}' is a container path, not an object"))
        })
    }

    // ========== Exchanges ==========

    /// Run one entity exchange under this client's retry policy
    pub fn with_retry<T, F>(&self, method: Method, operation: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        retry_after_reauth(&self.inner.retry, method, operation, || {
            self.reload_authentication_data().map(|_| ())
        })
    }

    /// GET (with body) or HEAD, including the query state
    pub(crate) fn fetch<E: StorageEntity>(&self, entity: &mut E, with_body: bool) -> Result<()> {
        let auth = self.authentication_data()?;
        let method = if with_body { Method::Get } else { Method::Head };
        let url = storage_url(&auth, entity.path(), &entity.state().query_pairs());

        let mut request = HttpRequest::new(method, url).header("X-Auth-Token", &auth.auth_token);
        request.headers.extend(caller_headers(entity));

        let response = self.send(request)?;
        if !response.is_success() {
            return Err(failure(&response, format!("Failed to retrieve \"{}\".", entity.path())));
        }

        entity.state_mut().apply_response(response);
        Ok(())
    }

    /// PUT
    pub(crate) fn create<E: StorageEntity>(&self, entity: &mut E) -> Result<()> {
        let auth = self.authentication_data()?;
        let payload = entity.prepare_create()?;
        let url = storage_url(&auth, entity.path(), entity.state().params());

        let mut request = HttpRequest::new(Method::Put, url).header("X-Auth-Token", &auth.auth_token);
        request.headers.extend(caller_headers(entity));
        request.payload = payload;

        let response = self.send(request)?;
        if !response.is_success() {
            return Err(failure(
                &response,
                format!("Failed to create {} \"{}\".", entity.kind(), entity.path()),
            ));
        }

        entity.state_mut().apply_response(response);
        Ok(())
    }

    /// POST
    pub(crate) fn update<E: StorageEntity>(&self, entity: &mut E) -> Result<()> {
        let auth = self.authentication_data()?;
        let payload = entity.prepare_update()?;
        let url = storage_url(&auth, entity.path(), entity.state().params());

        let mut request = HttpRequest::new(Method::Post, url).header("X-Auth-Token", &auth.auth_token);
        request.headers.extend(caller_headers(entity));
        request.payload = payload;

        let response = self.send(request)?;
        if !response.is_success() {
            let mut context = format!("Failed to save {} \"{}\".", entity.kind(), entity.path());
            let body = response.body_text();
            if !body.trim().is_empty() {
                context.push(' ');
                context.push_str(body.trim());
            }
            return Err(failure(&response, context));
        }

        entity.state_mut().apply_response(response);
        Ok(())
    }

    /// DELETE; only the token and the caller's query parameters are sent
    pub(crate) fn delete<E: StorageEntity>(&self, entity: &mut E) -> Result<bool> {
        let auth = self.authentication_data()?;
        let url = storage_url(&auth, entity.path(), entity.state().params());
        let request = HttpRequest::new(Method::Delete, url).header("X-Auth-Token", &auth.auth_token);

        let response = self.send(request)?;
        if !response.is_success() {
            return Err(failure(
                &response,
                format!("Failed to delete {} \"{}\".", entity.kind(), entity.path()),
            ));
        }

        entity.state_mut().apply_response(response);
        Ok(true)
    }

    /// CDN URLs of an entity, probing with a CDN-context HEAD when needed
    pub(crate) fn cdn_urls<E: StorageEntity>(&self, entity: &mut E) -> Result<Vec<String>> {
        if entity.headers().is_empty() || entity.context() != Context::Cdn {
            let auth = self.authentication_data()?;
            let url = storage_url(&auth, entity.path(), &[]);
            let request = HttpRequest::new(Method::Head, url)
                .header("X-Auth-Token", &auth.auth_token)
                .header("X-Context", "cdn");

            let response = self.send(request)?;
            if !response.is_success() {
                return Err(failure(
                    &response,
                    format!("Failed to retrieve \"{}\".", entity.path()),
                ));
            }
            entity.state_mut().apply_response(response);
        }

        Ok(CDN_URL_HEADERS
            .iter()
            .filter_map(|name| entity.header(name))
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub(crate) fn send(&self, request: HttpRequest) -> Result<Response> {
        let method = request.method;
        let url = request.url.clone();
        let len = request.payload.len();

        let response = self.inner.transport.send(request)?;
        tracing::debug!(
            method = %method,
            url = %url,
            bytes = len,
            status = response.status,
            "Request completed"
        );

        Ok(response)
    }
}

impl fmt::Debug for ClusterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterClient")
            .field("host", &self.inner.credentials.host)
            .field("username", &self.inner.credentials.username)
            .field("retry", &self.inner.retry)
            .field("token_store", &self.inner.token_store)
            .finish_non_exhaustive()
    }
}

/// `{storage_url}/{encoded path}[?query]`
fn storage_url(auth: &AuthData, path: &str, query: &[(String, String)]) -> String {
    let mut url = format!(
        "{}/{}",
        auth.storage_url,
        urlencoding::encode(path.trim_start_matches('/'))
    );

    if !query.is_empty() {
        let query = query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        url.push('?');
        url.push_str(&query);
    }

    url
}

fn caller_headers<E: StorageEntity>(entity: &E) -> Vec<(String, String)> {
    entity
        .request()
        .headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn failure(response: &Response, context: String) -> Error {
    HttpError::with_context(response.status, context).into()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::entity::ListingFormat;
    use crate::transport::{MockTransport, Payload};

    const STORAGE_URL: &str = "https://os.example.com/v1/AUTH_acct";

    fn credentials() -> Credentials {
        Credentials::new("https://os.example.com", "acct:user", "secret").unwrap()
    }

    fn auth_response() -> Response {
        Response::new(200)
            .with_header("X-Storage-Url", STORAGE_URL)
            .with_header("X-Auth-Token", "AUTH_tk123")
    }

    type Sent = Arc<Mutex<Vec<HttpRequest>>>;

    /// Answers authentication itself and hands every other request to `handler`
    fn cluster<H>(auth_calls: &Arc<AtomicUsize>, sent: &Sent, mut handler: H) -> MockTransport
    where
        H: FnMut(&HttpRequest) -> Result<Response> + Send + 'static,
    {
        let auth_calls = Arc::clone(auth_calls);
        let sent = Arc::clone(sent);
        let mut mock = MockTransport::new();
        mock.expect_send().returning(move |request| {
            if request.url.ends_with("/auth/v1.0") {
                auth_calls.fetch_add(1, Ordering::SeqCst);
                return Ok(auth_response());
            }
            let response = handler(&request);
            sent.lock().unwrap().push(request);
            response
        });
        mock
    }

    fn ok(_: &HttpRequest) -> Result<Response> {
        Ok(Response::new(204))
    }

    #[test]
    fn test_client_options_default() {
        let options = ClientOptions::default();
        assert_eq!(options.timeout(), Duration::from_secs(10));
        assert!(!options.accept_invalid_certs);
    }

    #[test]
    fn test_authenticate_sends_credentials() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|r| {
                r.method == Method::Get
                    && r.url == "https://os.example.com/auth/v1.0"
                    && r.header_value("X-Auth-User") == Some("acct:user")
                    && r.header_value("X-Auth-Key") == Some("secret")
            })
            .times(1)
            .returning(|_| Ok(auth_response()));

        let client = ClusterClient::builder(credentials(), mock).build();
        let auth = client.authenticate().unwrap();
        assert_eq!(auth.storage_url, STORAGE_URL);
        assert_eq!(auth.auth_token, "AUTH_tk123");
    }

    #[test]
    fn test_authenticate_transport_failure() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Err(Error::Transport("connection refused".to_string())));

        let client = ClusterClient::builder(credentials(), mock).build();
        assert!(matches!(client.authenticate(), Err(Error::Authentication(_))));
    }

    #[test]
    fn test_authenticate_rejected() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|_| Ok(Response::new(401)));

        let client = ClusterClient::builder(credentials(), mock).build();
        let err = client.authenticate().unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_authentication_is_cached() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let client = ClusterClient::builder(credentials(), cluster(&auth_calls, &sent, ok)).build();

        client.container("photos").unwrap().get_info().unwrap();
        client.container("photos").unwrap().get_info().unwrap();

        assert_eq!(auth_calls.load(Ordering::SeqCst), 1);
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_shared_token_store_authenticates_once() {
        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::default());
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();

        let first = ClusterClient::builder(credentials(), cluster(&auth_calls, &sent, ok))
            .token_store(Arc::clone(&store))
            .build();
        let second = ClusterClient::builder(credentials(), cluster(&auth_calls, &sent, ok))
            .token_store(Arc::clone(&store))
            .build();

        first.root().get_info().unwrap();
        second.root().get_info().unwrap();

        assert_eq!(auth_calls.load(Ordering::SeqCst), 1);
        for request in sent.lock().unwrap().iter() {
            assert_eq!(request.header_value("X-Auth-Token"), Some("AUTH_tk123"));
        }
    }

    #[test]
    fn test_broken_token_store_is_a_cache_miss() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store: Arc<dyn TokenStore> =
            Arc::new(crate::token_store::FileTokenStore::new(blocker.join("sub"), 600));
        assert!(store.get(&credentials().cache_key()).is_err());

        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let client = ClusterClient::builder(credentials(), cluster(&auth_calls, &sent, ok))
            .token_store(store)
            .build();

        client.root().get_info().unwrap();
        client.root().get_info().unwrap();
        assert!(client.reload_authentication_data().unwrap());

        // one login for the verbs, one for the reload
        assert_eq!(auth_calls.load(Ordering::SeqCst), 2);
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_retry_after_unauthorized() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let mut attempts = 0;
        let mock = cluster(&auth_calls, &sent, move |_| {
            attempts += 1;
            if attempts == 1 {
                Ok(Response::new(401))
            } else {
                Ok(Response::new(200).with_body("a.txt\n"))
            }
        });
        let client = ClusterClient::builder(credentials(), mock).build();

        let mut container = client.container("c").unwrap();
        container.get().unwrap();

        assert_eq!(container.status_code(), 200);
        assert_eq!(container.objects().len(), 1);
        // initial authentication plus exactly one reload
        assert_eq!(auth_calls.load(Ordering::SeqCst), 2);
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_second_failure_propagates() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let mut attempts = 0;
        let mock = cluster(&auth_calls, &sent, move |_| {
            attempts += 1;
            Ok(Response::new(if attempts == 1 { 401 } else { 404 }))
        });
        let client = ClusterClient::builder(credentials(), mock).build();

        let err = client.object("c/missing.txt").unwrap().get().unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("Failed to retrieve \"c/missing.txt\"."));
        assert_eq!(auth_calls.load(Ordering::SeqCst), 2);
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_put_not_retried_on_server_error() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let mock = cluster(&auth_calls, &sent, |_| Ok(Response::new(500)));
        let client = ClusterClient::builder(credentials(), mock).build();

        let err = client.object("c/a.txt").unwrap().set_body("x").create().unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(sent.lock().unwrap().len(), 1);
        assert_eq!(auth_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_legacy_policy_retries_put() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let mock = cluster(&auth_calls, &sent, |_| Ok(Response::new(500)));
        let client = ClusterClient::builder(credentials(), mock)
            .retry_policy(RetryPolicy::legacy())
            .build();

        assert!(client.object("c/a.txt").unwrap().create().is_err());
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_create_object_defaults() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let client = ClusterClient::builder(
            credentials(),
            cluster(&auth_calls, &sent, |_| Ok(Response::new(201))),
        )
        .build();

        client.object("c/x.json").unwrap().set_body("hello").create().unwrap();

        let sent = sent.lock().unwrap();
        let request = &sent[0];
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.url, format!("{STORAGE_URL}/c%2Fx.json"));
        assert_eq!(request.header_value("Content-Length"), Some("5"));
        assert_eq!(request.header_value("Content-Type"), Some("application/json"));
        assert_eq!(request.payload, Payload::Bytes(b"hello".to_vec()));
    }

    #[test]
    fn test_create_object_from_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "twelve bytes").unwrap();

        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let client = ClusterClient::builder(
            credentials(),
            cluster(&auth_calls, &sent, |_| Ok(Response::new(201))),
        )
        .build();

        client
            .object("c/notes")
            .unwrap()
            .set_header("Content-Length", 999)
            .set_local_file(&file)
            .create()
            .unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].header_value("Content-Length"), Some("12"));
        assert_eq!(sent[0].payload, Payload::File { path: file, len: 12 });
        assert_eq!(
            sent[0].header_value("Content-Type"),
            Some(crate::mime::DIRECTORY_MIME)
        );
    }

    #[test]
    fn test_create_object_missing_local_file() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let client = ClusterClient::builder(credentials(), cluster(&auth_calls, &sent, ok)).build();

        let err = client
            .object("c/a.bin")
            .unwrap()
            .set_local_file("/nonexistent/a.bin")
            .create()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_fetch_url_and_query() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let client = ClusterClient::builder(credentials(), cluster(&auth_calls, &sent, ok)).build();

        let mut container = client.container("my photos").unwrap();
        container
            .set_param("prefix", "2024 trip/")
            .set_header("X-Trace", "abc")
            .get_page(10, "m1")
            .unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].method, Method::Get);
        assert_eq!(
            sent[0].url,
            format!("{STORAGE_URL}/my%20photos?marker=m1&prefix=2024%20trip%2F&limit=10")
        );
        assert_eq!(sent[0].header_value("X-Trace"), Some("abc"));
        assert_eq!(
            container.url().unwrap(),
            format!("{STORAGE_URL}/my photos?marker=m1&prefix=2024 trip/")
        );
    }

    #[test]
    fn test_search_filters_sent_last() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let client = ClusterClient::builder(credentials(), cluster(&auth_calls, &sent, ok)).build();

        let mut root = client.root();
        root.set_context(Context::Search)
            .set_filter("q", "cat")
            .unwrap()
            .set_param("format", "json");
        root.get().unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(
            sent[0].url,
            format!("{STORAGE_URL}/?format=json&limit=100&q=cat")
        );
        assert_eq!(sent[0].header_value("X-Context"), Some("SEARCH"));
    }

    #[test]
    fn test_set_filter_outside_search() {
        let client = ClusterClient::builder(credentials(), MockTransport::new()).build();
        let err = client.root().set_filter("q", "cat").map(|_| ()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_get_json_listing() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let mock = cluster(&auth_calls, &sent, |_| {
            Ok(Response::new(200)
                .with_header("X-Container-Object-Count", "2")
                .with_body(r#"[{"name":"a.txt"},{"subdir":"b/"}]"#))
        });
        let client = ClusterClient::builder(credentials(), mock).build();

        let mut container = client.container("c").unwrap();
        container.set_format(ListingFormat::Json).get().unwrap();

        let paths: Vec<&str> = container.objects().iter().map(|o| o.path()).collect();
        assert_eq!(paths, vec!["c/a.txt", "c/b/"]);
        assert!(container.containers().is_empty());
        assert_eq!(container.object_count(), Some(2));
        assert_eq!(
            sent.lock().unwrap()[0].header_value("Accept"),
            Some("application/json; charset=utf-8")
        );
    }

    #[test]
    fn test_update_strips_protected_headers() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let client = ClusterClient::builder(credentials(), cluster(&auth_calls, &sent, ok)).build();

        let mut object = client.object("c/a.txt").unwrap();
        object
            .set_header("ETag", "abc")
            .set_header("Last-Modified", "yesterday")
            .set_header("Content-Length", 99)
            .set_meta("Color", "blue")
            .update()
            .unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].header_value("ETag"), None);
        assert_eq!(sent[0].header_value("Last-Modified"), None);
        assert_eq!(sent[0].header_value("Content-Length"), Some("0"));
        assert_eq!(sent[0].header_value("X-Object-Meta-Color"), Some("blue"));
    }

    #[test]
    fn test_update_failure_includes_body() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let mock = cluster(&auth_calls, &sent, |_| {
            Ok(Response::new(400).with_body("Metadata value too long"))
        });
        let client = ClusterClient::builder(credentials(), mock)
            .retry_policy(RetryPolicy::never())
            .build();

        let err = client.container("c").unwrap().update().unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("Metadata value too long"));
    }

    #[test]
    fn test_delete_sends_only_token() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let client = ClusterClient::builder(credentials(), cluster(&auth_calls, &sent, ok)).build();

        let mut object = client.object("c/a.txt").unwrap();
        object
            .set_header("X-Trace", "abc")
            .set_param("multipart-manifest", "delete");
        assert!(object.delete().unwrap());

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].method, Method::Delete);
        assert_eq!(
            sent[0].url,
            format!("{STORAGE_URL}/c%2Fa.txt?multipart-manifest=delete")
        );
        assert_eq!(sent[0].headers.len(), 1);
    }

    #[test]
    fn test_cdn_urls_probe() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let mock = cluster(&auth_calls, &sent, |_| {
            Ok(Response::new(204)
                .with_header("X-Cdn-Url", "http://cdn.example.com/c")
                .with_header("X-Cdn-Stream-Http-Url", "http://stream.example.com/c")
                .with_header("X-Container-Read", ".r:*"))
        });
        let client = ClusterClient::builder(credentials(), mock).build();

        let mut container = client.container("c").unwrap();
        let urls = container.cdn_urls().unwrap();
        assert_eq!(
            urls,
            vec!["http://cdn.example.com/c", "http://stream.example.com/c"]
        );

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].method, Method::Head);
        assert_eq!(sent[0].header_value("X-Context"), Some("cdn"));
    }

    #[test]
    fn test_cdn_urls_from_cdn_response() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let mock = cluster(&auth_calls, &sent, |_| {
            Ok(Response::new(204).with_header("X-Cdn-Custom-Url", "http://files.example.com"))
        });
        let client = ClusterClient::builder(credentials(), mock).build();

        let mut container = client.container("c").unwrap();
        container.set_context(Context::Cdn).get_info().unwrap();
        let urls = container.cdn_urls().unwrap();

        assert_eq!(urls, vec!["http://files.example.com"]);
        // the HEAD from get_info is reused
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_purge_cache() {
        let auth_calls = Arc::new(AtomicUsize::new(0));
        let sent = Sent::default();
        let client = ClusterClient::builder(credentials(), cluster(&auth_calls, &sent, ok)).build();

        assert!(client.object("c/a.txt").unwrap().purge_cache().unwrap());

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].header_value("X-Context"), Some("CDN"));
        assert_eq!(sent[0].header_value("X-Cdn-Purge"), Some("true"));
    }

    #[test]
    fn test_with_resolves_kind() {
        let client = ClusterClient::builder(credentials(), MockTransport::new()).build();

        assert_eq!(client.with("photos").kind(), EntityKind::Container);
        assert_eq!(client.with("/photos/2024/cat.jpg").kind(), EntityKind::Object);
        assert_eq!(client.with("photos/2024/cat.jpg").path(), "photos/2024/cat.jpg");
        assert!(matches!(client.container("a/b"), Err(Error::Config(_))));
        assert!(matches!(client.object("a"), Err(Error::Config(_))));
    }
}
