//! osc-http: Blocking HTTP transport for osc
//!
//! Implements the [`Transport`] trait from osc-core on top of
//! `reqwest::blocking`, with rustls for TLS.

use std::fs::File;
use std::sync::Arc;

use osc_core::{
    ClientOptions, ClusterClient, ClusterClientBuilder, Credentials, Error, Headers, HttpRequest,
    Method, Payload, Response, Result, TokenStore, Transport,
};
use reqwest::blocking::{Body, Client};

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the given timeout and TLS settings
    pub fn new(options: &ClientOptions) -> Result<Self> {
        if options.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled");
        }

        let client = Client::builder()
            .timeout(options.timeout())
            .connect_timeout(options.timeout())
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Convert an outbound request into a reqwest request without sending it
    pub fn build_request(&self, request: HttpRequest) -> Result<reqwest::blocking::Request> {
        let mut builder = self.client.request(method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.payload {
            Payload::Empty => builder,
            Payload::Bytes(bytes) => builder.body(bytes),
            Payload::File { path, len } => {
                let file = File::open(&path)?;
                builder.body(Body::sized(file, len))
            }
        };

        builder.build().map_err(|e| Error::Transport(describe(&e)))
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> Result<Response> {
        let request = self.build_request(request)?;
        let response = self
            .client
            .execute(request)
            .map_err(|e| Error::Transport(describe(&e)))?;

        let status = response.status().as_u16();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            match value.to_str() {
                Ok(value) => headers.set(name.as_str(), value),
                Err(_) => tracing::debug!(header = %name, "Skipping non-ASCII header value"),
            }
        }

        let body = response
            .bytes()
            .map_err(|e| Error::Transport(describe(&e)))?
            .to_vec();

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

fn method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Put => reqwest::Method::PUT,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("Request timed out: {error}")
    } else if error.is_connect() {
        format!("Connection failed: {error}")
    } else if error.is_builder() {
        format!("Invalid request: {error}")
    } else {
        error.to_string()
    }
}

/// Client builder wired to a [`ReqwestTransport`]
pub fn client_builder(credentials: Credentials, options: &ClientOptions) -> Result<ClusterClientBuilder> {
    let transport = ReqwestTransport::new(options)?;
    Ok(ClusterClient::builder(credentials, transport))
}

/// Ready-to-use client with the default retry policy
pub fn connect(
    credentials: Credentials,
    options: &ClientOptions,
    token_store: Arc<dyn TokenStore>,
) -> Result<ClusterClient> {
    Ok(client_builder(credentials, options)?
        .token_store(token_store)
        .build())
}
