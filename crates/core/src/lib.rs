//! osc-core: Core library for the osc object storage client
//!
//! This crate provides the client side of a Swift-style object storage cluster:
//! - Authentication with token caching (in-memory or file backed)
//! - Path resolution into containers and objects
//! - Entity verbs (get, HEAD, create, update, delete) with reauthenticate-and-retry
//! - CDN, search and account administration
//! - Configuration and cluster profile management
//!
//! The HTTP exchange itself sits behind the [`Transport`] trait so the crate stays
//! independent of any HTTP library.

pub mod admin;
pub mod auth;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod message;
pub mod mime;
pub mod path;
pub mod retry;
pub mod token_store;
pub mod transport;

pub use admin::{AccountInfo, AccountUser, UserRole};
pub use auth::{AuthData, Credentials};
pub use client::{ClientOptions, ClusterClient, ClusterClientBuilder};
pub use config::{ClusterManager, ClusterProfile, Config, ConfigManager};
pub use entity::{Container, Context, Entity, EntityState, ListingFormat, Object, StorageEntity};
pub use error::{Error, HttpError, HttpErrorKind, Result};
pub use message::{Headers, Request, Response};
pub use path::{EntityKind, ResolvedPath, resolve};
pub use retry::{RetryBuilder, RetryPolicy, RetryScope, is_retryable_error, retry_after_reauth};
pub use token_store::{
    FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreConfig, TokenStoreKind,
};
pub use transport::{HttpRequest, Method, Payload, Transport};
