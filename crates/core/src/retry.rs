//! Reauthenticate-and-retry policy
//!
//! A failed verb may be retried exactly once, after forcing a fresh authentication.
//! Which failures qualify is decided by [`RetryScope`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transport::Method;

/// Which failures trigger reauthentication and a second attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryScope {
    /// Never retry
    Never,
    /// Only 401/403 responses, the shape of an expired token
    AuthFailures,
    /// Auth failures for any verb; any retryable failure for GET, HEAD and DELETE
    #[default]
    IdempotentOrAuth,
    /// Any retryable failure for any verb, including PUT and POST
    Always,
}

/// Retry policy applied to every entity verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default)]
    pub scope: RetryScope,
}

impl RetryPolicy {
    /// Retry every transport or HTTP failure once, whatever the verb
    ///
    /// May resend a PUT or POST whose first attempt reached the server.
    pub fn legacy() -> Self {
        Self {
            scope: RetryScope::Always,
        }
    }

    pub fn never() -> Self {
        Self {
            scope: RetryScope::Never,
        }
    }

    /// Whether `error` from a `method` request earns a second attempt
    pub fn should_retry(&self, method: Method, error: &Error) -> bool {
        if !is_retryable_error(error) {
            return false;
        }

        match self.scope {
            RetryScope::Never => false,
            RetryScope::AuthFailures => error.is_auth_failure(),
            RetryScope::IdempotentOrAuth => error.is_auth_failure() || method.is_idempotent(),
            RetryScope::Always => true,
        }
    }
}

/// Check if an error could be resolved by trying again
pub fn is_retryable_error(error: &Error) -> bool {
    error.is_retryable()
}

/// Run `operation`; on a qualifying failure run `reauthenticate` once and retry once
///
/// The second failure is returned unmodified. A failing `reauthenticate` aborts
/// with its own error.
pub fn retry_after_reauth<T, F, R>(
    policy: &RetryPolicy,
    method: Method,
    mut operation: F,
    reauthenticate: R,
) -> Result<T>
where
    F: FnMut() -> Result<T>,
    R: FnOnce() -> Result<()>,
{
    match operation() {
        Ok(result) => Ok(result),
        Err(e) => {
            if !policy.should_retry(method, &e) {
                return Err(e);
            }

            tracing::warn!(
                method = %method,
                error = %e,
                "Request failed, reauthenticating and retrying once"
            );

            reauthenticate()?;
            operation()
        }
    }
}

/// Retry policy builder for easy customization
#[derive(Debug, Clone)]
pub struct RetryBuilder {
    scope: RetryScope,
}

impl RetryBuilder {
    pub fn new() -> Self {
        Self {
            scope: RetryScope::default(),
        }
    }

    pub fn scope(mut self, scope: RetryScope) -> Self {
        self.scope = scope;
        self
    }

    /// Allow retrying non-idempotent verbs after any failure
    pub fn retry_non_idempotent(mut self, enabled: bool) -> Self {
        self.scope = match (enabled, self.scope) {
            (true, RetryScope::IdempotentOrAuth) => RetryScope::Always,
            (false, RetryScope::Always) => RetryScope::IdempotentOrAuth,
            (_, scope) => scope,
        };
        self
    }

    pub fn build(self) -> RetryPolicy {
        RetryPolicy { scope: self.scope }
    }
}

impl Default for RetryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
