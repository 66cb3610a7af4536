//! Process exit codes
//!
//! Scripts can branch on these without parsing error text.

use osc_core::{Error, HttpErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    /// Bad arguments or configuration
    UsageError = 2,
    /// Connection, TLS or timeout failure
    NetworkError = 3,
    /// Authentication failed or the token was rejected
    AuthError = 4,
    NotFound = 5,
    Conflict = 6,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for a client error
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::Config(_) => ExitCode::UsageError,
            Error::Transport(_) => ExitCode::NetworkError,
            Error::Authentication(_) => ExitCode::AuthError,
            Error::Http(e) => match e.kind {
                HttpErrorKind::Unauthorized | HttpErrorKind::Forbidden => ExitCode::AuthError,
                HttpErrorKind::NotFound => ExitCode::NotFound,
                HttpErrorKind::Conflict => ExitCode::Conflict,
                _ => ExitCode::GeneralError,
            },
            Error::TokenStore(_) | Error::Listing(_) | Error::Io(_) => ExitCode::GeneralError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // all codes fit in a byte
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}
