//! Error handling.
//!
//! [`FetchError`] is the closed set of failures the core operations report.
//! [`TgErrorContext`] attaches readable context to process-level failures
//! (session, authorization, local files) that end up in `anyhow`.

use crate::platform::PlatformError;
use anyhow::{Context, Result};

/// How a caller should react to a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The request itself was wrong; don't repeat it unchanged.
    Caller,
    /// Ask again differently (other chat, other message).
    NotFound,
    /// Platform trouble; the same request may succeed later.
    RetryLater,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no chat reference supplied")]
    MissingTarget,

    #[error("limit {limit} out of range ({min}..={max})")]
    InvalidLimit { limit: i64, min: usize, max: usize },

    #[error("chat {reference} not found: {detail}")]
    NotFound { reference: String, detail: String },

    #[error("message {message_id} not found in chat {chat_id}")]
    MessageNotFound { chat_id: i64, message_id: i64 },

    #[error("message {message_id} in chat {chat_id} has no media")]
    NoMedia { chat_id: i64, message_id: i64 },

    #[error("media transfer for message {message_id} failed: {reason}")]
    TransferFailed { message_id: i64, reason: String },

    #[error("platform error while {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },
}

impl FetchError {
    /// Stable tag for logs and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::MissingTarget => "missing_target",
            FetchError::InvalidLimit { .. } => "invalid_limit",
            FetchError::NotFound { .. } => "not_found",
            FetchError::MessageNotFound { .. } => "message_not_found",
            FetchError::NoMedia { .. } => "no_media",
            FetchError::TransferFailed { .. } => "transfer_failed",
            FetchError::Transport { .. } => "transport",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            FetchError::MissingTarget | FetchError::InvalidLimit { .. } => ErrorClass::Caller,
            FetchError::NotFound { .. }
            | FetchError::MessageNotFound { .. }
            | FetchError::NoMedia { .. } => ErrorClass::NotFound,
            FetchError::TransferFailed { .. } | FetchError::Transport { .. } => {
                ErrorClass::RetryLater
            }
        }
    }

    /// Any platform failure outside of resolution, tagged with what we were doing.
    pub fn transport(operation: &'static str, err: PlatformError) -> Self {
        let message = match err {
            PlatformError::NotFound(m) | PlatformError::Transport(m) => m,
        };
        FetchError::Transport { operation, message }
    }
}

/// Extension trait to add tgfetch-specific context to errors.
pub trait TgErrorContext<T> {
    /// Add context for opening the session file.
    fn context_session(self, path: &str) -> Result<T>;

    /// Add context for authorization check.
    fn context_auth_check(self) -> Result<T>;

    /// Add context for binding the HTTP listener.
    fn context_bind(self, addr: &str) -> Result<T>;

    /// Add context for writing a downloaded file.
    fn context_write(self, path: &str) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> TgErrorContext<T>
    for std::result::Result<T, E>
{
    fn context_session(self, path: &str) -> Result<T> {
        self.with_context(|| format!("Failed to open session file {}", path))
    }

    fn context_auth_check(self) -> Result<T> {
        self.context("Failed to check authorization status")
    }

    fn context_bind(self, addr: &str) -> Result<T> {
        self.with_context(|| format!("Failed to bind HTTP listener on {}", addr))
    }

    fn context_write(self, path: &str) -> Result<T> {
        self.with_context(|| format!("Failed to write media to {}", path))
    }
}
