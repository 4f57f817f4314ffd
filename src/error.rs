//! Error types for the openHAB MCP server
//!
//! Every failure path surfaces a structured error to the caller; nothing is
//! logged and swallowed. Bulk link operations report per-target outcomes
//! through [`BulkLinkReport`] instead of aborting on the first failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for openHAB operations
pub type Result<T> = std::result::Result<T, OpenHabError>;

/// Error types for openHAB MCP operations
#[derive(Error, Debug)]
pub enum OpenHabError {
    /// Connection errors reaching the openHAB REST API
    #[error("Connection error: {0}")]
    Connection(String),

    /// Authentication errors (rejected token or basic credentials)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entity identifier does not resolve
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed filter, unknown field or failed referential check
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Duplicate unique identifier or conflicting remote state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bulk operation completed with some targets failing
    #[error("Partial failure: {} succeeded, {} failed", .0.removed.len(), .0.failed.len())]
    PartialFailure(BulkLinkReport),
}

/// Identifier of a single Link, used in bulk operation reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkId {
    pub item_name: String,
    pub channel_uid: String,
}

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.item_name, self.channel_uid)
    }
}

/// Per-target outcome of a bulk link operation (purge, delete-all)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkLinkReport {
    /// Links that were successfully removed
    pub removed: Vec<LinkId>,
    /// Links whose removal failed, with the failure message
    pub failed: Vec<(LinkId, String)>,
}

impl BulkLinkReport {
    /// Turn the report into a result: `Ok` when every target succeeded,
    /// `PartialFailure` carrying the full report otherwise.
    pub fn into_result(self) -> Result<BulkLinkReport> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            Err(OpenHabError::PartialFailure(self))
        }
    }
}

impl OpenHabError {
    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection(msg.into())
    }

    /// Create an authentication error
    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }

    /// Check if error is retryable. Only transport-level failures are safe
    /// to retry; every other kind is terminal for the invocation.
    pub fn is_retryable(&self) -> bool {
        match self {
            OpenHabError::Connection(_) | OpenHabError::Timeout(_) => true,
            OpenHabError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Check if error indicates a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(self, OpenHabError::NotFound(_))
    }

    /// Check if error is authentication related
    pub fn is_auth_error(&self) -> bool {
        matches!(self, OpenHabError::Authentication(_))
    }

    /// Stable kind label used in structured tool error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            OpenHabError::Connection(_) | OpenHabError::Timeout(_) | OpenHabError::Http(_) => {
                "remote_unavailable"
            }
            OpenHabError::Authentication(_) => "authentication",
            OpenHabError::Json(_) => "invalid_argument",
            OpenHabError::Config(_) => "config",
            OpenHabError::NotFound(_) => "not_found",
            OpenHabError::InvalidInput(_) => "invalid_argument",
            OpenHabError::Conflict(_) => "conflict",
            OpenHabError::PartialFailure(_) => "partial_failure",
        }
    }
}
