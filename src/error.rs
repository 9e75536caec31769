use std::{io, time::Duration};

use thiserror::Error;

/// Main error type for notesync.
///
/// Only [`Error::NotConfigured`] is ever returned out of a sync pass. Every
/// other variant is raised while processing a single note and ends up as a
/// [`crate::types::SyncFailure`] in the pass result.
#[derive(Debug, Error)]
pub enum Error {
   /// I/O error occurred while touching the vault or the sync-state directory.
   #[error("io error: {0}")]
   Io(#[from] io::Error),

   /// JSON serialization or deserialization error occurred.
   #[error("json error: {0}")]
   Json(#[from] serde_json::Error),

   /// Configuration-related error occurred.
   #[error("config error: {0}")]
   Config(#[from] ConfigError),

   /// HTTP request or response error occurred.
   #[error("http error: {0}")]
   Http(#[from] HttpError),

   /// The remote embedding service has no endpoint or credentials.
   #[error("assistant service not initialized: {0}")]
   NotConfigured(&'static str),

   /// The remote service rejected a request.
   #[error("failed to {op}: {reason}")]
   Remote { op: &'static str, status: u16, reason: String },

   /// A remote call did not settle within the configured per-call timeout.
   #[error("{op} timed out after {}ms", .after.as_millis())]
   Timeout { op: &'static str, after: Duration },

   /// A state-store key resolved outside of the sync-state directory.
   #[error("invalid sync state path: {0}")]
   InvalidStatePath(String),

   /// A per-file task panicked instead of returning.
   #[error("task panicked: {0}")]
   Panicked(String),
}

impl Error {
   pub fn exit_code(&self) -> i32 {
      match self {
         Self::NotConfigured(_) | Self::Config(_) => 2,
         Self::Timeout { .. } => 11,
         _ => 1,
      }
   }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
   /// Failed to retrieve user directories (e.g., home directory).
   #[error("failed to get user directories")]
   GetUserDirectories,

   /// The layered configuration could not be extracted.
   #[error("failed to parse config: {0}")]
   Parse(#[from] Box<figment::Error>),

   /// A value is outside the range the engine accepts.
   #[error("invalid config: {0}")]
   Invalid(String),
}

/// Errors that can occur during HTTP operations.
#[derive(Debug, Error)]
pub enum HttpError {
   /// HTTP request failed (network error, timeout, etc.).
   #[error("request failed: {0}")]
   Request(#[from] reqwest::Error),

   /// Failed to read or decode the HTTP response body.
   #[error("failed to read response: {0}")]
   ReadResponse(#[source] reqwest::Error),
}

impl From<reqwest::Error> for Error {
   fn from(e: reqwest::Error) -> Self {
      Self::Http(HttpError::Request(e))
   }
}

/// Standard result type using [`enum@Error`] as the default error type
pub type Result<T, E = Error> = std::result::Result<T, E>;
