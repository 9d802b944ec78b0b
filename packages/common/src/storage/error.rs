use std::fmt;

use super::key::KeyError;

/// Errors that can occur while talking to the blob store.
///
/// Every variant means the store could not be used for the request; callers
/// surface them as a single "storage unavailable" condition.
#[derive(Debug)]
pub enum StorageError {
    /// The requested blob was not found.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// A storage key was rejected.
    InvalidKey(KeyError),
    /// The blob exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The request never produced a response (connect failure, timeout, ...).
    Transport(String),
    /// The remote store answered with a non-success status.
    Status { status: u16, operation: &'static str },
    /// The remote store answered, but the response was unusable.
    InvalidResponse(String),
    /// The store could not be constructed from its configuration.
    Config(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "blob not found: {key}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidKey(err) => write!(f, "invalid storage key: {err}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "blob exceeds size limit ({actual} > {limit} bytes)")
            }
            Self::Transport(msg) => write!(f, "storage transport error: {msg}"),
            Self::Status { status, operation } => {
                write!(f, "storage {operation} failed with status {status}")
            }
            Self::InvalidResponse(msg) => write!(f, "invalid response from storage: {msg}"),
            Self::Config(msg) => write!(f, "storage configuration error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidKey(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<KeyError> for StorageError {
    fn from(err: KeyError) -> Self {
        Self::InvalidKey(err)
    }
}
