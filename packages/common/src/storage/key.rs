use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum length of a storage key in bytes.
pub const MAX_KEY_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("storage key is empty")]
    Empty,
    #[error("storage key exceeds {MAX_KEY_LEN} bytes")]
    TooLong,
    #[error("storage key contains control characters")]
    ControlCharacter,
    #[error("storage key must not start with '/'")]
    Absolute,
    #[error("storage key must not contain '..' segments")]
    Traversal,
}

/// Opaque key identifying one blob in the remote store.
///
/// Keys are issued by the store on upload and handed back verbatim for
/// fetch and delete.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();

        if key.is_empty() {
            return Err(KeyError::Empty);
        }
        if key.len() > MAX_KEY_LEN {
            return Err(KeyError::TooLong);
        }
        if key.chars().any(|c| c.is_control()) {
            return Err(KeyError::ControlCharacter);
        }
        if key.starts_with('/') {
            return Err(KeyError::Absolute);
        }
        if key.split('/').any(|segment| segment == "..") {
            return Err(KeyError::Traversal);
        }

        Ok(Self(key))
    }

    /// A fresh time-ordered key with no further structure.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey({})", self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for StorageKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StorageKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}
