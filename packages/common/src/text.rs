//! Plain-text analysis for uploaded lesson files.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("file is not valid UTF-8 text: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Decode uploaded bytes as UTF-8 text.
pub fn decode(bytes: &[u8]) -> Result<&str, TextError> {
    Ok(std::str::from_utf8(bytes)?)
}

/// Count maximal runs of non-whitespace characters.
pub fn count_words(bytes: &[u8]) -> Result<u64, TextError> {
    Ok(decode(bytes)?.split_whitespace().count() as u64)
}
