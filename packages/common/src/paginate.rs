//! Word-boundary aware pagination over stored lesson text.
//!
//! Page boundaries are computed on character indices. A nominal boundary at
//! `k * page_size` is pushed forward to the next whitespace character when
//! one occurs within [`WORD_BOUNDARY_LOOKAHEAD`] characters, so a chunk only
//! splits a token when that token is longer than the window. Every page
//! starts where the previous one ended, so consecutive pages never overlap.

use serde::Serialize;
use thiserror::Error;

/// How far past a nominal boundary to search for whitespace.
pub const WORD_BOUNDARY_LOOKAHEAD: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginateError {
    #[error("page size must be positive, got {0}")]
    InvalidPageSize(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextPage {
    pub chunk: String,
    pub page_no: usize,
    pub page_size: usize,
    pub total_length: usize,
    pub total_pages: usize,
    pub is_last: bool,
}

/// Return page `page_no` (zero-based) of `text`.
pub fn paginate(text: &str, page_no: usize, page_size: usize) -> Result<TextPage, PaginateError> {
    if page_size == 0 {
        return Err(PaginateError::InvalidPageSize(page_size));
    }

    let chars: Vec<char> = text.chars().collect();
    let total_length = chars.len();
    let total_pages = total_length.div_ceil(page_size);

    let start = boundary(&chars, page_no, page_size);
    let end = boundary(&chars, page_no.saturating_add(1), page_size).max(start);

    let chunk: String = chars[start..end].iter().collect();

    Ok(TextPage {
        chunk: chunk.trim().to_string(),
        page_no,
        page_size,
        total_length,
        total_pages,
        is_last: end >= total_length,
    })
}

fn boundary(chars: &[char], page_no: usize, page_size: usize) -> usize {
    let total = chars.len();
    let nominal = page_no.saturating_mul(page_size).min(total);
    if nominal == 0 || nominal == total {
        return nominal;
    }

    let window_end = nominal.saturating_add(WORD_BOUNDARY_LOOKAHEAD).min(total);
    chars[nominal..window_end]
        .iter()
        .position(|c| c.is_whitespace())
        .map_or(nominal, |offset| nominal + offset)
}
