use serde::Serialize;

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (0-based).
    #[schema(example = 0)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

/// Resolve a zero-based page number, rejecting negatives.
pub fn page_number(page: Option<i64>) -> Result<u64, AppError> {
    let page = page.unwrap_or(0);
    u64::try_from(page).map_err(|_| AppError::Validation("page must be >= 0".into()))
}

/// Resolve a page size: absent means `default`, otherwise it must be in
/// `1..=max`.
pub fn page_size(per_page: Option<i64>, default: u64, max: u64) -> Result<u64, AppError> {
    let Some(per_page) = per_page else {
        return Ok(default);
    };
    match u64::try_from(per_page) {
        Ok(n) if n >= 1 && n <= max => Ok(n),
        _ => Err(AppError::Validation(format!(
            "per_page must be between 1 and {max}"
        ))),
    }
}
