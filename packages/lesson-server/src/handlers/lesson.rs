use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::query::AppQuery;
use crate::models::lesson::*;
use crate::models::shared::{page_number, page_size};
use crate::state::AppState;
use crate::utils::filename::validate_flat_filename;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[utoipa::path(
    post,
    path = "/",
    tag = "Lessons",
    operation_id = "createLesson",
    summary = "Upload a new lesson",
    description = "Uploads a plain-text file as a new lesson owned by the caller. The `file` multipart field is required; its file name becomes the lesson title. The text is stored in blob storage and its words are counted once at upload.",
    request_body(content = LessonUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Lesson created", body = LessonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 502, description = "Blob storage failed (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(owner_id = %auth_user.user_id))]
pub async fn create_lesson(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let limits = &state.config.lessons;

    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limits.max_upload_size))?
    {
        if field.name() != Some("file") {
            continue; // Ignore unknown fields.
        }

        file_name = field.file_name().map(|s| s.to_string());
        content_type = field.content_type().map(|s| s.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, limits.max_upload_size))?
        {
            if bytes.len() + chunk.len() > limits.max_upload_size {
                return Err(AppError::PayloadTooLarge {
                    limit: limits.max_upload_size,
                });
            }
            bytes.extend_from_slice(&chunk);
        }
        data = Some(bytes);
    }

    let data = data.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    let filename =
        file_name.ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
    let filename = validate_flat_filename(&filename)
        .map_err(|e| AppError::Validation(e.message().into()))?
        .to_string();

    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".into()));
    }
    check_content_type(
        content_type.as_deref(),
        &filename,
        &limits.allowed_content_types,
    )?;

    let lesson = state
        .lessons
        .create_lesson(&filename, &data, &auth_user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(LessonResponse::from(lesson))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Lessons",
    operation_id = "listLessons",
    summary = "List the caller's lessons",
    description = "Returns a zero-based page of lessons owned by the caller, newest first. A page past the end returns an empty `data` array.",
    params(LessonListQuery),
    responses(
        (status = 200, description = "List of lessons", body = LessonListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(owner_id = %auth_user.user_id))]
pub async fn list_lessons(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<LessonListQuery>,
) -> Result<Json<LessonListResponse>, AppError> {
    let limits = &state.config.lessons;
    let page = page_number(query.page)?;
    let per_page = page_size(query.per_page, limits.default_page_size, limits.max_page_size)?;

    let result = state
        .lessons
        .list_lessons(&auth_user.user_id, page, per_page)
        .await?;

    Ok(Json(LessonListResponse {
        data: result.items.into_iter().map(LessonResponse::from).collect(),
        pagination: Pagination {
            page: result.page,
            per_page: result.per_page,
            total: result.total,
            total_pages: result.total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Lessons",
    operation_id = "getLesson",
    summary = "Get a lesson by ID",
    params(("id" = String, Path, description = "Lesson ID (UUID)")),
    responses(
        (status = 200, description = "Lesson details", body = LessonResponse),
        (status = 400, description = "Malformed lesson ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Owned by another user (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = %auth_user.user_id))]
pub async fn get_lesson(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LessonResponse>, AppError> {
    let id = parse_lesson_id(&id)?;
    let lesson = state.lessons.get_lesson(id, &auth_user.user_id).await?;
    Ok(Json(lesson.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Lessons",
    operation_id = "deleteLesson",
    summary = "Delete a lesson",
    description = "Deletes the lesson's metadata immediately. The stored file is removed afterwards in the background; failures there do not affect the response.",
    params(("id" = String, Path, description = "Lesson ID (UUID)")),
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 400, description = "Malformed lesson ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Owned by another user (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = %auth_user.user_id))]
pub async fn delete_lesson(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_lesson_id(&id)?;
    state.lessons.delete_lesson(id, &auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/content",
    tag = "Lessons",
    operation_id = "getLessonContent",
    summary = "Read a page of lesson text",
    description = "Returns one zero-based page of the lesson's text. Page boundaries move forward to the next whitespace (up to 20 characters) so words are not split. `per_page` counts characters.",
    params(
        ("id" = String, Path, description = "Lesson ID (UUID)"),
        LessonContentQuery,
    ),
    responses(
        (status = 200, description = "Content page", body = LessonContentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Owned by another user (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson or its content not found (NOT_FOUND, CONTENT_MISSING)", body = ErrorBody),
        (status = 502, description = "Blob storage failed (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(owner_id = %auth_user.user_id))]
pub async fn get_lesson_content(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppQuery(query): AppQuery<LessonContentQuery>,
) -> Result<Json<LessonContentResponse>, AppError> {
    let id = parse_lesson_id(&id)?;
    let limits = &state.config.lessons;
    let page = page_number(query.page)?;
    let per_page = page_size(
        query.per_page,
        limits.content_page_size,
        limits.max_upload_size as u64,
    )?;

    let content = state
        .lessons
        .get_lesson_content(
            id,
            &auth_user.user_id,
            usize::try_from(page).unwrap_or(usize::MAX),
            usize::try_from(per_page).unwrap_or(usize::MAX),
        )
        .await?;

    Ok(Json(content.into()))
}

/// Body limit layer for the upload route.
pub fn upload_body_limit(max_upload_size: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_upload_size.saturating_add(MULTIPART_OVERHEAD))
}

fn parse_lesson_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid lesson ID".into()))
}

fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::Validation(format!("Multipart error: {err}"))
    }
}

/// Check the declared (or guessed) MIME type against the allow-list.
/// Parameters such as `charset` are ignored.
fn check_content_type(
    declared: Option<&str>,
    filename: &str,
    allowed: &[String],
) -> Result<(), AppError> {
    let essence = declared
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
        .unwrap_or_else(|| {
            mime_guess::from_path(filename)
                .first_or_octet_stream()
                .essence_str()
                .to_owned()
        });

    if allowed.iter().any(|a| a.eq_ignore_ascii_case(&essence)) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Unsupported content type '{essence}'; allowed: {}",
            allowed.join(", ")
        )))
    }
}
