use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use bytes::Bytes;

use crate::AppState;
use crate::transform::{CompressOutput, transform};
use compress_core::{MediaError, TransformError, derive_output_filename, parse_params};

const CACHE_CONTROL_NO_STORE: &str = "no-store";
const INDEX_HTML: &str = include_str!("../assets/index.html");

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// multipart で受け取ったフォームの生の値
#[derive(Debug, Default)]
struct CompressForm {
    file_name: Option<String>,
    file: Option<Bytes>,
    format: Option<String>,
    quality: Option<String>,
    width: Option<String>,
}

impl CompressForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    form.file_name = field.file_name().map(str::to_string);
                    form.file = Some(field.bytes().await?);
                }
                "type" => form.format = Some(field.text().await?),
                "quality" => form.quality = Some(field.text().await?),
                "width" => form.width = Some(field.text().await?),
                other => tracing::debug!(field = %other, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

pub async fn compress(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let form = CompressForm::read(&mut multipart).await?;

    let input = form
        .file
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest("file is required".to_string()))?;
    let format = form
        .format
        .ok_or_else(|| AppError::BadRequest("type is required".to_string()))?;
    let quality = form
        .quality
        .ok_or_else(|| AppError::BadRequest("quality is required".to_string()))?;
    let params = parse_params(&format, &quality, form.width.as_deref())?;

    let file_name = form.file_name.unwrap_or_default();
    tracing::info!(
        file = %file_name,
        size = input.len(),
        f = %params.format,
        q = params.quality,
        w = ?params.width,
        "compressing image"
    );

    let permit = state
        .encode_slots
        .clone()
        .acquire_owned()
        .await
        .map_err(|_| AppError::Unavailable)?;
    let max_dimension = state.config.max_dimension;
    let output = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        transform(&input, &params, max_dimension)
    })
    .await
    .map_err(|e| AppError::Internal(format!("encode task failed: {e}")))??;

    tracing::info!(
        file = %file_name,
        size = output.bytes.len(),
        width = output.width,
        height = output.height,
        "image compressed"
    );

    Ok(compressed_response(&file_name, output))
}

fn compressed_response(file_name: &str, output: CompressOutput) -> Response {
    let download_name = derive_output_filename(file_name, output.format);
    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(&download_name)
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, output.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, CACHE_CONTROL_NO_STORE.to_string()),
            (
                HeaderName::from_static("x-image-width"),
                output.width.to_string(),
            ),
            (
                HeaderName::from_static("x-image-height"),
                output.height.to_string(),
            ),
        ],
        output.bytes,
    )
        .into_response()
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    PayloadTooLarge,
    TransformFailed(String),
    Unavailable,
    Internal(String),
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Validation(msg) => {
                tracing::warn!(error = %msg, "validation error");
                AppError::BadRequest(msg)
            }
            MediaError::Transform(transform_err) => transform_err.into(),
        }
    }
}

impl From<TransformError> for AppError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::InvalidParams(msg) => {
                tracing::warn!(error = %msg, "invalid transform parameters");
                AppError::BadRequest(msg)
            }
            TransformError::ResolutionTooLarge { width, height } => {
                tracing::warn!(width = %width, height = %height, "image resolution too large");
                AppError::BadRequest(format!("image resolution {width}x{height} is too large"))
            }
            TransformError::DecodeFailed(msg) => {
                tracing::warn!(error = %msg, "image could not be decoded");
                AppError::TransformFailed(format!("image could not be decoded: {msg}"))
            }
            TransformError::ProcessingFailed(msg) => {
                tracing::error!(error = %msg, "image processing failed");
                AppError::TransformFailed(msg)
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            tracing::warn!("upload exceeds body limit");
            return AppError::PayloadTooLarge;
        }
        tracing::warn!(error = %err.body_text(), "malformed multipart body");
        AppError::BadRequest(err.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "upload is too large".to_string(),
            ),
            AppError::TransformFailed(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "encoder unavailable".to_string(),
            ),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
