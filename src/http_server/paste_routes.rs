//! Paste HTTP Routes
//!
//! Endpoints for paste creation, lookup, and raw blob download.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::index::PasteRecord;
use crate::observability::{Logger, Severity};
use crate::store::{PasteStore, StoreError, Upload};

// ==================
// Shared State
// ==================

/// State shared across handlers
pub struct AppState {
    pub store: PasteStore,
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub url: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Serialize)]
pub struct PasteResponse {
    pub id: String,
    pub text: Option<String>,
    pub file: Option<FileResponse>,
    pub created_at: String,
}

impl PasteResponse {
    fn from_record(record: &PasteRecord) -> Self {
        Self {
            id: record.id.clone(),
            text: record.text.clone(),
            file: record.blob.as_ref().map(|blob| FileResponse {
                url: format!("/uploads/{}", blob.storage_key),
                original_name: blob.original_name.clone(),
                mime_type: blob.mime_type.clone(),
                size: blob.size_bytes,
            }),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

// ==================
// Routes
// ==================

/// Create paste routes (nested under /api)
pub fn paste_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/paste", post(create_paste_handler))
        .route("/paste/{id}", get(get_paste_handler))
        .with_state(state)
}

/// Create raw blob download routes (mounted at the root)
pub fn upload_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/uploads/{key}", get(download_blob_handler))
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

fn store_error(e: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    let code = e.status_code();
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ErrorResponse {
            error: e.to_string(),
            code,
        }),
    )
}

fn bad_request(e: impl ToString) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: e.to_string(),
            code: 400,
        }),
    )
}

// ==================
// Handlers
// ==================

async fn create_paste_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreateResponse>), (StatusCode, Json<ErrorResponse>)> {
    let mut text: Option<String> = None;
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().map(|s| s.to_string());

        match name.as_deref() {
            Some("text") => {
                text = Some(field.text().await.map_err(bad_request)?);
            }
            Some("file") => {
                if upload.is_some() {
                    return Err(bad_request("At most one attachment is allowed"));
                }

                let original_name = field.file_name().unwrap_or("unnamed").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(bad_request)?;

                upload = Some(Upload {
                    data: data.to_vec(),
                    original_name,
                    mime_type,
                });
            }
            _ => {}
        }
    }

    let id = state.store.create(text, upload).map_err(store_error)?;

    Logger::log(Severity::Info, "paste_created", &[("id", &id)]);

    let url = format!("/api/paste/{}", id);
    Ok((StatusCode::CREATED, Json(CreateResponse { id, url })))
}

async fn get_paste_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PasteResponse>, (StatusCode, Json<ErrorResponse>)> {
    let record = state.store.get(&id).map_err(store_error)?;
    Ok(Json(PasteResponse::from_record(&record)))
}

async fn download_blob_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<(HeaderMap, Bytes), (StatusCode, Json<ErrorResponse>)> {
    let data = state.store.read_blob(&key).map_err(store_error)?;

    // Content type lives on the record; the key's preserved extension lets
    // clients infer one from the URL
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from(data.len() as u64),
    );

    Ok((headers, Bytes::from(data)))
}
