//! Upload Service
//!
//! HTTP front end for single-image extraction. Each request runs the
//! pipeline on a blocking thread with its own state; entries are persisted
//! for the given vendor and returned whether or not persistence succeeded.

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::analysis::MenuEntry;
use crate::app::MenuExtractor;
use crate::storage::Database;
use crate::vision::OcrError;

/// Shared, read-only request context
pub struct ServerState {
    pub extractor: MenuExtractor,
    pub database_path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Whether the entries were stored
    pub success: bool,
    pub items: Vec<MenuEntry>,
}

/// Build the service routes
pub fn router(state: Arc<ServerState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/upload", post(handle_upload))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Listen on `bind_address` until Ctrl-C
pub async fn serve(state: Arc<ServerState>, bind_address: &str, max_upload_bytes: usize) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!(addr = %bind_address, "Upload service listening");

    axum::serve(listener, router(state, max_upload_bytes))
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await?;
    Ok(())
}

/// Resolve once `signal` fires. A signal listener that cannot be installed
/// is logged and shuts the service down.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Upload service shutting down"),
        Err(e) => error!("Failed to listen for shutdown signal, shutting down: {e}"),
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Malformed or oversized multipart bodies keep the status axum assigns
fn multipart_error(e: MultipartError) -> Response {
    warn!(status = %e.status(), "Rejected upload: {}", e.body_text());
    error_response(e.status(), e.body_text())
}

async fn handle_upload(State(state): State<Arc<ServerState>>, mut multipart: Multipart) -> Response {
    let mut image: Option<(String, Bytes)> = None;
    let mut vendor_id: Option<i64> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_error(e),
        };

        match field.name().unwrap_or("") {
            "image" => {
                let filename = field.file_name().unwrap_or("upload.png").to_string();
                match field.bytes().await {
                    Ok(bytes) if !bytes.is_empty() => image = Some((filename, bytes)),
                    Ok(_) => {}
                    Err(e) => return multipart_error(e),
                }
            }
            "vendor_id" => match field.text().await {
                Ok(text) => vendor_id = text.trim().parse().ok(),
                Err(e) => return multipart_error(e),
            },
            _ => {}
        }
    }

    let (Some((filename, bytes)), Some(vendor_id)) = (image, vendor_id) else {
        return error_response(StatusCode::BAD_REQUEST, "Image file and vendor_id required");
    };

    let outcome = tokio::task::spawn_blocking(move || extract_and_store(&state, &filename, &bytes, vendor_id)).await;

    match outcome {
        Ok(Ok(None)) => StatusCode::NO_CONTENT.into_response(),
        Ok(Ok(Some(response))) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Err(e)) => {
            warn!(vendor_id, "Extraction failed: {e}");
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        Err(e) => {
            error!("Extraction task failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Extraction failed")
        }
    }
}

/// Run the pipeline on uploaded bytes; `None` means no entries were found
fn extract_and_store(
    state: &ServerState,
    filename: &str,
    bytes: &[u8],
    vendor_id: i64,
) -> Result<Option<UploadResponse>, OcrError> {
    let suffix = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| ".png".to_string());
    let temp = tempfile::Builder::new()
        .prefix("menu-upload-")
        .suffix(&suffix)
        .tempfile()?;
    std::fs::write(temp.path(), bytes)?;

    let items = state.extractor.process_image(temp.path(), filename)?;
    if items.is_empty() {
        info!(vendor_id, image = filename, "No menu items found");
        return Ok(None);
    }

    let success = match Database::open(&state.database_path)
        .and_then(|mut db| db.insert_entries(&items, vendor_id))
    {
        Ok(count) => {
            info!(vendor_id, image = filename, entries = count, "Stored menu entries");
            true
        }
        Err(e) => {
            error!(vendor_id, image = filename, "Failed to store menu entries: {e}");
            false
        }
    };

    Ok(Some(UploadResponse { success, items }))
}
