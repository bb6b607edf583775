//! Route handlers
//!
//! One handler per file manager operation. Inputs arrive as query, form or
//! multipart fields; filesystem work runs on the blocking thread pool.

use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Form, Multipart, Path, Query, State};
use axum::http::header;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::json;
use std::io;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::auth::CredentialStore;
use crate::error::{FileManagerError, StorageError};
use crate::middleware::logging::log_request;
use crate::server::extract::RequestCaller;
use crate::server::responses::{ApiError, content_disposition, success};
use crate::service::FileManager;
use crate::storage::metadata::content_type;
use crate::storage::{DirectoryEntry, FileProperties, RetrieveResult, UploadFile};

/// Multipart field carrying the target directory of an upload
const UPLOAD_DIR_FIELD: &str = "dir";
/// Multipart field name(s) carrying uploaded files
const UPLOAD_FILE_FIELDS: &[&str] = &["files[]", "files"];

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub manager: FileManager,
    pub credentials: Arc<CredentialStore>,
}

impl AppState {
    pub fn new(manager: FileManager, credentials: CredentialStore) -> Self {
        Self {
            manager,
            credentials: Arc::new(credentials),
        }
    }
}

/// Builds the router, mounted under the manager's URL base.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let url_base = state.manager.url_base().to_string();

    let api = Router::new()
        .route("/health", get(health))
        .route("/list", get(list_files))
        .route("/upload", post(upload))
        .route("/download", get(download))
        .route("/rename", post(rename))
        .route("/delete", post(delete))
        .route("/move", post(move_entry))
        .route("/mkdir", post(mkdir))
        .route("/properties", post(properties))
        .route("/files/*filename", get(serve_file))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn(log_request))
        .with_state(state);

    if url_base.is_empty() {
        api
    } else {
        Router::new().nest(&url_base, api)
    }
}

/// Runs blocking filesystem work off the async executor.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, FileManagerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError(FileManagerError::IoError(io::Error::other(e))))?
        .map_err(ApiError)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": "RAX File Manager is alive" }))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    dir: String,
}

async fn list_files(
    State(state): State<AppState>,
    RequestCaller(caller): RequestCaller,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DirectoryEntry>>, ApiError> {
    let manager = state.manager.clone();
    let entries = run_blocking(move || manager.list(&caller, &query.dir)).await?;
    Ok(Json(entries))
}

async fn upload(
    State(state): State<AppState>,
    RequestCaller(caller): RequestCaller,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut dir = String::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == UPLOAD_DIR_FIELD {
            dir = field.text().await.map_err(multipart_error)?;
        } else if UPLOAD_FILE_FIELDS.contains(&name.as_str()) {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            files.push(UploadFile {
                filename,
                data: Vec::from(data),
            });
        }
    }

    let manager = state.manager.clone();
    let report = run_blocking(move || manager.upload(&caller, &dir, files)).await?;

    Ok(Json(json!({
        "success": report.is_complete(),
        "saved": report.saved,
        "failed": report.failed,
    })))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    StorageError::InvalidInput(format!("Malformed upload: {}", e.body_text())).into()
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    #[serde(default)]
    file: String,
}

async fn download(
    State(state): State<AppState>,
    RequestCaller(caller): RequestCaller,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let manager = state.manager.clone();
    let located = run_blocking(move || manager.download(&caller, &query.file)).await?;
    stream_file(located, "attachment").await
}

async fn serve_file(
    State(state): State<AppState>,
    RequestCaller(caller): RequestCaller,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let manager = state.manager.clone();
    let located = run_blocking(move || manager.serve_file(&caller, &filename)).await?;
    stream_file(located, "inline").await
}

async fn stream_file(located: RetrieveResult, disposition: &str) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(&located.file_path)
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(located.file_name.clone()),
            _ => StorageError::IoError(e),
        })?;

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        [
            (header::CONTENT_TYPE, content_type(&located.file_path)),
            (header::CONTENT_LENGTH, located.size.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(disposition, &located.file_name),
            ),
        ],
        body,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
struct RenameForm {
    #[serde(default)]
    old_path: String,
    #[serde(default)]
    new_name: String,
}

async fn rename(
    State(state): State<AppState>,
    RequestCaller(caller): RequestCaller,
    Form(form): Form<RenameForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let manager = state.manager.clone();
    run_blocking(move || manager.rename(&caller, &form.old_path, &form.new_name)).await?;
    Ok(success())
}

#[derive(Debug, Deserialize)]
struct PathForm {
    #[serde(default)]
    path: String,
}

async fn delete(
    State(state): State<AppState>,
    RequestCaller(caller): RequestCaller,
    Form(form): Form<PathForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let manager = state.manager.clone();
    run_blocking(move || manager.delete(&caller, &form.path)).await?;
    Ok(success())
}

#[derive(Debug, Deserialize)]
struct MoveForm {
    #[serde(default)]
    src_path: String,
    #[serde(default)]
    dest_dir: String,
}

async fn move_entry(
    State(state): State<AppState>,
    RequestCaller(caller): RequestCaller,
    Form(form): Form<MoveForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let manager = state.manager.clone();
    run_blocking(move || manager.move_entry(&caller, &form.src_path, &form.dest_dir)).await?;
    Ok(success())
}

#[derive(Debug, Deserialize)]
struct MkdirForm {
    #[serde(default)]
    dir_path: String,
    #[serde(default)]
    dir_name: String,
}

async fn mkdir(
    State(state): State<AppState>,
    RequestCaller(caller): RequestCaller,
    Form(form): Form<MkdirForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let manager = state.manager.clone();
    run_blocking(move || manager.mkdir(&caller, &form.dir_path, &form.dir_name)).await?;
    Ok(success())
}

async fn properties(
    State(state): State<AppState>,
    RequestCaller(caller): RequestCaller,
    Form(form): Form<PathForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let manager = state.manager.clone();
    let props: FileProperties = run_blocking(move || manager.properties(&caller, &form.path)).await?;

    let mut body = serde_json::to_value(&props)
        .map_err(|e| ApiError(FileManagerError::IoError(io::Error::other(e))))?;
    body["success"] = json!(true);
    Ok(Json(body))
}
