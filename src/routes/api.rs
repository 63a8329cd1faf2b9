use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{prepare_job, run_job};
use crate::batch::BatchOutcome;
use crate::state::AppState;
use crate::storage::{is_safe_component, zip_directory};

pub async fn api_generate(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let job = match prepare_job(&state, &mut multipart).await {
        Ok(job) => job,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response()
        }
    };

    let outcome = run_job(&state, &job).await;
    let status = match outcome {
        BatchOutcome::Failed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        BatchOutcome::Completed { .. } => StatusCode::OK,
    };

    let mut body = serde_json::to_value(&outcome).unwrap_or_else(|_| serde_json::json!({}));
    if let Some(map) = body.as_object_mut() {
        map.insert("job_id".to_string(), serde_json::Value::String(job.job_id));
    }
    (status, Json(body)).into_response()
}

pub async fn download_all(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    if !is_safe_component(&job_id) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let job_dir = state.config.results_folder.join(&job_id);
    if !job_dir.is_dir() {
        return StatusCode::NOT_FOUND.into_response();
    }

    match zip_directory(&job_dir) {
        Ok(zip_data) => (
            [
                (header::CONTENT_TYPE, "application/zip".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"certificates_{}.zip\"", job_id),
                ),
            ],
            zip_data,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to archive {}: {}", job_id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path((job_id, filename)): Path<(String, String)>,
) -> impl IntoResponse {
    if !is_safe_component(&job_id) || !is_safe_component(&filename) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = state.config.results_folder.join(&job_id).join(&filename);
    match tokio::fs::read(&path).await {
        Ok(content) => {
            let mime = mime_guess::from_path(&filename)
                .first_raw()
                .unwrap_or("application/octet-stream");
            (
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                content,
            )
                .into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
