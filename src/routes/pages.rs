use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tera::Context;

use super::{prepare_job, run_job};
use crate::batch::BatchOutcome;
use crate::config::TEMPLATE_FILES;
use crate::state::AppState;
use crate::storage::{write_error_report, zip_directory, ERROR_REPORT};

#[derive(Serialize)]
struct Message {
    kind: &'static str,
    text: String,
}

#[derive(Serialize)]
struct TemplateOption {
    key: &'static str,
    file: &'static str,
}

pub async fn index() -> impl IntoResponse {
    render_index(Vec::new())
}

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let job = match prepare_job(&state, &mut multipart).await {
        Ok(job) => job,
        Err(message) => return form_error(StatusCode::BAD_REQUEST, message),
    };

    let (generated, errors) = match run_job(&state, &job).await {
        BatchOutcome::Failed { error } => {
            return form_error(StatusCode::UNPROCESSABLE_ENTITY, format!("Error: {}", error))
        }
        BatchOutcome::Completed {
            generated, errors, ..
        } => (generated, errors),
    };

    for err in &errors {
        tracing::warn!(job = %job.job_id, "{}", err);
    }
    // The download is the whole response, so problems ride along in the archive.
    if let Err(e) = write_error_report(&job.output_dir, &errors) {
        tracing::error!("Failed to write {} for {}: {}", ERROR_REPORT, job.job_id, e);
    }

    let zip_data = match zip_directory(&job.output_dir) {
        Ok(data) => data,
        Err(e) => {
            tracing::error!("Failed to archive {}: {}", job.job_id, e);
            return form_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not package the certificates.".to_string(),
            );
        }
    };

    tracing::info!(job = %job.job_id, "Generated {} certificates", generated.len());
    let download_name = format!("certificates_{}.zip", generated.len());
    (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_name),
            ),
            (
                header::HeaderName::from_static("x-certificate-warnings"),
                errors.len().to_string(),
            ),
        ],
        zip_data,
    )
        .into_response()
}

fn form_error(status: StatusCode, text: String) -> Response {
    (
        status,
        render_index(vec![Message {
            kind: "error",
            text,
        }]),
    )
        .into_response()
}

fn render_index(messages: Vec<Message>) -> Html<String> {
    let templates: Vec<TemplateOption> = TEMPLATE_FILES
        .iter()
        .map(|&(key, file)| TemplateOption { key, file })
        .collect();

    let mut ctx = Context::new();
    ctx.insert("messages", &messages);
    ctx.insert("templates", &templates);
    render_template("index.html", &ctx)
}

fn render_template(name: &str, ctx: &Context) -> Html<String> {
    let tera = crate::templates::get_tera();
    let rendered = tera.render(name, ctx).unwrap_or_else(|e| {
        tracing::error!("Template error in {}: {}", name, e);
        format!("Template error: {}", name)
    });
    Html(rendered)
}
