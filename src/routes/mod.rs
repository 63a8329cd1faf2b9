mod api;
mod pages;

pub use api::{api_generate, download_all, download_file};
pub use pages::{generate_handler, index};

use axum::extract::Multipart;
use std::path::PathBuf;
use std::sync::Arc;

use crate::batch::{generate_certificates, BatchOutcome};
use crate::state::AppState;
use crate::storage::{create_job_dir, generate_job_id, is_xlsx, secure_filename};

/// A validated upload ready for the batch driver.
pub struct Job {
    pub job_id: String,
    pub excel_path: PathBuf,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Default)]
struct UploadForm {
    excel: Option<(String, Vec<u8>)>,
    template_key: String,
}

async fn read_form(multipart: &mut Multipart) -> UploadForm {
    let mut form = UploadForm::default();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        if name == "template" {
            if let Ok(text) = field.text().await {
                form.template_key = text.trim().to_string();
            }
        } else if name == "excel" {
            let filename = field.file_name().unwrap_or("").to_string();
            if let Ok(data) = field.bytes().await {
                form.excel = Some((filename, data.to_vec()));
            }
        }
    }

    form
}

/// Validate the form, store the spreadsheet and create the job's output
/// directory. Errors are user-facing messages.
pub async fn prepare_job(state: &AppState, multipart: &mut Multipart) -> Result<Job, String> {
    let form = read_form(multipart).await;

    let (filename, data) = match form.excel {
        Some((f, d)) if !f.is_empty() && !d.is_empty() => (f, d),
        _ => return Err("No file selected.".to_string()),
    };
    if !is_xlsx(&filename) {
        return Err("Please upload a valid .xlsx file.".to_string());
    }

    let template_path = state
        .config
        .template_path(&form.template_key)
        .ok_or_else(|| "Please select a template.".to_string())?;

    let job_id = generate_job_id();
    let excel_path = state
        .config
        .upload_folder
        .join(format!("{}_{}", job_id, secure_filename(&filename)));
    tokio::fs::write(&excel_path, &data).await.map_err(|e| {
        tracing::error!("Failed to save upload {}: {}", excel_path.display(), e);
        "Could not save the uploaded file.".to_string()
    })?;

    let output_dir = create_job_dir(&state.config.results_folder, &job_id).map_err(|e| {
        tracing::error!("Failed to create job directory for {}: {}", job_id, e);
        "Could not prepare the output folder.".to_string()
    })?;

    Ok(Job {
        job_id,
        excel_path,
        template_path,
        output_dir,
    })
}

/// Run the batch on the blocking pool.
pub async fn run_job(state: &AppState, job: &Job) -> BatchOutcome {
    let config = Arc::clone(&state.config);
    let excel_path = job.excel_path.clone();
    let template_path = job.template_path.clone();
    let output_dir = job.output_dir.clone();

    tracing::info!(job = %job.job_id, template = %template_path.display(), "starting batch");
    let result = tokio::task::spawn_blocking(move || {
        generate_certificates(
            &excel_path,
            &template_path,
            &output_dir,
            &config.fonts,
            &config.layout,
        )
    })
    .await;

    let outcome = match result {
        Ok(result) => BatchOutcome::from(result),
        Err(e) => {
            tracing::error!("Batch task for {} failed: {}", job.job_id, e);
            BatchOutcome::Failed {
                error: format!("certificate generation stopped unexpectedly: {}", e),
            }
        }
    };

    tracing::info!(job = %job.job_id, generated = outcome.generated_count(), "batch complete");
    outcome
}
