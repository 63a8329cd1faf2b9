use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use chrono::Utc;

pub fn generate_job_id() -> String {
    format!(
        "{}_{}",
        Utc::now().format("%Y%m%d"),
        &Uuid::new_v4().simple().to_string()[..8]
    )
}

pub fn ensure_dirs(upload_folder: &Path, results_folder: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(upload_folder)?;
    std::fs::create_dir_all(results_folder)?;
    Ok(())
}

/// Fresh output directory for one batch.
pub fn create_job_dir(results_folder: &Path, job_id: &str) -> std::io::Result<PathBuf> {
    let dir = results_folder.join(job_id);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// A single path component that cannot escape its parent directory.
pub fn is_safe_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
}

/// Upload filename reduced to ASCII alphanumerics, `.`, `_` and `-`.
pub fn secure_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

pub fn is_xlsx(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map_or(false, |(_, ext)| ext.eq_ignore_ascii_case("xlsx"))
}

pub const ERROR_REPORT: &str = "errors.txt";

/// Write the batch's soft errors, one per line, next to its certificates.
/// Nothing is written when there are none.
pub fn write_error_report(dir: &Path, errors: &[String]) -> std::io::Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let mut report = errors.join("\n");
    report.push('\n');
    std::fs::write(dir.join(ERROR_REPORT), report)
}

/// Zip every regular file directly inside `dir`, sorted by name.
pub fn zip_directory(dir: &Path) -> std::io::Result<Vec<u8>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    let mut zip_data = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut zip_data));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for path in files {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let content = std::fs::read(&path)?;
            zip.start_file(name, options).map_err(std::io::Error::other)?;
            zip.write_all(&content)?;
            tracing::debug!(file = name, "added to archive");
        }

        zip.finish().map_err(std::io::Error::other)?;
    }
    Ok(zip_data)
}
