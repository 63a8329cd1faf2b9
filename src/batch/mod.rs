// Batch driver: every spreadsheet row through the certificate renderer
use serde::Serialize;
use std::path::Path;

use crate::certificate::date::format_date;
use crate::certificate::render::{CertificateRenderer, Layout, RenderError};
use crate::certificate::Record;
use crate::fonts::{CertificateFonts, FontConfig};
use crate::workbook::{self, CellValue};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Failed to read Excel: {0}")]
    Workbook(String),
    #[error("Font error: {0}")]
    Font(#[from] crate::fonts::FontError),
    #[error(transparent)]
    Render(RenderError),
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub generated: Vec<String>,
    pub errors: Vec<String>,
}

/// Result contract handed to the web layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Failed { error: String },
    Completed {
        success: bool,
        generated: Vec<String>,
        errors: Vec<String>,
    },
}

impl From<Result<BatchReport, BatchError>> for BatchOutcome {
    fn from(result: Result<BatchReport, BatchError>) -> Self {
        match result {
            Ok(report) => BatchOutcome::Completed {
                success: true,
                generated: report.generated,
                errors: report.errors,
            },
            Err(e) => BatchOutcome::Failed { error: e.to_string() },
        }
    }
}

impl BatchOutcome {
    pub fn generated_count(&self) -> usize {
        match self {
            BatchOutcome::Completed { generated, .. } => generated.len(),
            BatchOutcome::Failed { .. } => 0,
        }
    }
}

/// Read the workbook, load fonts, and render every data row into `output_dir`.
pub fn generate_certificates(
    excel_path: &Path,
    template_path: &Path,
    output_dir: &Path,
    font_config: &FontConfig,
    layout: &Layout,
) -> Result<BatchReport, BatchError> {
    let rows = workbook::read_rows(excel_path).map_err(BatchError::Workbook)?;
    let fonts = CertificateFonts::load(font_config)?;
    run_batch(&rows, template_path, output_dir, &fonts, layout)
}

pub fn run_batch(
    rows: &[Vec<CellValue>],
    template_path: &Path,
    output_dir: &Path,
    fonts: &CertificateFonts,
    layout: &Layout,
) -> Result<BatchReport, BatchError> {
    let renderer = CertificateRenderer {
        fonts,
        layout,
        template_path,
        output_dir,
    };
    let mut report = BatchReport::default();

    for row in rows {
        let Some(record) = Record::from_row(row) else {
            continue;
        };

        let formatted_date = match format_date(&record.raw_date) {
            Ok(date) => date,
            Err(e) => {
                report.soft_error(format!("Date error for {}: {}", record.name, e));
                record.raw_date.to_string()
            }
        };

        match renderer.render(&record, &formatted_date) {
            Ok(rendered) => {
                for warning in rendered.warnings {
                    report.soft_error(warning);
                }
                report.generated.push(rendered.filename);
            }
            Err(e) if e.is_fatal() => return Err(BatchError::Render(e)),
            Err(e) => report.soft_error(e.to_string()),
        }
    }

    tracing::info!(
        generated = report.generated.len(),
        errors = report.errors.len(),
        "batch finished"
    );
    Ok(report)
}

impl BatchReport {
    fn soft_error(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.errors.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::testing::{block_fonts, BlockFace};
    use image::{Rgba, RgbaImage};
    use rust_xlsxwriter::Workbook;
    use std::path::PathBuf;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn layout() -> Layout {
        Layout {
            name_y: 10.0,
            writeup_start_y: 60.0,
            cert_id_position: (5.0, 170.0),
            max_text_width: 250.0,
            line_padding: 4.0,
            resolution_dpi: 100.0,
        }
    }

    fn template(dir: &Path) -> PathBuf {
        let path = dir.join("template.png");
        RgbaImage::from_pixel(300, 200, Rgba([250, 245, 230, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn row(name: &str, date: CellValue, course: &str) -> Vec<CellValue> {
        vec![
            text(name),
            date,
            text("has completed {Course} on {Date}."),
            text("CERT-9"),
            text(course),
        ]
    }

    #[test]
    fn blank_rows_are_skipped_silently() {
        let dir = tempfile::tempdir().unwrap();
        let template = template(dir.path());
        let rows = vec![
            row("Ada Lovelace", text("04/07/2025"), "Welding"),
            row("Grace Hopper", CellValue::Number(45840.0), "Compilers 101"),
            row("", text("04/07/2025"), "Welding"),
            row("Nobody", text("04/07/2025"), ""),
        ];

        let report = run_batch(&rows, &template, dir.path(), &block_fonts(), &layout()).unwrap();
        assert_eq!(
            report.generated,
            vec![
                "Ada_Lovelace_Welding_certificate.pdf".to_string(),
                "Grace_Hopper_Compilers_101_certificate.pdf".to_string(),
            ]
        );
        assert!(report.errors.is_empty());
        for file in &report.generated {
            assert!(dir.path().join(file).is_file());
        }
    }

    #[test]
    fn bad_serial_date_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        let template = template(dir.path());
        let rows = vec![row("Ada", CellValue::Number(f64::INFINITY), "Welding")];

        let report = run_batch(&rows, &template, dir.path(), &block_fonts(), &layout()).unwrap();
        assert_eq!(report.generated.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Date error for Ada:"));
    }

    #[test]
    fn name_draw_failure_skips_only_that_row() {
        let dir = tempfile::tempdir().unwrap();
        let template = template(dir.path());
        let mut fonts = block_fonts();
        let mut face = BlockFace::new(20.0);
        face.missing = vec!['ø'];
        fonts.name = Box::new(face);
        let rows = vec![
            row("Bjørn", text("04/07/2025"), "Welding"),
            row("Ada", text("04/07/2025"), "Welding"),
        ];

        let report = run_batch(&rows, &template, dir.path(), &fonts, &layout()).unwrap();
        assert_eq!(report.generated, vec!["Ada_Welding_certificate.pdf".to_string()]);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Name draw error for Bjørn:"));
    }

    #[test]
    fn missing_template_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![row("Ada", text("04/07/2025"), "Welding")];
        let err = run_batch(
            &rows,
            &dir.path().join("nope.png"),
            dir.path(),
            &block_fonts(),
            &layout(),
        )
        .unwrap_err();

        let outcome = BatchOutcome::from(Err::<BatchReport, _>(err));
        match outcome {
            BatchOutcome::Failed { error } => assert!(error.starts_with("Failed to load template:")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn export_failure_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        let template = template(dir.path());
        let rows = vec![row("Ada", text("04/07/2025"), "Welding")];
        let missing_out = dir.path().join("not-created");

        let report = run_batch(&rows, &template, &missing_out, &block_fonts(), &layout()).unwrap();
        assert!(report.generated.is_empty());
        assert!(report.errors[0].starts_with("Export error for Ada:"));
    }

    #[test]
    fn same_name_and_course_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let template = template(dir.path());
        let rows = vec![
            row("Ada", text("04/07/2025"), "Welding"),
            row("Ada", text("05/07/2025"), "Welding"),
        ];
        let report = run_batch(&rows, &template, dir.path(), &block_fonts(), &layout()).unwrap();
        assert_eq!(report.generated.len(), 2);
        let pdfs = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "pdf"))
            .count();
        assert_eq!(pdfs, 1);
    }

    #[test]
    fn unreadable_workbook_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let template = template(dir.path());
        let err = generate_certificates(
            &dir.path().join("missing.xlsx"),
            &template,
            dir.path(),
            &FontConfig::resolve(None, None),
            &layout(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Failed to read Excel:"));
    }

    #[test]
    fn missing_fonts_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let template = template(dir.path());
        let xlsx = dir.path().join("people.xlsx");
        let mut wb = Workbook::new();
        wb.add_worksheet().write_string(0, 0, "Name").unwrap();
        wb.save(&xlsx).unwrap();

        let fonts = FontConfig::resolve(
            Some(dir.path().join("no-regular.ttf")),
            Some(dir.path().join("no-bold.ttf")),
        );
        let err = generate_certificates(&xlsx, &template, dir.path(), &fonts, &layout()).unwrap_err();
        assert!(err.to_string().starts_with("Font error:"));
    }

    #[test]
    fn workbook_rows_render_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let template = template(dir.path());
        let xlsx = dir.path().join("people.xlsx");

        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        for (col, header) in ["Name", "Date", "Writeup", "ID", "Course"].iter().enumerate() {
            ws.write_string(0, col as u16, *header).unwrap();
        }
        let people = [("Ada Lovelace", "Welding"), ("", "Welding"), ("Grace Hopper", "Safety & Health")];
        for (i, (name, course)) in people.iter().enumerate() {
            let r = i as u32 + 1;
            ws.write_string(r, 0, *name).unwrap();
            ws.write_string(r, 1, "04/07/2025").unwrap();
            ws.write_string(r, 2, "has completed {Course} on {Date} .").unwrap();
            ws.write_number(r, 3, 1000.0 + r as f64).unwrap();
            ws.write_string(r, 4, *course).unwrap();
        }
        wb.save(&xlsx).unwrap();

        let rows = workbook::read_rows(&xlsx).unwrap();
        let report = run_batch(&rows, &template, dir.path(), &block_fonts(), &layout()).unwrap();
        assert_eq!(
            report.generated,
            vec![
                "Ada_Lovelace_Welding_certificate.pdf".to_string(),
                "Grace_Hopper_Safety__Health_certificate.pdf".to_string(),
            ]
        );
        assert!(report.errors.is_empty());
    }

    #[test]
    fn outcome_serializes_to_contract() {
        let ok = BatchOutcome::from(Ok(BatchReport {
            generated: vec!["a.pdf".into()],
            errors: vec!["Date error for A: x".into()],
        }));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"success": true, "generated": ["a.pdf"], "errors": ["Date error for A: x"]})
        );
        assert_eq!(ok.generated_count(), 1);

        let failed = BatchOutcome::from(Err::<BatchReport, _>(BatchError::Workbook("bad zip".into())));
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"error": "Failed to read Excel: bad zip"})
        );
        assert_eq!(failed.generated_count(), 0);
    }
}
