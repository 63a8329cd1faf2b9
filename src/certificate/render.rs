// Drawing one certificate onto a copy of the template and exporting it
use image::{DynamicImage, Rgba, RgbaImage};
use std::path::Path;

use super::runs::split_bold;
use super::wrap::{wrap_runs, WrappedLine};
use super::writeup::compose_writeup;
use super::{output_filename, Record};
use crate::fonts::CertificateFonts;
use crate::pdf::{self, PdfError};

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Fixed positions on the template, in template pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub name_y: f32,
    pub writeup_start_y: f32,
    pub cert_id_position: (f32, f32),
    pub max_text_width: f32,
    pub line_padding: f32,
    /// Pixels per inch used to size the exported page.
    pub resolution_dpi: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            name_y: 665.0,
            writeup_start_y: 820.0,
            cert_id_position: (900.0, 1274.0),
            max_text_width: 1600.0,
            line_padding: 10.0,
            resolution_dpi: 100.0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to load template: {0}")]
    Template(#[from] image::ImageError),
    #[error("Name draw error for {name}: {reason}")]
    NameDraw { name: String, reason: String },
    #[error("Export error for {name}: {source}")]
    Export {
        name: String,
        #[source]
        source: PdfError,
    },
}

impl RenderError {
    /// Fatal errors end the whole batch; the rest only cost one record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::Template(_))
    }
}

#[derive(Debug)]
pub struct Rendered {
    pub filename: String,
    /// Soft problems hit while rendering that did not stop the record.
    pub warnings: Vec<String>,
}

pub struct CertificateRenderer<'a> {
    pub fonts: &'a CertificateFonts,
    pub layout: &'a Layout,
    pub template_path: &'a Path,
    pub output_dir: &'a Path,
}

fn centered_x(canvas_width: u32, content_width: f32) -> f32 {
    ((canvas_width as f32 - content_width) / 2.0).floor()
}

impl<'a> CertificateRenderer<'a> {
    pub fn render(&self, record: &Record, formatted_date: &str) -> Result<Rendered, RenderError> {
        let template = image::open(self.template_path)?.to_rgba8();
        let (canvas, warnings) = self.compose(&template, record, formatted_date)?;

        let filename = output_filename(&record.name, &record.course_title);
        let page = DynamicImage::ImageRgba8(canvas).to_rgb8();
        pdf::write_page(&page, self.layout.resolution_dpi, &self.output_dir.join(&filename))
            .map_err(|source| RenderError::Export {
                name: record.name.clone(),
                source,
            })?;

        tracing::info!(file = %filename, "generated certificate");
        Ok(Rendered { filename, warnings })
    }

    /// Draw name, write-up and certificate ID onto a copy of `template`.
    pub fn compose(
        &self,
        template: &RgbaImage,
        record: &Record,
        formatted_date: &str,
    ) -> Result<(RgbaImage, Vec<String>), RenderError> {
        let mut canvas = template.clone();
        let mut warnings = Vec::new();

        self.draw_name(&mut canvas, &record.name)?;

        let (writeup, substitution_error) =
            compose_writeup(&record.writeup_template, &record.course_title, formatted_date);
        if let Some(e) = substitution_error {
            warnings.push(format!("Write-up format error for {}: {}", record.name, e));
        }

        let runs = split_bold(&writeup, &[record.course_title.as_str(), formatted_date]);
        let lines = wrap_runs(
            &runs,
            self.layout.max_text_width,
            self.fonts.paragraph.as_ref(),
            self.fonts.bold_paragraph.as_ref(),
        );
        self.draw_lines(&mut canvas, &lines);

        let (id_x, id_y) = self.layout.cert_id_position;
        self.fonts.id.draw(
            &mut canvas,
            id_x,
            id_y,
            &format!("Certificate ID: {}", record.cert_id),
            INK,
        );

        Ok((canvas, warnings))
    }

    fn draw_name(&self, canvas: &mut RgbaImage, name: &str) -> Result<(), RenderError> {
        let face = self.fonts.name.as_ref();
        if let Some(c) = face.missing_glyph(name) {
            return Err(RenderError::NameDraw {
                name: name.to_string(),
                reason: format!("font has no glyph for {:?}", c),
            });
        }
        let x = centered_x(canvas.width(), face.advance(name));
        face.draw(canvas, x, self.layout.name_y, name, INK);
        Ok(())
    }

    fn draw_lines(&self, canvas: &mut RgbaImage, lines: &[WrappedLine]) {
        let line_height = self.fonts.paragraph.line_height() + self.layout.line_padding;
        let mut y = self.layout.writeup_start_y;

        for line in lines {
            tracing::trace!(line = %line.text(), "write-up line");
            let mut x = centered_x(canvas.width(), line.width());
            for word in &line.words {
                let face = if word.bold {
                    self.fonts.bold_paragraph.as_ref()
                } else {
                    self.fonts.paragraph.as_ref()
                };
                face.draw(canvas, x, y, &word.text, INK);
                x += word.width;
            }
            y += line_height;
        }
    }
}
