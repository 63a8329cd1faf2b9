// Font loading, measurement and glyph rasterization
// ab_glyph needs real TrueType/OpenType files; paths come from FontConfig
use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("cannot read font {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font data in {0}")]
    Invalid(PathBuf),
}

/// Everything the renderer needs from a face at one size.
pub trait Typeface: Send + Sync {
    /// Horizontal advance of `text`, kerning included.
    fn advance(&self, text: &str) -> f32;
    fn ascent(&self) -> f32;
    /// Distance below the baseline, positive.
    fn descent(&self) -> f32;
    /// First character of `text` the face has no glyph for.
    fn missing_glyph(&self, text: &str) -> Option<char>;
    /// Draw `text` with the top of the ascent at `y`.
    fn draw(&self, canvas: &mut RgbaImage, x: f32, y: f32, text: &str, color: Rgba<u8>);

    fn line_height(&self) -> f32 {
        self.ascent() + self.descent()
    }
}

pub struct GlyphFace {
    font: FontVec,
    scale: PxScale,
}

impl GlyphFace {
    pub fn load(path: &Path, size: f32) -> Result<Self, FontError> {
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_vec(data, size).ok_or_else(|| FontError::Invalid(path.to_path_buf()))
    }

    /// `size` is the em size in pixels.
    pub fn from_vec(data: Vec<u8>, size: f32) -> Option<Self> {
        let font = FontVec::try_from_vec(data).ok()?;
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let scale = PxScale::from(size * font.height_unscaled() / units_per_em);
        Some(Self { font, scale })
    }
}

impl Typeface for GlyphFace {
    fn advance(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(self.scale);
        let mut width = 0.0;
        let mut previous = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }

    fn ascent(&self) -> f32 {
        self.font.as_scaled(self.scale).ascent()
    }

    fn descent(&self) -> f32 {
        -self.font.as_scaled(self.scale).descent()
    }

    fn missing_glyph(&self, text: &str) -> Option<char> {
        text.chars()
            .filter(|c| !c.is_whitespace())
            .find(|c| self.font.glyph_id(*c).0 == 0)
    }

    fn draw(&self, canvas: &mut RgbaImage, x: f32, y: f32, text: &str, color: Rgba<u8>) {
        let scaled = self.font.as_scaled(self.scale);
        let baseline = y + scaled.ascent();
        let mut caret = x;
        let mut previous = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(self.scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                blend(canvas, px, py, color, coverage);
            });
        }
    }
}

/// Alpha-blend `color` into one pixel; out-of-canvas positions are clipped.
pub fn blend(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0) * color[3] as f32 / 255.0;
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for channel in 0..3 {
        let under = pixel[channel] as f32;
        pixel[channel] = (under + (color[channel] as f32 - under) * alpha).round() as u8;
    }
    pixel[3] = pixel[3].max((alpha * 255.0).round() as u8);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSizes {
    pub name: f32,
    pub paragraph: f32,
    pub bold_paragraph: f32,
    pub id: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            name: 100.0,
            paragraph: 30.0,
            bold_paragraph: 28.0,
            id: 30.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FontConfig {
    pub regular_path: PathBuf,
    pub bold_path: PathBuf,
    pub sizes: FontSizes,
}

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/TTF/DejaVuSerif.ttf",
    "/Library/Fonts/Georgia.ttf",
    "/System/Library/Fonts/Supplemental/Georgia.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSerif-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSerif-Bold.ttf",
    "/Library/Fonts/Georgia Bold.ttf",
    "/System/Library/Fonts/Supplemental/Georgia Bold.ttf",
];

fn first_existing(candidates: &[&str]) -> PathBuf {
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .unwrap_or_else(|| PathBuf::from(candidates[0]))
}

impl FontConfig {
    /// Explicit paths win; otherwise the first installed serif candidate.
    pub fn resolve(regular: Option<PathBuf>, bold: Option<PathBuf>) -> Self {
        Self {
            regular_path: regular.unwrap_or_else(|| first_existing(REGULAR_CANDIDATES)),
            bold_path: bold.unwrap_or_else(|| first_existing(BOLD_CANDIDATES)),
            sizes: FontSizes::default(),
        }
    }
}

/// The four faces a certificate is drawn with.
pub struct CertificateFonts {
    pub name: Box<dyn Typeface>,
    pub paragraph: Box<dyn Typeface>,
    pub bold_paragraph: Box<dyn Typeface>,
    pub id: Box<dyn Typeface>,
}

impl CertificateFonts {
    pub fn load(config: &FontConfig) -> Result<Self, FontError> {
        let sizes = config.sizes;
        let fonts = Self {
            name: Box::new(GlyphFace::load(&config.regular_path, sizes.name)?),
            paragraph: Box::new(GlyphFace::load(&config.regular_path, sizes.paragraph)?),
            bold_paragraph: Box::new(GlyphFace::load(&config.bold_path, sizes.bold_paragraph)?),
            id: Box::new(GlyphFace::load(&config.regular_path, sizes.id)?),
        };
        tracing::debug!(
            regular = %config.regular_path.display(),
            bold = %config.bold_path.display(),
            "loaded certificate fonts"
        );
        Ok(fonts)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::BlockFace;
    use super::*;

    #[test]
    fn blend_clips_outside_canvas() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        blend(&mut canvas, -1, 2, Rgba([0, 0, 0, 255]), 1.0);
        blend(&mut canvas, 4, 0, Rgba([0, 0, 0, 255]), 1.0);
        assert!(canvas.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn blend_mixes_by_coverage() {
        let mut canvas = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        blend(&mut canvas, 0, 0, Rgba([0, 0, 0, 255]), 0.5);
        assert_eq!(canvas.get_pixel(0, 0)[0], 128);
    }

    #[test]
    fn line_height_is_ascent_plus_descent() {
        let face = BlockFace::new(10.0);
        assert_eq!(face.line_height(), 20.0);
    }

    #[test]
    fn explicit_font_paths_win() {
        let config = FontConfig::resolve(Some("a.ttf".into()), Some("b.ttf".into()));
        assert_eq!(config.regular_path, PathBuf::from("a.ttf"));
        assert_eq!(config.bold_path, PathBuf::from("b.ttf"));
        assert_eq!(config.sizes, FontSizes::default());
    }

    #[test]
    fn missing_font_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GlyphFace::load(&dir.path().join("nope.ttf"), 30.0)
            .err()
            .unwrap();
        assert!(matches!(err, FontError::Io { .. }));
    }

    #[test]
    fn garbage_font_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let err = GlyphFace::load(&path, 30.0).err().unwrap();
        assert!(matches!(err, FontError::Invalid(_)));
    }
}
