// Single-page PDF export of a rendered certificate
// The raster is embedded as one JPEG (DCTDecode) image covering the page
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};
use std::path::Path;

const JPEG_QUALITY: u8 = 90;
const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("failed to encode page image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// PDF bytes for one page showing `page` at `dpi` pixels per inch.
pub fn encode_page(page: &RgbImage, dpi: f32) -> Result<Vec<u8>, PdfError> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(page)?;

    let (width_px, height_px) = page.dimensions();
    let width_pt = width_px as f32 * POINTS_PER_INCH / dpi;
    let height_pt = height_px as f32 * POINTS_PER_INCH / dpi;

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let content_id = Ref::new(4);
    let image_id = Ref::new(5);
    let image_name = Name(b"Im1");

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    {
        let mut page_obj = pdf.page(page_id);
        page_obj.media_box(Rect::new(0.0, 0.0, width_pt, height_pt));
        page_obj.parent(page_tree_id);
        page_obj.contents(content_id);
        page_obj.resources().x_objects().pair(image_name, image_id);
        page_obj.finish();
    }

    {
        let mut xobject = pdf.image_xobject(image_id, &jpeg);
        xobject.filter(Filter::DctDecode);
        xobject.width(width_px as i32);
        xobject.height(height_px as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
    }

    let mut content = Content::new();
    content.save_state();
    content.transform([width_pt, 0.0, 0.0, height_pt, 0.0, 0.0]);
    content.x_object(image_name);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    Ok(pdf.finish())
}

pub fn write_page(page: &RgbImage, dpi: f32, output_path: &Path) -> Result<(), PdfError> {
    let bytes = encode_page(page, dpi)?;
    std::fs::write(output_path, bytes).map_err(|source| PdfError::Write {
        path: output_path.display().to_string(),
        source,
    })
}
