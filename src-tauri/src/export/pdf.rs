//! Multi-page PDF export — one captured image per page.
//!
//! Each image is scaled to fit the page keeping its aspect ratio and drawn
//! from the page's top-left corner. Pixels are embedded as Flate-compressed
//! DeviceRGB image XObjects; alpha is flattened onto white.

use flate2::{write::ZlibEncoder, Compression};
use image::{Rgba, RgbaImage};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};
use std::io::Write;
use std::path::{Path, PathBuf};

const IMAGE_NAME: Name<'static> = Name(b"Im0");

/// Page dimensions in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width_pt: 595.28,
        height_pt: 841.89,
    };

    pub const LETTER: PageSize = PageSize {
        width_pt: 612.0,
        height_pt: 792.0,
    };
}

/// Where an image lands on its page, in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Scales a `width`×`height` image to the largest size that fits the page
/// and anchors it at the top-left corner.
pub fn fit_to_page(width: u32, height: u32, page: PageSize) -> Placement {
    let scale = f32::min(
        page.width_pt / width as f32,
        page.height_pt / height as f32,
    );
    let placed_width = width as f32 * scale;
    let placed_height = height as f32 * scale;

    Placement {
        x: 0.0,
        y: page.height_pt - placed_height,
        width: placed_width,
        height: placed_height,
    }
}

struct PageRefs {
    page: Ref,
    content: Ref,
    image: Ref,
}

/// Renders `images` into a PDF document, one page each, in order.
pub fn render_pdf(images: &[RgbaImage], page: PageSize) -> Result<Vec<u8>, ExportError> {
    if images.is_empty() {
        return Err(ExportError::NoScreenshots);
    }
    if let Some(index) = images.iter().position(|i| i.width() == 0 || i.height() == 0) {
        return Err(ExportError::EmptyImage { index });
    }

    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let refs: Vec<PageRefs> = images
        .iter()
        .map(|_| PageRefs {
            page: alloc.bump(),
            content: alloc.bump(),
            image: alloc.bump(),
        })
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(refs.iter().map(|r| r.page))
        .count(refs.len() as i32);

    let media_box = Rect::new(0.0, 0.0, page.width_pt, page.height_pt);

    for (image, ids) in images.iter().zip(&refs) {
        let mut pdf_page = pdf.page(ids.page);
        pdf_page.media_box(media_box);
        pdf_page.parent(page_tree_id);
        pdf_page.contents(ids.content);
        pdf_page.resources().x_objects().pair(IMAGE_NAME, ids.image);
        pdf_page.finish();

        let data = deflate_rgb(image)?;
        let mut xobject = pdf.image_xobject(ids.image, &data);
        xobject.filter(Filter::FlateDecode);
        xobject.width(image.width() as i32);
        xobject.height(image.height() as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        xobject.finish();

        let placement = fit_to_page(image.width(), image.height(), page);
        let mut content = Content::new();
        content.save_state();
        content.transform([
            placement.width,
            0.0,
            0.0,
            placement.height,
            placement.x,
            placement.y,
        ]);
        content.x_object(IMAGE_NAME);
        content.restore_state();
        pdf.stream(ids.content, &content.finish());
    }

    Ok(pdf.finish())
}

/// Renders `images` and writes the document to `path`.
pub fn write_pdf(path: &Path, images: &[RgbaImage], page: PageSize) -> Result<(), ExportError> {
    let bytes = render_pdf(images, page)?;
    std::fs::write(path, &bytes)?;
    log::info!(
        "Wrote {} page(s) to {} ({} bytes)",
        images.len(),
        path.display(),
        bytes.len()
    );
    Ok(())
}

/// Appends `.pdf` when the chosen file name has a different or no extension.
pub fn ensure_pdf_extension(path: PathBuf) -> PathBuf {
    let has_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if has_pdf {
        return path;
    }
    let mut name = path.into_os_string();
    name.push(".pdf");
    PathBuf::from(name)
}

fn flatten(px: &Rgba<u8>) -> [u8; 3] {
    let alpha = px[3] as u16;
    let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha)) / 255) as u8;
    [blend(px[0]), blend(px[1]), blend(px[2])]
}

fn deflate_rgb(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let rgb: Vec<u8> = image.pixels().flat_map(flatten).collect();
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(rgb.len() / 4), Compression::default());
    encoder.write_all(&rgb)?;
    Ok(encoder.finish()?)
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No screenshots to export")]
    NoScreenshots,

    #[error("Screenshot {index} has zero width or height")]
    EmptyImage { index: usize },

    #[error("Failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}
