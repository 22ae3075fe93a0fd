//! Rubber-band selection and region cropping — functional core.
//!
//! This module has zero infrastructure dependencies.
//! The overlay reports where the drag started and where it was released
//! (in logical window coordinates); everything from there to a cropped
//! bitmap happens here.

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use serde::Deserialize;
use std::io::Cursor;

/// A pointer position in logical overlay coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A normalized rectangle in logical coordinates.
///
/// Width and height are never negative, whichever direction the user dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Selection {
    /// Builds the rectangle spanned by two opposite corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// A click without a drag selects nothing.
    pub fn is_null(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Converts to physical pixels, rounding outward so the whole
    /// highlighted area is kept on fractional scale factors.
    pub fn to_physical(&self, scale: f64) -> PixelRect {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };

        let left = (self.x * scale).floor().max(0.0);
        let top = (self.y * scale).floor().max(0.0);
        let right = ((self.x + self.width) * scale).ceil().max(left);
        let bottom = ((self.y + self.height) * scale).ceil().max(top);

        PixelRect {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        }
    }
}

/// Tracks a mouse-dragged rectangle from press to release.
#[derive(Debug, Clone, Default)]
pub struct RubberBand {
    origin: Option<Point>,
    current: Option<Point>,
}

impl RubberBand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new band at `at`, discarding any previous one.
    pub fn press(&mut self, at: Point) {
        self.origin = Some(at);
        self.current = Some(at);
    }

    /// Moves the free corner. Ignored until a press has happened.
    pub fn drag_to(&mut self, at: Point) {
        if self.origin.is_some() {
            self.current = Some(at);
        }
    }

    /// The in-progress rectangle, if a drag is active.
    pub fn current(&self) -> Option<Selection> {
        Some(Selection::from_corners(self.origin?, self.current?))
    }

    /// Ends the drag and returns the final rectangle.
    pub fn release(&mut self) -> Option<Selection> {
        let selection = self.current();
        self.origin = None;
        self.current = None;
        selection
    }
}

/// A rectangle in physical pixels of the captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Intersects the rectangle with a `width`×`height` image.
    /// Returns `None` when nothing of it lies inside the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<PixelRect> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let right = self.x.saturating_add(self.width).min(width);
        let bottom = self.y.saturating_add(self.height).min(height);

        let clamped = PixelRect {
            x: self.x,
            y: self.y,
            width: right - self.x,
            height: bottom - self.y,
        };
        if clamped.width == 0 || clamped.height == 0 {
            return None;
        }
        Some(clamped)
    }
}

/// Crops `image` to `rect`.
///
/// # Arguments
/// * `image` - The frozen full-screen frame
/// * `rect` - The region to keep, in physical pixels
pub fn crop(image: &RgbaImage, rect: PixelRect) -> Result<RgbaImage, CropError> {
    if rect.width == 0 || rect.height == 0 {
        return Err(CropError::ZeroDimension);
    }

    let (img_width, img_height) = image.dimensions();

    if !fits(rect.x, rect.width, img_width) || !fits(rect.y, rect.height, img_height) {
        return Err(CropError::OutOfBounds {
            requested: (rect.x, rect.y, rect.width, rect.height),
            image_size: (img_width, img_height),
        });
    }

    Ok(imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image())
}

fn fits(start: u32, len: u32, limit: u32) -> bool {
    start.checked_add(len).is_some_and(|end| end <= limit)
}

/// Runs a whole drag (press at `origin`, release at `release`) against the
/// frozen frame and returns the selected pixels.
///
/// `Ok(None)` means the selection was empty or fell entirely off-screen,
/// which is a cancelled capture rather than an error.
pub fn crop_selection(
    frame: &RgbaImage,
    origin: Point,
    release: Point,
    scale: f64,
) -> Result<Option<RgbaImage>, CropError> {
    let mut band = RubberBand::new();
    band.press(origin);
    band.drag_to(release);

    let Some(selection) = band.release().filter(|s| !s.is_null()) else {
        return Ok(None);
    };

    let (width, height) = frame.dimensions();
    match selection.to_physical(scale).clamp_to(width, height) {
        Some(rect) => crop(frame, rect).map(Some),
        None => Ok(None),
    }
}

/// Encodes an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CropError> {
    let mut png_bytes: Vec<u8> = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| CropError::EncodingFailed(e.to_string()))?;
    Ok(png_bytes)
}

/// Largest size that fits in `max_width`×`max_height` keeping the aspect
/// ratio. Never upscales.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

/// Downscaled copy for the main window preview.
pub fn preview(image: &RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    let (width, height) = fit_within(image.width(), image.height(), max_width, max_height);
    if (width, height) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Triangle)
}

#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("Crop rectangle has zero width or height")]
    ZeroDimension,

    #[error(
        "Crop rectangle ({},{},{},{}) exceeds image bounds ({}x{})",
        requested.0, requested.1, requested.2, requested.3,
        image_size.0, image_size.1
    )]
    OutOfBounds {
        requested: (u32, u32, u32, u32),
        image_size: (u32, u32),
    },

    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}
