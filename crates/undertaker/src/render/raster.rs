//! Rasterizer for laid-out pages.
//!
//! Paints a [`Layout`] into an RGB image at an integer scale and encodes it
//! as JPEG for embedding in the PDF.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

use super::layout::{Layout, Paint, GLYPH_SIZE};
use crate::error::{Error, Result};

/// Scale the page is captured at.
pub const CAPTURE_SCALE: u32 = 2;

/// Largest side a baseline JPEG can describe.
pub const MAX_DIMENSION: u32 = 65_535;

/// Largest raster area painted, about 75 MB of RGB.
pub const MAX_PIXELS: u64 = 1536 * 16_384;

const BACKGROUND: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);

/// Drawn for characters the font has no glyph for.
const REPLACEMENT_GLYPH: [u8; 8] = [0x7e, 0x42, 0x42, 0x42, 0x42, 0x42, 0x7e, 0x00];

fn color(paint: Paint) -> Rgb<u8> {
    match paint {
        Paint::Ink => Rgb([0x11, 0x18, 0x27]),
        Paint::Body => Rgb([0x1f, 0x29, 0x37]),
        Paint::Muted => Rgb([0x6b, 0x72, 0x80]),
        Paint::Rule => Rgb([0xe5, 0xe7, 0xeb]),
        Paint::Panel => Rgb([0xf9, 0xfa, 0xfb]),
    }
}

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .unwrap_or(REPLACEMENT_GLYPH)
}

/// A captured page.
#[derive(Debug, Clone)]
pub struct Raster {
    image: RgbImage,
}

impl Raster {
    /// Width in device pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in device pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The pixel buffer.
    #[must_use]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Encode the raster as a baseline JPEG.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder rejects the image.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>> {
        let mut writer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
        encoder.encode(
            self.image.as_raw(),
            self.width(),
            self.height(),
            image::ColorType::Rgb8,
        )?;
        Ok(writer)
    }
}

/// Paint `layout` at `scale` device pixels per CSS pixel.
///
/// # Errors
///
/// Returns an export error if the page is empty or too large to encode.
pub fn rasterize(layout: &Layout, scale: u32) -> Result<Raster> {
    if scale == 0 || layout.width == 0 || layout.height == 0 {
        return Err(Error::export("rasterize", "page has no area"));
    }

    let width = layout
        .width
        .checked_mul(scale)
        .filter(|w| *w <= MAX_DIMENSION);
    let height = layout
        .height
        .checked_mul(scale)
        .filter(|h| *h <= MAX_DIMENSION);
    let (Some(width), Some(height)) = (width, height) else {
        return Err(Error::export(
            "rasterize",
            format!(
                "page of {}x{} at {scale}x exceeds {MAX_DIMENSION} pixels",
                layout.width, layout.height
            ),
        ));
    };

    if u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(Error::export(
            "rasterize",
            format!("page of {width}x{height} pixels exceeds {MAX_PIXELS} pixels"),
        ));
    }

    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);

    for block in &layout.blocks {
        fill(
            &mut image,
            block.x * scale,
            block.y * scale,
            block.width * scale,
            block.height * scale,
            color(block.paint),
        );
    }

    for run in &layout.runs {
        let dot = run.size * scale;
        let advance = GLYPH_SIZE * dot;
        let ink = color(run.paint);
        let mut x = run.x * scale;
        let y = run.y * scale;

        for ch in run.text.chars() {
            if !ch.is_whitespace() {
                for (row, bits) in glyph(ch).iter().enumerate() {
                    for col in 0..GLYPH_SIZE {
                        if bits & (1 << col) != 0 {
                            // row < 8, so the cast is lossless.
                            #[allow(clippy::cast_possible_truncation)]
                            let row = row as u32;
                            fill(&mut image, x + col * dot, y + row * dot, dot, dot, ink);
                        }
                    }
                }
            }
            x += advance;
        }
    }

    Ok(Raster { image })
}

/// Fill a rectangle, clipped to the image.
fn fill(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, paint: Rgb<u8>) {
    let x_end = x.saturating_add(width).min(image.width());
    let y_end = y.saturating_add(height).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, paint);
        }
    }
}
