//! Exporting a will as a PDF.
//!
//! Both the download and the email path share [`generate_pdf`]: lay the view
//! out, rasterize it at [`CAPTURE_SCALE`], JPEG-encode the raster and wrap
//! it in a single-page document of the same pixel size.

pub mod email;
pub mod pdf;

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::render::layout::layout;
use crate::render::raster::{rasterize, CAPTURE_SCALE};
use crate::render::WillView;

pub use email::{EmailJsMailer, EmailMessage, EmailSender, Mailer};
pub use pdf::{PdfDocument, PdfInfo};

/// Render `view` into a PDF.
///
/// Rasterizing and encoding are CPU-bound and run on the blocking pool.
///
/// # Errors
///
/// Returns an export error if any stage fails.
pub async fn generate_pdf(view: &WillView, jpeg_quality: u8) -> Result<PdfDocument> {
    let page = layout(view);
    let info = PdfInfo {
        title: format!("Digital Will - {}", view.full_name),
        created_at: Utc::now(),
    };

    let document = tokio::task::spawn_blocking(move || {
        let raster = rasterize(&page, CAPTURE_SCALE)?;
        debug!(
            width = raster.width(),
            height = raster.height(),
            "rasterized will"
        );
        let jpeg = raster.encode_jpeg(jpeg_quality)?;
        PdfDocument::from_jpeg(&jpeg, raster.width(), raster.height(), &info)
    })
    .await
    .map_err(|e| Error::export("rasterize", e.to_string()))??;

    Ok(document)
}

/// A PDF written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPdf {
    /// Where the file was written.
    pub path: PathBuf,
    /// Page width in pixels.
    pub width_px: u32,
    /// Page height in pixels.
    pub height_px: u32,
    /// File size in bytes.
    pub size_bytes: usize,
}

/// Render `view` and write the PDF to `path`.
///
/// # Errors
///
/// Returns an export error if rendering fails or an I/O error if the file
/// cannot be written.
pub async fn download(view: &WillView, path: impl AsRef<Path>, jpeg_quality: u8) -> Result<SavedPdf> {
    let path = path.as_ref();
    let document = generate_pdf(view, jpeg_quality).await?;
    document.save(path).await?;

    let (width_px, height_px) = document.page_size_px();
    info!("Saved will PDF to {}", path.display());
    Ok(SavedPdf {
        path: path.to_path_buf(),
        width_px,
        height_px,
        size_bytes: document.as_bytes().len(),
    })
}
