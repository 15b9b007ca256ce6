//! Single-image PDF documents.
//!
//! Produces a one-page PDF whose page is exactly the size of an embedded
//! JPEG. Page sizes are given in pixels and written in points at 96 px per
//! inch.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::error::{Error, Result};

/// Points per pixel (72 pt per inch over 96 px per inch).
pub const POINTS_PER_PIXEL: f32 = 0.75;

/// File name advertised in data URIs.
const DATA_URI_FILE_NAME: &str = "generated.pdf";

/// Name of the page image in the page resources.
const IMAGE_NAME: &str = "Im0";

/// Document metadata written to the info dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInfo {
    /// Document title.
    pub title: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// An assembled PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfDocument {
    bytes: Vec<u8>,
    width_px: u32,
    height_px: u32,
}

impl PdfDocument {
    /// Build a one-page document showing `jpeg` at full page size.
    ///
    /// # Errors
    ///
    /// Returns an export error if the image is empty or has no area, or if
    /// the document cannot be serialized.
    pub fn from_jpeg(jpeg: &[u8], width_px: u32, height_px: u32, info: &PdfInfo) -> Result<Self> {
        if jpeg.is_empty() || width_px == 0 || height_px == 0 {
            return Err(Error::export("encode", "cannot embed an empty image"));
        }

        let page_w = points(width_px);
        let page_h = points(height_px);

        let mut doc = Document::with_version("1.3");
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width_px),
                "Height" => i64::from(height_px),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg.to_vec(),
        ));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(page_w),
                        0.into(),
                        0.into(),
                        Object::Real(page_h),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content = content.encode().map_err(encode_error)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(page_w), Object::Real(page_h)],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { IMAGE_NAME => image_id },
            },
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(info.title.as_str()),
            "Producer" => Object::string_literal("undertaker"),
            "CreationDate" => Object::string_literal(
                format!("D:{}Z", info.created_at.format("%Y%m%d%H%M%S")),
            ),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(encode_error)?;

        Ok(Self {
            bytes,
            width_px,
            height_px,
        })
    }

    /// Page size in pixels. Equal to the embedded image's size.
    #[must_use]
    pub fn page_size_px(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    /// The encoded document.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The document as a base64 `data:` URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:application/pdf;filename={DATA_URI_FILE_NAME};base64,{}",
            STANDARD.encode(&self.bytes)
        )
    }

    /// Write the document to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path, &self.bytes).await?;
        Ok(())
    }
}

/// A pixel length in points.
fn points(px: u32) -> f32 {
    // Raster sides stay below 2^16, well inside f32's exact integer range.
    #[allow(clippy::cast_precision_loss)]
    let px = px as f32;
    px * POINTS_PER_PIXEL
}

fn encode_error(err: impl std::fmt::Display) -> Error {
    Error::export("encode", err.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;

    use super::*;

    fn info() -> PdfInfo {
        PdfInfo {
            title: "Digital Will - Jane Doe".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap(),
        }
    }

    fn fake_jpeg() -> Vec<u8> {
        vec![0xff, 0xd8, 0x00, 0x11, 0x22, 0xff, 0xd9]
    }

    fn number(object: &Object) -> f32 {
        match object {
            Object::Integer(value) => *value as f32,
            Object::Real(value) => *value,
            other => panic!("not a number: {other:?}"),
        }
    }

    /// Page `MediaBox` width and height in points.
    pub(crate) fn media_box(bytes: &[u8]) -> (f32, f32) {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        let page_id = *pages.values().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        (number(&media_box[2]), number(&media_box[3]))
    }

    /// Width and height of the single embedded image.
    pub(crate) fn image_size(bytes: &[u8]) -> (i64, i64) {
        let doc = Document::load_mem(bytes).unwrap();
        let images: Vec<&Stream> = doc
            .objects
            .values()
            .filter_map(|object| match object {
                Object::Stream(stream) => Some(stream),
                _ => None,
            })
            .filter(|stream| {
                matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
            })
            .collect();
        assert_eq!(images.len(), 1);

        let dimension = |key: &[u8]| match images[0].dict.get(key) {
            Ok(Object::Integer(value)) => *value,
            other => panic!("bad image dimension: {other:?}"),
        };
        (dimension(b"Width"), dimension(b"Height"))
    }

    #[test]
    fn test_points() {
        assert!((points(1536) - 1152.0).abs() < f32::EPSILON);
        assert!((points(1) - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_page_matches_image_size() {
        let doc = PdfDocument::from_jpeg(&fake_jpeg(), 1536, 900, &info()).unwrap();

        assert_eq!(doc.page_size_px(), (1536, 900));
        assert_eq!(image_size(doc.as_bytes()), (1536, 900));
        let (width, height) = media_box(doc.as_bytes());
        assert!((width - 1152.0).abs() < 0.01);
        assert!((height - 675.0).abs() < 0.01);
    }

    #[test]
    fn test_image_is_embedded_unchanged() {
        let doc = PdfDocument::from_jpeg(&fake_jpeg(), 10, 10, &info()).unwrap();
        let parsed = Document::load_mem(doc.as_bytes()).unwrap();

        let embedded = parsed.objects.values().find_map(|object| match object {
            Object::Stream(stream)
                if matches!(stream.dict.get(b"Filter"), Ok(Object::Name(name)) if name == b"DCTDecode") =>
            {
                Some(stream.content.clone())
            }
            _ => None,
        });
        assert_eq!(embedded, Some(fake_jpeg()));
    }

    #[test]
    fn test_info_dictionary() {
        let doc = PdfDocument::from_jpeg(&fake_jpeg(), 10, 10, &info()).unwrap();
        let parsed = Document::load_mem(doc.as_bytes()).unwrap();

        let info_id = parsed.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = parsed.get_object(info_id).unwrap().as_dict().unwrap();
        let text = |key: &[u8]| match info.get(key) {
            Ok(Object::String(bytes, _)) => String::from_utf8_lossy(bytes).into_owned(),
            other => panic!("missing {}: {other:?}", String::from_utf8_lossy(key)),
        };

        assert!(doc.as_bytes().starts_with(b"%PDF-1.3"));
        assert_eq!(text(b"Title"), "Digital Will - Jane Doe");
        assert_eq!(text(b"CreationDate"), "D:20240305140709Z");
    }

    #[test]
    fn test_empty_image_rejected() {
        assert!(PdfDocument::from_jpeg(&[], 10, 10, &info())
            .unwrap_err()
            .is_export());
        assert!(PdfDocument::from_jpeg(&fake_jpeg(), 0, 10, &info()).is_err());
    }

    #[test]
    fn test_data_uri() {
        let doc = PdfDocument::from_jpeg(&fake_jpeg(), 10, 10, &info()).unwrap();
        let uri = doc.to_data_uri();
        let prefix = "data:application/pdf;filename=generated.pdf;base64,";

        assert!(uri.starts_with(prefix));
        let decoded = STANDARD.decode(&uri[prefix.len()..]).unwrap();
        assert_eq!(decoded, doc.as_bytes());
    }

    #[tokio::test]
    async fn test_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("will.pdf");
        let doc = PdfDocument::from_jpeg(&fake_jpeg(), 10, 10, &info()).unwrap();

        doc.save(&path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), doc.as_bytes());
    }
}
