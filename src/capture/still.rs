//! Still image extraction and encoding.

use super::{CaptureError, Frame};
use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, RgbImage};

/// Prefix of every encoded still image.
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// One encoded frame extracted from a live preview.
///
/// The payload is a base64 JPEG data URI, which is exactly the string the
/// remote service expects in its `face_image` fields.
#[derive(Clone, PartialEq, Eq)]
pub struct StillImage {
    data_uri: String,
    width: u32,
    height: u32,
}

impl StillImage {
    /// Renders `frame` into an off-screen raster of its natural size and
    /// encodes it as JPEG at `quality`.
    pub fn encode(frame: &Frame, quality: u8) -> Result<Self, CaptureError> {
        let (width, height) = (frame.width(), frame.height());
        if !frame.is_valid() {
            return Err(CaptureError::CaptureFailed(format!(
                "frame buffer does not match {}x{}",
                width, height
            )));
        }

        let raster = RgbImage::from_raw(width, height, frame.pixels().to_vec()).ok_or_else(
            || CaptureError::CaptureFailed("raster allocation failed".to_string()),
        )?;

        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, quality);
        encoder
            .encode(raster.as_raw(), width, height, ColorType::Rgb8)
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

        let mut data_uri = String::with_capacity(JPEG_DATA_URI_PREFIX.len() + jpeg.len() * 4 / 3 + 4);
        data_uri.push_str(JPEG_DATA_URI_PREFIX);
        general_purpose::STANDARD.encode_string(&jpeg, &mut data_uri);

        tracing::debug!(
            width,
            height,
            quality,
            jpeg_bytes = jpeg.len(),
            "Encoded still image"
        );

        Ok(Self {
            data_uri,
            width,
            height,
        })
    }

    /// The encoded data URI.
    pub fn as_data_uri(&self) -> &str {
        &self.data_uri
    }

    /// Decodes the raw JPEG bytes back out of the data URI.
    pub fn jpeg_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let payload = &self.data_uri[JPEG_DATA_URI_PREFIX.len()..];
        general_purpose::STANDARD.decode(payload)
    }

    /// Width of the encoded image.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the encoded image.
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl std::fmt::Debug for StillImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StillImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_uri_len", &self.data_uri.len())
            .finish()
    }
}
