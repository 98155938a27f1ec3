//! News Card Composition
//!
//! Turns a source photo plus headline text into a square branded card:
//! - Cover-cropped photo in the bottom 70% of the canvas
//! - Headline fitted into the top band with highlighted phrases
//! - Decorative overlay, logo and brand text on top
//!
//! Everything here is synchronous and deterministic; callers on an async
//! runtime should run [`compose`] on a blocking thread.

mod assets;
pub mod crop;
pub mod layout;
mod render;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::DynamicImage;
use thiserror::Error;

pub use assets::BrandAssets;
pub use layout::{FitOptions, HighlightSpan, TextLayout, TextMeasure};
pub use render::{compose, CardGeometry, FontMeasure};

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Failed to encode composite: {0}")]
    Encode(#[source] image::ImageError),
    #[error("Font could not be loaded from {path}")]
    Font { path: String },
    #[error("Brand asset {path} could not be read: {source}")]
    Asset {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Image has zero width or height")]
    EmptyImage,
}

pub type Result<T> = std::result::Result<T, ComposeError>;

/// PNG bytes of a finished card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn from_png(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }

    /// Plain base64, the form most image hosts accept
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.to_base64())
    }
}

/// Decode raw bytes of any supported raster format
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(bytes).map_err(ComposeError::Decode)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ComposeError::EmptyImage);
    }
    Ok(image)
}
