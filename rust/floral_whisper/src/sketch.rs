//! Sketches, gift details and the generated artifact.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{SketchError, ValidationError};

/// Mime type of every exported sketch
pub const PNG_MIME: &str = "image/png";

/// An encoded raster image: opaque bytes plus their mime type
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    mime_type: String,
}

impl EncodedImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Wrap bytes that are known to be PNG (e.g. fresh from the encoder)
    pub fn png(bytes: Vec<u8>) -> Self {
        Self::new(bytes, PNG_MIME)
    }

    /// Wrap bytes from an untrusted source, checking the PNG signature
    pub fn from_png_bytes(bytes: Vec<u8>) -> Result<Self, SketchError> {
        match image::guess_format(&bytes) {
            Ok(image::ImageFormat::Png) => Ok(Self::png(bytes)),
            _ => Err(SketchError::NotPng),
        }
    }

    /// Decode a base64 payload as delivered inline by the image service
    pub fn from_base64(data: &str, mime_type: impl Into<String>) -> Result<Self, base64::DecodeError> {
        Ok(Self::new(STANDARD.decode(data.trim())?, mime_type))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:` URL for `<img src>`
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One user-drawn flower, in the order it was saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sketch {
    ordinal: usize,
    image: EncodedImage,
}

impl Sketch {
    pub(crate) fn new(ordinal: usize, image: EncodedImage) -> Self {
        Self { ordinal, image }
    }

    /// Zero-based position in the bouquet
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn image(&self) -> &EncodedImage {
        &self.image
    }

    /// Gallery badge, e.g. `#1`
    pub fn badge(&self) -> String {
        format!("#{}", self.ordinal + 1)
    }
}

/// Who the bouquet is from, who it is for, and the card message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GiftDetails {
    pub sender: String,
    pub recipient: String,
    pub message: String,
}

impl GiftDetails {
    /// Both names must contain something other than whitespace
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sender.trim().is_empty() {
            return Err(ValidationError::MissingSender);
        }
        if self.recipient.trim().is_empty() {
            return Err(ValidationError::MissingRecipient);
        }
        Ok(())
    }
}

/// The composed bouquet returned by the image service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact(EncodedImage);

impl GeneratedArtifact {
    pub fn new(image: EncodedImage) -> Self {
        Self(image)
    }

    pub fn image(&self) -> &EncodedImage {
        &self.0
    }
}
