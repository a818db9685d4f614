//! Error types for the drawing surface, the wizard and the generator boundary.

use std::path::PathBuf;

use thiserror::Error;

use crate::wizard::WizardState;

/// Submit was attempted without both names
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("sender name is required")]
    MissingSender,
    #[error("recipient name is required")]
    MissingRecipient,
}

/// The external generation call did not yield exactly one usable image
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("service responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("service returned no image")]
    NoImage,
    #[error("service returned an unusable image: {0}")]
    InvalidPayload(String),
    #[error("generation was aborted")]
    Aborted,
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("bouquet generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: WizardState,
        action: &'static str,
    },
    #[error("a bouquet holds at most {max} sketches")]
    SketchLimitReached { max: usize },
    #[error("draw at least one flower before continuing")]
    NoSketches,
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("unrecognised color value {0:?}")]
    InvalidColor(String),
    #[error("brush width must be a positive number, got {0}")]
    InvalidBrushWidth(f32),
    #[error("failed to encode sketch: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SketchError {
    #[error("sketch payload is not a PNG image")]
    NotPng,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key configured (set API_KEY or GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
