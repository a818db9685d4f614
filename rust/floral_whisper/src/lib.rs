//! Floral Whisper Library
//!
//! Hand-drawn flowers become a generated bouquet and greeting card. This crate
//! provides:
//! - A freehand drawing surface with a CPU raster and PNG export
//! - The four-state wizard that collects sketches and gift details
//! - A client for the image service that composes the bouquet
//!
//! The browser build exposes everything through `web::BouquetStudio`; the
//! native binary drives the same wizard from the command line.

mod brush;
pub mod card;
mod color;
pub mod config;
mod error;
pub mod gemini;
mod generator;
pub mod hooks;
mod input;
pub mod prompt;
mod raster;
mod sketch;
mod surface;
pub mod wizard;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use brush::{BrushDab, BrushParams, BrushPreset, BrushState, BRUSH_SIZES, DEFAULT_WIDTH};
pub use card::GreetingCard;
pub use color::{Rgba, Swatch, DEFAULT_COLOR, PALETTE};
pub use config::GeneratorConfig;
pub use error::{ConfigError, GenerationError, SketchError, SurfaceError, ValidationError, WizardError};
pub use gemini::GeminiGenerator;
pub use generator::BouquetGenerator;
pub use input::{CanvasRect, PointerEvent, PointerEventType};
pub use raster::Raster;
pub use sketch::{EncodedImage, GeneratedArtifact, GiftDetails, Sketch, PNG_MIME};
pub use surface::{canvas_dimensions, placeholder_label, DrawingSurface, ASPECT_RATIO};
pub use wizard::{GenerationRequest, GenerationTask, Notice, Wizard, WizardState, MAX_SKETCHES, STEP_LABELS};

// Re-export for WASM builds
#[cfg(target_arch = "wasm32")]
pub use wasm_bindgen;

/// Initialize panic hook for better error messages in WASM
#[cfg(target_arch = "wasm32")]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize logging for WASM (logs go to browser console)
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::warn_1(&format!("Logger already set: {err}").into());
    }
}

/// WASM entry point - called when the module is loaded
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    init_panic_hook();
    init_logging();

    log::info!("🌸 Floral Whisper WASM module started");
}
