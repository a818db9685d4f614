//! The image-service boundary.
//!
//! The wizard only knows this trait; `GeminiGenerator` is the production
//! implementation and tests substitute their own.

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::sketch::{EncodedImage, Sketch};

/// Composes an ordered list of sketches into one bouquet image
///
/// Implementations return exactly one image or fail as a whole. Futures are
/// not `Send`: the browser runs them on its single-threaded executor.
#[async_trait(?Send)]
pub trait BouquetGenerator {
    async fn generate_bouquet(
        &self,
        sketches: &[Sketch],
        sender: &str,
        recipient: &str,
    ) -> Result<EncodedImage, GenerationError>;
}
