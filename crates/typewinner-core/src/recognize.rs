//! Text-extraction seam.
//!
//! The challenge solver only depends on the bytes-in/text-out shape of the
//! recognition service; the concrete transport lives in its own crate.

use async_trait::async_trait;

/// Extracts the answer text from a challenge image.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Returns the recognized text, or `None` when the image yields nothing
    /// usable. Transport failures surface as errors; callers treat both the
    /// same way (the challenge stays unsolved).
    async fn extract_text(&self, image: &[u8]) -> anyhow::Result<Option<String>>;
}
