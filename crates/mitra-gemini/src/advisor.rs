use async_trait::async_trait;

use crate::error::Result;
use crate::types::Turn;

/// Seam between the dispatcher/gateway and the generative API, so callers
/// and tests can swap in a mock that never touches the network.
#[async_trait]
pub trait CropAdvisor: Send + Sync {
    /// Multi-turn chat in the target natural language.
    async fn chat(&self, turns: &[Turn], language: &str) -> Result<String>;

    /// Single-turn crop/plant image analysis. `mime_type` defaults to JPEG
    /// when the caller has nothing better.
    async fn analyze_image(
        &self,
        image_bytes: &[u8],
        mime_type: Option<&str>,
        question: &str,
    ) -> Result<String>;

    /// Structured advisory prompt delegated to chat as a single-turn
    /// exchange. Output is prose; never parsed.
    async fn recommend_crops(
        &self,
        soil_type: &str,
        location: &str,
        season: &str,
    ) -> Result<String>;
}
