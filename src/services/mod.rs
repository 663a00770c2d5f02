pub mod gemini;

pub use gemini::GeminiClient;

use anyhow::Result;

use crate::models::{AnalysisRequest, AnalysisResult};

/// Trait for hosted multimodal models (Gemini today, swappable in tests).
#[async_trait::async_trait]
pub trait VisionModel: Send + Sync {
    /// One blocking round trip: prompt + image (+ optional BMI) in,
    /// free-form text out. No retries, no streaming.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult>;
}
