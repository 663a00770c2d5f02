use anyhow::Result;
use std::sync::Arc;

use crate::models::{
    package_image, AnalysisError, AnalysisRequest, AnalysisResult, UserMetrics, ANALYSIS_PROMPT,
};
use crate::services::VisionModel;

/// Outcome of one form submission: the model's text plus the BMI that was
/// sent along with it, if any.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub bmi: Option<f64>,
}

/// Runs the whole pipeline for one submission: validate, package, derive
/// BMI, call the model once. Stateless across submissions.
pub struct AnalysisHandler {
    model: Arc<dyn VisionModel>,
}

impl AnalysisHandler {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    /// Guards run before the model is touched: a file must be present, and
    /// when any metric was filled in the BMI must be computable. Metrics
    /// left entirely empty mean the image-only flow (no BMI part).
    pub fn validate(
        upload: Option<(String, Vec<u8>)>,
        metrics: UserMetrics,
    ) -> Result<AnalysisRequest, AnalysisError> {
        let image = package_image(upload)?;

        let bmi = if metrics.is_provided() {
            Some(metrics.bmi().ok_or(AnalysisError::MetricsIncomplete)?)
        } else {
            None
        };

        Ok(AnalysisRequest {
            prompt: ANALYSIS_PROMPT,
            image,
            bmi,
        })
    }

    pub async fn analyze(
        &self,
        upload: Option<(String, Vec<u8>)>,
        metrics: UserMetrics,
    ) -> Result<AnalysisOutcome, AnalysisFailure> {
        let request = Self::validate(upload, metrics).map_err(AnalysisFailure::Rejected)?;

        log::info!(
            "🍽️ Analyzing meal photo ({} bytes, bmi={:?})",
            request.image.data.len(),
            request.bmi
        );

        let result = self
            .model
            .analyze(&request)
            .await
            .map_err(AnalysisFailure::Inference)?;

        Ok(AnalysisOutcome {
            result,
            bmi: request.bmi,
        })
    }
}

/// Either the submission never qualified, or the upstream call failed.
/// Upstream failures stay opaque; nothing is retried.
#[derive(Debug)]
pub enum AnalysisFailure {
    Rejected(AnalysisError),
    Inference(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImagePayload;
    use std::sync::Mutex;

    /// Records every request it receives and replies with a canned string.
    struct RecordingModel {
        requests: Mutex<Vec<AnalysisRequest>>,
        reply: String,
    }

    impl RecordingModel {
        fn new(reply: &str) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            }
        }

        fn calls(&self) -> Vec<AnalysisRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl VisionModel for RecordingModel {
        async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(AnalysisResult {
                text: self.reply.clone(),
            })
        }
    }

    fn upload() -> Option<(String, Vec<u8>)> {
        Some(("image/jpeg".to_string(), vec![0xFF, 0xD8, 0xFF]))
    }

    #[tokio::test]
    async fn test_missing_file_blocks_analysis() {
        let model = Arc::new(RecordingModel::new("unused"));
        let handler = AnalysisHandler::new(model.clone());

        let err = handler
            .analyze(None, UserMetrics::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisFailure::Rejected(AnalysisError::MissingImage)
        ));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_zero_bmi_blocks_analysis() {
        let model = Arc::new(RecordingModel::new("unused"));
        let handler = AnalysisHandler::new(model.clone());

        // Height missing, so BMI cannot be computed.
        let metrics = UserMetrics {
            age: 25,
            height_cm: 0.0,
            weight_kg: 70.0,
        };
        let err = handler.analyze(upload(), metrics).await.unwrap_err();

        assert!(matches!(
            err,
            AnalysisFailure::Rejected(AnalysisError::MetricsIncomplete)
        ));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_valid_submission_calls_model_once() {
        let model = Arc::new(RecordingModel::new("Rice - 200 calories"));
        let handler = AnalysisHandler::new(model.clone());

        let metrics = UserMetrics {
            age: 30,
            height_cm: 175.0,
            weight_kg: 70.0,
        };
        let outcome = handler.analyze(upload(), metrics).await.unwrap();

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, ANALYSIS_PROMPT);
        assert_eq!(
            calls[0].image,
            ImagePayload {
                mime_type: "image/jpeg".to_string(),
                data: vec![0xFF, 0xD8, 0xFF],
            }
        );
        let bmi = calls[0].bmi.unwrap();
        assert!((bmi - 22.86).abs() < 0.01);

        // Displayed text is the model output, unmodified.
        assert_eq!(outcome.result.text, "Rice - 200 calories");
        assert_eq!(outcome.bmi, calls[0].bmi);
    }

    #[tokio::test]
    async fn test_no_metrics_sends_request_without_bmi() {
        let model = Arc::new(RecordingModel::new("Soup - 120 calories"));
        let handler = AnalysisHandler::new(model.clone());

        let outcome = handler
            .analyze(upload(), UserMetrics::default())
            .await
            .unwrap();

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].bmi, None);
        assert_eq!(outcome.bmi, None);
        assert_eq!(outcome.result.text, "Soup - 120 calories");
    }
}
