use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Instruction sent with every analysis request. Compiled in, never
/// user-editable.
pub const ANALYSIS_PROMPT: &str = "\
You are an expert in Nutritionist where you need to see the food items from the image and need to calculate the total calories,
also provide the details of every food item with calories intake in below format

1. Item 1 - no of calories
2. Item 2 - no of calories
----
----
Finally, mention whether the food is healthy or not and provide a percentage split of the nutritional content, including carbohydrates, fats, fibers, sugars, and others.
";

/// Validation failures raised before the inference client is ever invoked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("no image file was uploaded")]
    MissingImage,
    #[error("body metrics were provided but BMI could not be computed (height and weight must both be non-zero)")]
    MetricsIncomplete,
}

/// An uploaded image as sent to the model: declared MIME type plus the raw
/// bytes, untouched. Built per submission and dropped after the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Optional body metrics collected by the form. Only used to derive BMI.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct UserMetrics {
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub height_cm: f64,
    #[serde(default)]
    pub weight_kg: f64,
}

impl UserMetrics {
    /// Whether the user filled anything in. All-zero metrics are treated
    /// as "not provided" so the plain image-only flow still works.
    pub fn is_provided(&self) -> bool {
        self.age > 0 || self.height_cm > 0.0 || self.weight_kg > 0.0
    }

    /// BMI when both height and weight are usable, `None` otherwise.
    pub fn bmi(&self) -> Option<f64> {
        if self.height_cm > 0.0 && self.weight_kg > 0.0 {
            Some(calculate_bmi(self.weight_kg, self.height_cm))
        } else {
            None
        }
    }
}

/// One inference request: fixed prompt, the image, and an optional BMI
/// annotation. Never persisted.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub prompt: &'static str,
    pub image: ImagePayload,
    pub bmi: Option<f64>,
}

/// Opaque model output, displayed verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub text: String,
}

/// `weight / (height/100)^2`. Callers must not pass a zero height; the
/// form layer treats zero height or weight as "BMI not available".
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    weight_kg / (height_cm / 100.0).powi(2)
}

/// Build the payload for an uploaded file part, or fail when nothing was
/// uploaded. MIME type and bytes pass through exactly as received.
pub fn package_image(upload: Option<(String, Vec<u8>)>) -> Result<ImagePayload, AnalysisError> {
    match upload {
        Some((mime_type, data)) => Ok(ImagePayload { mime_type, data }),
        None => Err(AnalysisError::MissingImage),
    }
}
