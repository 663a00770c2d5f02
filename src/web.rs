use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::handlers::analyze::AnalysisFailure;
use crate::handlers::AnalysisHandler;
use crate::models::UserMetrics;

pub struct AppState {
    pub handler: Arc<AnalysisHandler>,
}

pub fn create_app_router(handler: Arc<AnalysisHandler>) -> Router {
    let state = Arc::new(AppState { handler });

    Router::new()
        .route("/", get(index_page))
        .route("/api/analyze", post(analyze_handler))
        .route("/health", get(health_check))
        .with_state(state)
}

#[derive(Serialize)]
struct AnalyzeResponse {
    analysis: String,
    bmi: Option<f64>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Pulls the image part and the numeric fields out of the multipart form.
/// Empty or unparsable numeric fields count as zero, matching the form's
/// empty state.
async fn read_submission(
    mut multipart: Multipart,
) -> Result<(Option<(String, Vec<u8>)>, UserMetrics), String> {
    let mut upload = None;
    let mut metrics = UserMetrics::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("malformed multipart body: {}", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("failed to read image part: {}", e))?;
                if !data.is_empty() {
                    upload = Some((mime_type, data.to_vec()));
                }
            }
            "age" => {
                let text = field.text().await.unwrap_or_default();
                metrics.age = text.trim().parse().unwrap_or(0);
            }
            "height_cm" => {
                let text = field.text().await.unwrap_or_default();
                metrics.height_cm = text.trim().parse::<f64>().unwrap_or(0.0).max(0.0);
            }
            "weight_kg" => {
                let text = field.text().await.unwrap_or_default();
                metrics.weight_kg = text.trim().parse::<f64>().unwrap_or(0.0).max(0.0);
            }
            other => {
                log::debug!("Ignoring unknown form field: {}", other);
            }
        }
    }

    Ok((upload, metrics))
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let (upload, metrics) = match read_submission(multipart).await {
        Ok(parsed) => parsed,
        Err(message) => {
            log::warn!("⚠️ Bad analyze request: {}", message);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { error: message }),
            )
                .into_response();
        }
    };

    match state.handler.analyze(upload, metrics).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(AnalyzeResponse {
                analysis: outcome.result.text,
                bmi: outcome.bmi,
            }),
        )
            .into_response(),
        Err(AnalysisFailure::Rejected(validation)) => {
            log::warn!("⚠️ Submission rejected: {}", validation);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: validation.to_string(),
                }),
            )
                .into_response()
        }
        Err(AnalysisFailure::Inference(e)) => {
            // Opaque upstream failure; nothing to recover locally.
            log::error!("❌ Inference call failed: {:#}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "analysis service is unavailable, try again later".to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn index_page() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_page_serves_form() {
        let Html(page) = index_page().await;
        assert!(page.contains("Analyze Calories"));
        assert!(page.contains("accept=\".jpg,.jpeg,.png\""));
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "OK");
    }
}
