//! Generative-AI pitch enhancement proxy.
//!
//! Calls the Gemini `generateContent` REST API to rewrite/improve/expand a
//! draft pitch, then asks for follow-up suggestions. Failures surface as a
//! single error message and never touch stored pitch state; enhancement only
//! replaces client-side draft text.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::warn;

use pitchboard_core::prompt;
use pitchboard_types::api::{ActionResponse, EnhanceRequest, EnhancedPitch};
use pitchboard_types::error::ActionError;

use crate::auth::AppState;
use crate::error::ApiResult;

pub async fn enhance_pitch(
    State(state): State<AppState>,
    Json(req): Json<EnhanceRequest>,
) -> ApiResult<EnhancedPitch> {
    ApiResult(do_enhance_pitch(&state, req).await)
}

pub async fn do_enhance_pitch(
    state: &AppState,
    req: EnhanceRequest,
) -> Result<ActionResponse<EnhancedPitch>, ActionError> {
    validate(&req)?;

    let api_key = state
        .config
        .gemini_api_key
        .as_deref()
        .ok_or_else(|| ActionError::ConfigurationError("GEMINI_API_KEY is not set".into()))?;

    let main_prompt = prompt::enhance_prompt(req.action, &req.title, &req.description, &req.pitch);
    let enhanced_pitch = generate(state, api_key, &main_prompt).await?;

    let suggestions_text =
        generate(state, api_key, &prompt::suggestions_prompt(&enhanced_pitch)).await?;
    let suggestions = prompt::parse_suggestions(&suggestions_text);

    Ok(ActionResponse::success(EnhancedPitch {
        enhanced_pitch,
        suggestions: if suggestions.is_empty() { None } else { Some(suggestions) },
    }))
}

fn validate(req: &EnhanceRequest) -> Result<(), ActionError> {
    if req.title.trim().is_empty() {
        return Err(ActionError::ValidationError("Title is required".into()));
    }
    if req.description.trim().is_empty() {
        return Err(ActionError::ValidationError("Description is required".into()));
    }
    if req.pitch.trim().chars().count() < 10 {
        return Err(ActionError::ValidationError(
            "Pitch must be at least 10 characters".into(),
        ));
    }
    Ok(())
}

async fn generate(state: &AppState, api_key: &str, prompt_text: &str) -> Result<String, ActionError> {
    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        state.config.gemini_model, api_key
    );

    let body = GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: prompt_text.to_string(),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
        },
    };

    let response = state
        .http
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| enhance_error(&e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        warn!("Gemini API returned {}: {}", status, text);
        return Err(enhance_error(&format!("Gemini API returned {status}")));
    }

    let parsed: GenerateResponse = response
        .json()
        .await
        .map_err(|e| enhance_error(&e.to_string()))?;

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| enhance_error("empty model response"))
}

fn enhance_error(detail: &str) -> ActionError {
    ActionError::OperationFailed(format!("Failed to enhance pitch: {detail}"))
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
