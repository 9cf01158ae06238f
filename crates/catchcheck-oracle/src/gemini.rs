use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use catchcheck_core::error::{CatchError, Result};
use catchcheck_core::models::{
    AnalysisMode, Coordinate, GroundSuggestion, HealthReport, OracleVerdict,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::ports::ImageOracle;
use crate::response::{parse_health, parse_suggestion, parse_verdict};

const SPECIES_PROMPT: &str = "Identify the fish in this photo. Check whether the photo is \
    authentic (not a screen capture, print, stock image or edited picture) and flag it as \
    suspicious otherwise. Answer with JSON: {isFish: boolean, species: string, length: number \
    (cm), weight: number (kg), isSuspicious: boolean, fraudReason: string, \
    detectedObject: string}.";

const HEALTH_PROMPT: &str = "You are an expert ichthyologist. Analyze the photo of the fish and \
    focus on its HEALTH (parasites, fungus, wounds, deformities).";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini `generateContent` adapter
pub struct GeminiOracle {
    /// Base URL for the API (e.g., "https://generativelanguage.googleapis.com")
    base_url: String,

    /// Model name
    model: String,

    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl GeminiOracle {
    /// Create a new Gemini oracle
    ///
    /// Fails when the HTTP client cannot be built, rather than falling back
    /// to a client without a request timeout.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CatchError::OracleUnavailable {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Send a request and return the concatenated text of the first candidate
    async fn generate(&self, mode: AnalysisMode, request: &GenerateRequest) -> Result<String> {
        tracing::debug!(model = %self.model, %mode, "calling oracle");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CatchError::OracleUnavailable {
                reason: format!("failed to reach {} for {}: {}", self.base_url, mode, e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatchError::OracleUnavailable {
                reason: format!("oracle API error ({}) during {}: {}", status, mode, error_text),
            });
        }

        let body: GenerateResponse =
            response.json().await.map_err(|e| CatchError::OracleUnavailable {
                reason: format!("failed to decode oracle response: {}", e),
            })?;

        body.first_text().ok_or_else(|| CatchError::OracleUnavailable {
            reason: format!("oracle returned no candidates for {}", mode),
        })
    }
}

#[async_trait]
impl ImageOracle for GeminiOracle {
    async fn analyze(&self, image: &[u8], mime_type: &str) -> Result<OracleVerdict> {
        let request = species_request(image, mime_type);
        let text = self.generate(AnalysisMode::SpeciesCheck, &request).await?;
        parse_verdict(&text)
    }

    async fn diagnose(&self, image: &[u8], mime_type: &str) -> Result<HealthReport> {
        let request = health_request(image, mime_type);
        let text = self.generate(AnalysisMode::HealthDiagnostic, &request).await?;
        parse_health(&text)
    }

    async fn nearest_ground(&self, at: Coordinate) -> Result<Option<GroundSuggestion>> {
        let request = proximity_request(at);
        let text = self.generate(AnalysisMode::ProximityLookup, &request).await?;
        parse_suggestion(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn species_request(image: &[u8], mime_type: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content::user(vec![
            Part::text(SPECIES_PROMPT),
            Part::inline(image, mime_type),
        ])],
        generation_config: Some(GenerationConfig::json(json!({
            "type": "OBJECT",
            "properties": {
                "isFish": { "type": "BOOLEAN" },
                "species": { "type": "STRING" },
                "length": { "type": "NUMBER" },
                "weight": { "type": "NUMBER" },
                "isSuspicious": { "type": "BOOLEAN" },
                "fraudReason": { "type": "STRING" },
                "detectedObject": { "type": "STRING" }
            },
            "required": ["isFish", "isSuspicious"]
        }))),
        tools: None,
    }
}

fn health_request(image: &[u8], mime_type: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content::user(vec![
            Part::text(HEALTH_PROMPT),
            Part::inline(image, mime_type),
        ])],
        generation_config: Some(GenerationConfig::json(json!({
            "type": "OBJECT",
            "properties": {
                "species": { "type": "STRING" },
                "healthStatus": {
                    "type": "STRING",
                    "enum": ["healthy", "injured", "parasites", "invasive"]
                },
                "diagnostic": {
                    "type": "STRING",
                    "description": "Short expert description of the findings."
                },
                "recommendation": {
                    "type": "STRING",
                    "description": "What the angler should do with the fish."
                }
            },
            "required": ["species", "healthStatus", "diagnostic", "recommendation"]
        }))),
        tools: None,
    }
}

fn proximity_request(at: Coordinate) -> GenerateRequest {
    let prompt = format!(
        "Coordinates: {}, {}. Find the nearest registered fishing ground. \
         Return JSON: {{\"name\": string, \"id\": string}} or {{}} if there is none.",
        at.latitude, at.longitude
    );
    GenerateRequest {
        contents: vec![Content::user(vec![Part::text(&prompt)])],
        generation_config: Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: None,
        }),
        tools: Some(vec![Tool { google_search: json!({}) }]),
    }
}

/// Request body for the generateContent API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self { role: "user", parts }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

impl Part {
    fn text(text: &str) -> Self {
        Part::Text { text: text.to_string() }
    }

    fn inline(bytes: &[u8], mime_type: &str) -> Self {
        Part::Inline {
            inline_data: Blob { mime_type: mime_type.to_string(), data: STANDARD.encode(bytes) },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

impl GenerationConfig {
    fn json(schema: Value) -> Self {
        Self { response_mime_type: "application/json".to_string(), response_schema: Some(schema) }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: Value,
}

/// Response from the generateContent API
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
