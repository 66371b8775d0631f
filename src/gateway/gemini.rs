//! Gemini / Imagen transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::media::{GeneratedImage, SourceImage};
use super::{GatewayError, ImageService};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash";

/// Builder for GeminiService.
#[derive(Debug, Clone)]
pub struct GeminiServiceBuilder {
    api_key: Option<String>,
    api_base: String,
    text_model: String,
    edit_model: String,
    vision_model: String,
}

impl Default for GeminiServiceBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            edit_model: DEFAULT_EDIT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
        }
    }
}

impl GeminiServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Model used for text-to-image
    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Model used for image editing
    pub fn edit_model(mut self, model: impl Into<String>) -> Self {
        self.edit_model = model.into();
        self
    }

    /// Model used to describe room photos
    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    /// Builds the service. Fails without an API key.
    pub fn build(self) -> Result<GeminiService, GatewayError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GatewayError::Auth("GEMINI_API_KEY (or API_KEY) is not set".into())
            })?;

        Ok(GeminiService {
            client: reqwest::Client::new(),
            api_key,
            api_base: self.api_base.trim_end_matches('/').to_string(),
            text_model: self.text_model,
            edit_model: self.edit_model,
            vision_model: self.vision_model,
        })
    }
}

/// Hosted Gemini / Imagen models over HTTPS.
pub struct GeminiService {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    text_model: String,
    edit_model: String,
    vision_model: String,
}

impl GeminiService {
    pub fn builder() -> GeminiServiceBuilder {
        GeminiServiceBuilder::new()
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.api_base, model, method)
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<R, GatewayError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text));
        }

        Ok(response.json().await?)
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &ContentRequest,
    ) -> Result<ContentResponse, GatewayError> {
        let response: ContentResponse = self
            .post(&self.model_url(model, "generateContent"), request)
            .await?;

        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_ref())
        {
            return Err(GatewayError::ContentBlocked(format!("Prompt blocked: {reason}")));
        }

        Ok(response)
    }
}

#[async_trait]
impl ImageService for GeminiService {
    async fn text_to_image(&self, prompt: &str) -> Result<GeneratedImage, GatewayError> {
        let start = Instant::now();

        let body = PredictRequest::single_square_png(prompt);
        let response: PredictResponse = self
            .post(&self.model_url(&self.text_model, "predict"), &body)
            .await?;

        let image = response.into_image()?;

        tracing::info!(
            model = %self.text_model,
            duration_ms = start.elapsed().as_millis() as u64,
            "🎨 Generated image from text"
        );
        Ok(image)
    }

    async fn edit(&self, source: &SourceImage, instruction: &str) -> Result<GeneratedImage, GatewayError> {
        let start = Instant::now();

        let body = ContentRequest::with_image(source, instruction, Some(vec!["IMAGE".to_string()]));
        let image = self
            .generate_content(&self.edit_model, &body)
            .await?
            .into_image()?;

        tracing::info!(
            model = %self.edit_model,
            duration_ms = start.elapsed().as_millis() as u64,
            "🖌️  Edited image"
        );
        Ok(image)
    }

    async fn describe(&self, source: &SourceImage, instruction: &str) -> Result<String, GatewayError> {
        let body = ContentRequest::with_image(source, instruction, None);
        self.generate_content(&self.vision_model, &body)
            .await?
            .into_text()
    }
}

fn parse_error(status: u16, text: &str) -> GatewayError {
    // Prefer the service's own message over the raw body
    let message = serde_json::from_str::<ErrorEnvelope>(text)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| text.chars().take(500).collect());

    match status {
        401 | 403 => GatewayError::Auth(message),
        _ => {
            let lower = message.to_lowercase();
            if lower.contains("safety") || lower.contains("blocked") {
                GatewayError::ContentBlocked(message)
            } else {
                GatewayError::Api { status, message }
            }
        }
    }
}

// Imagen `predict` request/response types
#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: &'static str,
    output_options: OutputOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: &'static str,
}

impl PredictRequest {
    fn single_square_png(prompt: &str) -> Self {
        Self {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "1:1",
                output_options: OutputOptions {
                    mime_type: "image/png",
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

impl PredictResponse {
    fn into_image(self) -> Result<GeneratedImage, GatewayError> {
        self.predictions
            .into_iter()
            .find_map(|p| {
                let base64 = p.bytes_base64_encoded.filter(|data| !data.is_empty())?;
                Some(GeneratedImage {
                    mime_type: p.mime_type.unwrap_or_else(|| "image/png".to_string()),
                    base64,
                })
            })
            .ok_or_else(|| GatewayError::EmptyResult("No image was generated.".into()))
    }
}

// generateContent request/response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

/// A part in a request - text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

impl ContentRequest {
    /// Image first, then the instruction
    fn with_image(source: &SourceImage, instruction: &str, modalities: Option<Vec<String>>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: source.mime_type.to_string(),
                            data: source.to_base64(),
                        },
                    },
                    RequestPart::Text {
                        text: instruction.to_string(),
                    },
                ],
            }],
            generation_config: modalities.map(|response_modalities| GenerationConfig {
                response_modalities,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl ContentResponse {
    fn first_parts(self) -> Vec<ResponsePart> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default()
    }

    /// First inline image of the first candidate
    fn into_image(self) -> Result<GeneratedImage, GatewayError> {
        self.first_parts()
            .into_iter()
            .find_map(|part| part.inline_data.filter(|inline| !inline.data.is_empty()))
            .map(|inline| GeneratedImage {
                mime_type: inline.mime_type,
                base64: inline.data,
            })
            .ok_or_else(|| GatewayError::EmptyResult("No edited image was returned.".into()))
    }

    /// All text parts of the first candidate, joined
    fn into_text(self) -> Result<String, GatewayError> {
        let text: String = self
            .first_parts()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(GatewayError::EmptyResult("No description was returned.".into()));
        }
        Ok(text.trim().to_string())
    }
}
