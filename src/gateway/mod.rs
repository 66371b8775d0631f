//! Remote generation gateway.
//!
//! [`ImageService`] is the raw transport to a hosted model. [`Gateway`]
//! wraps it with the three user-facing operations and turns every failure
//! into a [`GenerationError`] carrying a fixed, user-safe message. The
//! underlying cause is logged and never shown.

pub mod gemini;
pub mod media;

use async_trait::async_trait;
use std::sync::Arc;

use crate::state::data::GenerationMode;
use self::media::{GeneratedImage, SourceImage};

pub use gemini::GeminiService;

/// Instruction sent with a room photo to get a style description back
pub const ROOM_DESCRIPTION_PROMPT: &str = "Analyze this image of a room. Describe its style, mood, and primary colors in a short, descriptive prompt suitable for an AI image generator. Focus on art styles that would complement the room. For example: 'A vibrant abstract expressionist painting with bold strokes of blue and gold to contrast the room's neutral palette.'";

/// Merge a room's style description with what the user asked for
pub fn combined_room_prompt(style_description: &str, user_prompt: &str) -> String {
    format!(
        "Generate a piece of art based on the following style: {style_description}. \
         The user also requested: \"{user_prompt}\". \
         Combine these ideas into a beautiful, high-resolution digital artwork."
    )
}

/// Failure classes of a service call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The call failed or was rejected
    TransportOrService,
    /// The call succeeded but carried no usable image or text
    EmptyResult,
}

/// Errors raised by an [`ImageService`]
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// API key missing.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The response held no image (or no text).
    #[error("empty result: {0}")]
    EmptyResult(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyResult(_) => ErrorKind::EmptyResult,
            _ => ErrorKind::TransportOrService,
        }
    }
}

/// Raw access to a hosted image model
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Text to exactly one square image
    async fn text_to_image(&self, prompt: &str) -> Result<GeneratedImage, GatewayError>;

    /// Apply an instruction to an image, image-only output
    async fn edit(&self, source: &SourceImage, instruction: &str) -> Result<GeneratedImage, GatewayError>;

    /// Describe an image in text
    async fn describe(&self, source: &SourceImage, instruction: &str) -> Result<String, GatewayError>;
}

/// The user-facing operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GenerateFromText,
    EditImage,
    ArtForRoom,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::GenerateFromText => "Failed to generate image. Please try again.",
            Self::EditImage => "Failed to edit image. Please try again.",
            Self::ArtForRoom => {
                "Failed to generate art for the room. Please try a different image or prompt."
            }
        }
    }
}

/// Normalized gateway failure; `Display` is the message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .operation.failure_message())]
pub struct GenerationError {
    pub operation: Operation,
    pub kind: ErrorKind,
}

/// One generation job, as chosen on the Generate page
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    FromRoom { room: SourceImage, prompt: String },
    Edit { source: SourceImage, prompt: String },
    FromText { prompt: String },
}

impl GenerationRequest {
    pub fn mode(&self) -> GenerationMode {
        match self {
            Self::FromRoom { .. } => GenerationMode::FromRoom,
            Self::Edit { .. } => GenerationMode::Edit,
            Self::FromText { .. } => GenerationMode::FromText,
        }
    }
}

/// The three generation operations over a shared [`ImageService`]
#[derive(Clone)]
pub struct Gateway {
    service: Arc<dyn ImageService>,
}

impl Gateway {
    pub fn new(service: Arc<dyn ImageService>) -> Self {
        Self { service }
    }

    /// Dispatch a request to the matching operation
    pub async fn run(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        match request {
            GenerationRequest::FromRoom { room, prompt } => {
                self.generate_art_for_room(&room, &prompt).await
            }
            GenerationRequest::Edit { source, prompt } => self.edit_image(&source, &prompt).await,
            GenerationRequest::FromText { prompt } => self.generate_image_from_text(&prompt).await,
        }
    }

    /// Text to image, returned as a data URI
    pub async fn generate_image_from_text(&self, prompt: &str) -> Result<String, GenerationError> {
        self.service
            .text_to_image(prompt)
            .await
            .map(|image| image.to_data_uri())
            .map_err(|e| normalize(Operation::GenerateFromText, e))
    }

    /// Image plus instruction to image, returned as a data URI
    pub async fn edit_image(&self, source: &SourceImage, prompt: &str) -> Result<String, GenerationError> {
        self.service
            .edit(source, prompt)
            .await
            .map(|image| image.to_data_uri())
            .map_err(|e| normalize(Operation::EditImage, e))
    }

    /// Describe the room, then paint from the description plus the prompt.
    /// The second call starts only once the description is back.
    pub async fn generate_art_for_room(
        &self,
        room: &SourceImage,
        user_prompt: &str,
    ) -> Result<String, GenerationError> {
        let description = self
            .service
            .describe(room, ROOM_DESCRIPTION_PROMPT)
            .await
            .map_err(|e| normalize(Operation::ArtForRoom, e))?;

        tracing::debug!(%description, "room described");

        let prompt = combined_room_prompt(&description, user_prompt);
        self.generate_image_from_text(&prompt)
            .await
            .map_err(|e| GenerationError {
                operation: Operation::ArtForRoom,
                kind: e.kind,
            })
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

fn normalize(operation: Operation, cause: GatewayError) -> GenerationError {
    tracing::error!(?operation, "❌ Generation failed: {cause}");
    GenerationError {
        operation,
        kind: cause.kind(),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{room_photo, Call, FakeService, Reply};
    use super::*;

    #[tokio::test]
    async fn test_text_to_image_returns_data_uri() {
        let service = FakeService::with_replies([Reply::Image("AAA")]);
        let gateway = Gateway::new(service.clone());

        let uri = gateway
            .generate_image_from_text("a cyberpunk city street")
            .await
            .unwrap();

        assert_eq!(uri, "data:image/png;base64,AAA");
        assert_eq!(service.calls(), vec![Call::TextToImage("a cyberpunk city street".into())]);
    }

    #[tokio::test]
    async fn test_text_to_image_failure_is_normalized() {
        let gateway = Gateway::new(FakeService::with_replies([Reply::Fail]));
        let err = gateway.generate_image_from_text("x").await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to generate image. Please try again.");
        assert_eq!(err.kind, ErrorKind::TransportOrService);
    }

    #[tokio::test]
    async fn test_empty_result_is_classified() {
        let gateway = Gateway::new(FakeService::with_replies([Reply::Empty]));
        let err = gateway.generate_image_from_text("x").await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::EmptyResult);
        assert_eq!(err.to_string(), "Failed to generate image. Please try again.");
    }

    #[tokio::test]
    async fn test_edit_sends_source_and_instruction() {
        let service = FakeService::with_replies([Reply::Image("BBB")]);
        let gateway = Gateway::new(service.clone());

        let uri = gateway.edit_image(&room_photo(), "add a retro filter").await.unwrap();

        assert_eq!(uri, "data:image/png;base64,BBB");
        assert_eq!(
            service.calls(),
            vec![Call::Edit {
                mime_type: "image/jpeg",
                instruction: "add a retro filter".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_edit_failure_message() {
        let gateway = Gateway::new(FakeService::with_replies([Reply::Empty]));
        let err = gateway.edit_image(&room_photo(), "x").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to edit image. Please try again.");
    }

    #[tokio::test]
    async fn test_art_for_room_describes_then_generates() {
        let service = FakeService::with_replies([
            Reply::Text("A calm Scandinavian palette"),
            Reply::Image("CCC"),
        ]);
        let gateway = Gateway::new(service.clone());

        let uri = gateway
            .generate_art_for_room(&room_photo(), "a serene watercolor landscape")
            .await
            .unwrap();

        assert_eq!(uri, "data:image/png;base64,CCC");
        assert_eq!(
            service.calls(),
            vec![
                Call::Describe {
                    mime_type: "image/jpeg",
                    instruction: ROOM_DESCRIPTION_PROMPT.into()
                },
                Call::TextToImage(combined_room_prompt(
                    "A calm Scandinavian palette",
                    "a serene watercolor landscape"
                )),
            ]
        );
    }

    #[tokio::test]
    async fn test_art_for_room_stops_after_failed_description() {
        let service = FakeService::with_replies([Reply::Fail, Reply::Image("never")]);
        let gateway = Gateway::new(service.clone());

        let err = gateway
            .generate_art_for_room(&room_photo(), "x")
            .await
            .unwrap_err();

        assert_eq!(err.operation, Operation::ArtForRoom);
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_art_for_room_reports_its_own_message() {
        let gateway = Gateway::new(FakeService::with_replies([Reply::Text("style"), Reply::Empty]));
        let err = gateway
            .generate_art_for_room(&room_photo(), "x")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to generate art for the room. Please try a different image or prompt."
        );
        assert_eq!(err.kind, ErrorKind::EmptyResult);
    }

    #[tokio::test]
    async fn test_run_dispatches_by_mode() {
        let service = FakeService::with_replies([Reply::Image("DDD")]);
        let gateway = Gateway::new(service.clone());

        let request = GenerationRequest::Edit {
            source: room_photo(),
            prompt: "sepia".into(),
        };
        assert_eq!(request.mode(), GenerationMode::Edit);

        gateway.run(request).await.unwrap();
        assert!(matches!(service.calls()[0], Call::Edit { .. }));
    }

    #[test]
    fn test_combined_room_prompt_template() {
        assert_eq!(
            combined_room_prompt("Bold blue strokes", "a cat"),
            "Generate a piece of art based on the following style: Bold blue strokes. \
             The user also requested: \"a cat\". \
             Combine these ideas into a beautiful, high-resolution digital artwork."
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            GatewayError::EmptyResult("none".into()).kind(),
            ErrorKind::EmptyResult
        );
        assert_eq!(
            GatewayError::Auth("no key".into()).kind(),
            ErrorKind::TransportOrService
        );
    }
}
