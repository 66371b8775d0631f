/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the persistence layer, the generation gateway and the UI layer.

use serde::{Deserialize, Serialize};

/// The three ways a piece of art can be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationMode {
    /// Describe a photo of a room, then paint something that fits it
    FromRoom,
    /// Apply a text instruction to an uploaded image
    Edit,
    /// Plain text-to-image
    FromText,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 3] = [Self::FromRoom, Self::Edit, Self::FromText];

    /// Whether this mode needs an uploaded image before it can run
    pub fn requires_source_image(self) -> bool {
        matches!(self, Self::FromRoom | Self::Edit)
    }

    /// Label used on the mode selector
    pub fn label(self) -> &'static str {
        match self {
            Self::FromRoom => "Art for Room",
            Self::Edit => "Edit Image",
            Self::FromText => "From Text",
        }
    }

    /// Label above the prompt field
    pub fn prompt_label(self) -> &'static str {
        match self {
            Self::FromRoom => "2. Describe the art you envision",
            Self::Edit => "2. Describe the edits",
            Self::FromText => "Describe the image to create",
        }
    }

    pub fn prompt_placeholder(self) -> &'static str {
        match self {
            Self::FromRoom => "e.g., 'a serene watercolor landscape'",
            Self::Edit => "e.g., 'add a retro filter and make the sky more dramatic'",
            Self::FromText => "e.g., 'a cyberpunk city street at night, raining'",
        }
    }

    /// Label above the uploader (None for modes without an upload)
    pub fn upload_label(self) -> Option<&'static str> {
        match self {
            Self::FromRoom => Some("1. Upload a photo of your room"),
            Self::Edit => Some("1. Upload an image to edit"),
            Self::FromText => None,
        }
    }
}

/// A single generated artwork
///
/// Records are never mutated after creation. Field names are serialized in
/// camelCase so stored galleries stay readable by other tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkRecord {
    /// Opaque unique identifier
    pub id: String,
    /// Data URI of the uploaded image (room photo or image to edit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
    /// Data URI of the generated art
    pub generated_image: String,
    /// Prompt the user typed
    pub prompt: String,
    pub mode: GenerationMode,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Top-level pages of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Generate,
    Gallery,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Generate => "Generate",
            Self::Gallery => "Gallery",
        }
    }
}
