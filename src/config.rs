/// Runtime configuration
///
/// Values come from the process environment, optionally seeded from a
/// `.env` file in the working directory.

use std::path::PathBuf;

use crate::gateway::gemini::{
    DEFAULT_API_BASE, DEFAULT_EDIT_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL,
};
use crate::state::session::LoginConfig;

const DEFAULT_CLIENT_ID: &str = "778757358530314";
const DEFAULT_REDIRECT_URI: &str = "artvibe://oauth/callback";

/// Everything the application reads from its environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Generation service credential
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: String,
    pub edit_model: String,
    pub vision_model: String,
    /// Directory holding the store file
    pub data_dir: PathBuf,
    pub login: LoginConfig,
}

impl Config {
    /// Load `.env` (if any) and read the process environment
    pub fn from_env() -> Self {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Self {
            api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            api_base: get_or("ARTVIBE_API_BASE", DEFAULT_API_BASE),
            text_model: get_or("ARTVIBE_TEXT_MODEL", DEFAULT_TEXT_MODEL),
            edit_model: get_or("ARTVIBE_EDIT_MODEL", DEFAULT_EDIT_MODEL),
            vision_model: get_or("ARTVIBE_VISION_MODEL", DEFAULT_VISION_MODEL),
            data_dir: get("ARTVIBE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            login: LoginConfig {
                client_id: get_or("ARTVIBE_INSTAGRAM_CLIENT_ID", DEFAULT_CLIENT_ID),
                redirect_uri: get_or("ARTVIBE_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            },
        }
    }
}

/// Per-user data directory, falling back to the home directory and then
/// the working directory
fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    path.push("artvibe");
    path
}
