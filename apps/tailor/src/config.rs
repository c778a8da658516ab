use anyhow::Result;

pub const DEFAULT_TEX_ENGINE: &str = "pdflatex";

/// Runtime configuration loaded from environment variables (and `.env`).
///
/// The API key is optional here: the gateway reports its absence as a
/// configuration failure when it is actually needed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub tex_engine: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            tex_engine: optional_env("TAILOR_TEX_ENGINE")
                .unwrap_or_else(|| DEFAULT_TEX_ENGINE.to_string()),
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Reads an env var, treating empty or whitespace-only values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
