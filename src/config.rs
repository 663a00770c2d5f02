use anyhow::{Context, Result};
use std::env;

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Process-wide configuration, resolved once at startup and passed down
/// explicitly. A missing credential fails here, not at call time.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let gemini_api_key = env::var("GOOGLE_API_KEY")
            .context("GOOGLE_API_KEY must be set in the environment or .env file")?;

        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            gemini_api_key,
            gemini_model,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env() {
        // Both cases in one test; env vars are process-global.
        std::env::remove_var("GOOGLE_API_KEY");
        assert!(AppConfig::from_env().is_err());

        std::env::set_var("GOOGLE_API_KEY", "test_key");
        std::env::remove_var("GEMINI_MODEL");
        std::env::remove_var("BIND_ADDR");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.gemini_api_key, "test_key");
        assert_eq!(config.gemini_model, DEFAULT_MODEL);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }
}
