use std::env;

const DEFAULT_SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";
const DEFAULT_EXTRACTION_MODEL: &str = "google/flan-t5-base";

/// Process configuration, read from the environment once at startup and
/// passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_articles_path: String,
    pub interval_minutes: u64,
    pub extract_content: bool,
    pub sentiment_model: String,
    pub extraction_model: String,
    pub hf_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env_or("API_BASE_URL", "http://localhost:5000"),
            api_articles_path: env_or("API_ARTICLES_ENDPOINT", "/api/articles"),
            interval_minutes: env::var("SCRAPE_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            extract_content: is_enabled(env::var("SCRAPE_EXTRACT_CONTENT").ok().as_deref()),
            sentiment_model: env_or("HF_SENTIMENT_MODEL", DEFAULT_SENTIMENT_MODEL),
            extraction_model: env_or("HF_EXTRACTION_MODEL", DEFAULT_EXTRACTION_MODEL),
            hf_token: ["HF_TOKEN", "HUGGINGFACEHUB_API_TOKEN", "HF_API_TOKEN"]
                .iter()
                .find_map(|name| env::var(name).ok().filter(|v| !v.is_empty())),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Unset enables; only an explicit 0/false/no (any case) disables.
fn is_enabled(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_disables_only_on_explicit_negatives() {
        assert!(is_enabled(None));
        assert!(is_enabled(Some("1")));
        assert!(is_enabled(Some("yes")));
        assert!(is_enabled(Some("anything")));
        assert!(!is_enabled(Some("0")));
        assert!(!is_enabled(Some("false")));
        assert!(!is_enabled(Some("FALSE")));
        assert!(!is_enabled(Some("no")));
        assert!(!is_enabled(Some(" No ")));
    }
}
