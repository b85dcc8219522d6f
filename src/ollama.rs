use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

/// Liveness and model inventory of the Ollama daemon.
#[derive(Debug, Clone)]
pub struct OllamaProbe {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaProbe {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, reqwest::Error> {
        let tags: TagsResponse = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(tags.models)
    }

    pub async fn is_available(&self) -> bool {
        match self.list_models().await {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Ollama at {} unreachable: {}", self.base_url, e);
                false
            }
        }
    }
}

/// Matches `name` against pulled models; a bare name matches its `:latest` tag.
pub fn has_model(models: &[ModelInfo], name: &str) -> bool {
    models.iter().any(|m| {
        m.name == name || (!name.contains(':') && m.name == format!("{}:latest", name))
    })
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str) -> ModelInfo {
        ModelInfo {
            name: name.to_string(),
            size: 0,
            modified_at: None,
        }
    }

    #[test]
    fn parses_tags_payload() {
        let raw = r#"{"models":[{"name":"mistral:latest","size":4109865159,"modified_at":"2025-01-01T00:00:00Z","digest":"abc"}]}"#;
        let tags: TagsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(tags.models.len(), 1);
        assert_eq!(tags.models[0].size, 4109865159);
    }

    #[test]
    fn matches_latest_tag() {
        let models = vec![model("mistral:latest"), model("qwen3:8b")];
        assert!(has_model(&models, "mistral"));
        assert!(has_model(&models, "qwen3:8b"));
        assert!(!has_model(&models, "qwen3"));
        assert!(!has_model(&models, "llama3.2:3b"));
    }

    #[test]
    fn human_sizes() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(4_109_865_159), "3.8 GB");
    }

    #[tokio::test]
    async fn unreachable_daemon_is_unavailable() {
        let probe = OllamaProbe::new("http://127.0.0.1:9/");
        assert_eq!(probe.base_url(), "http://127.0.0.1:9");
        assert!(!probe.is_available().await);
    }
}
