use std::path::Path;

use anyhow::Context;
use medrank_core::MedrankError;
use medrank_rerank::bm25::{DEFAULT_B, DEFAULT_K1};
use medrank_rerank::HybridSearchConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Contents of `medrank.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedrankConfig {
    #[serde(default)]
    pub search: HybridSearchConfig,
    #[serde(default)]
    pub bm25: Bm25Config,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bm25Config {
    #[serde(default = "default_k1")]
    pub k1: f64,
    #[serde(default = "default_b")]
    pub b: f64,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self {
            k1: default_k1(),
            b: default_b(),
        }
    }
}

fn default_k1() -> f64 {
    DEFAULT_K1
}
fn default_b() -> f64 {
    DEFAULT_B
}

/// Load the config file, falling back to defaults when it does not exist.
///
/// Any other failure to inspect or read the path is an error.
pub async fn load_config(path: &Path) -> anyhow::Result<MedrankConfig> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(MedrankError::from)
        .with_context(|| format!("Failed to inspect config file '{}'", path.display()))?;
    if !exists {
        info!(path = %path.display(), "Config file not found, using defaults");
        return Ok(MedrankConfig::default());
    }

    let config_str = tokio::fs::read_to_string(path)
        .await
        .map_err(MedrankError::from)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    let config: MedrankConfig = toml::from_str(&config_str)
        .map_err(|e| anyhow::anyhow!("Invalid config file '{}': {}", path.display(), e))?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use medrank_core::RerankingMethod;
    use medrank_rerank::FilterValue;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("absent.toml")).await.unwrap();
        assert_eq!(config, MedrankConfig::default());
        assert_eq!(config.bm25.k1, 1.2);
        assert_eq!(config.search.final_window, 5);
    }

    #[tokio::test]
    async fn test_full_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("medrank.toml");
        tokio::fs::write(
            &path,
            r#"
[search]
method = "vector_semantic"
vector_weight = 0.5
semantic_weight = 0.5
lexical_weight = 0.0
final_window = 3
score_threshold = 0.2

[search.metadata_filters]
specialty = ["cardiology", "endocrinology"]
language = "en"

[bm25]
k1 = 1.5
"#,
        )
        .await
        .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.search.method, RerankingMethod::VectorSemantic);
        assert_eq!(config.search.final_window, 3);
        assert_eq!(config.search.retrieval_window, 20);
        assert_eq!(config.search.score_threshold, 0.2);
        assert_eq!(
            config.search.metadata_filters.get("language"),
            Some(&FilterValue::Exact(json!("en")))
        );
        assert_eq!(config.bm25.k1, 1.5);
        assert_eq!(config.bm25.b, 0.75);
    }

    #[tokio::test]
    async fn test_invalid_toml_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("medrank.toml");
        tokio::fs::write(&path, "[search]\nmethod = \"best_effort\"\n")
            .await
            .unwrap();

        let err = load_config(&path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[tokio::test]
    async fn test_uninspectable_path_is_an_error_not_defaults() {
        let tmp = TempDir::new().unwrap();
        let not_a_dir = tmp.path().join("plain-file");
        tokio::fs::write(&not_a_dir, "x").await.unwrap();

        let err = load_config(&not_a_dir.join("medrank.toml")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to inspect config file"));
        assert!(matches!(
            err.downcast_ref::<MedrankError>(),
            Some(MedrankError::Io(_))
        ));
    }

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let rendered = toml::to_string(&MedrankConfig::default()).unwrap();
        let parsed: MedrankConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, MedrankConfig::default());
    }
}
