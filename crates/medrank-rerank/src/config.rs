use std::collections::HashMap;

use medrank_core::{MedrankError, MedrankResult, RerankingMethod};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::filter::FilterValue;
use crate::fusion::FusionWeights;

/// Allowed deviation of the input weight sum from 1.0 before a warning.
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Configuration of a [`crate::HybridSearchManager`].
///
/// Deserializes with every field optional. Values coming from serde are
/// not yet validated; [`HybridSearchConfig::validated`] (run by
/// [`HybridSearchConfig::new`] and by the manager constructor) rejects
/// malformed values and rescales the three weights to sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridSearchConfig {
    /// Reranking strategy.
    #[serde(default)]
    pub method: RerankingMethod,
    /// Weight of the BM25 score.
    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f64,
    /// Weight of the semantic score.
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f64,
    /// Weight of the upstream vector similarity.
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f64,
    /// Candidates considered after metadata filtering.
    #[serde(default = "default_retrieval_window")]
    pub retrieval_window: usize,
    /// Results returned when the caller gives no `top_k`.
    #[serde(default = "default_final_window")]
    pub final_window: usize,
    /// Metadata key -> accepted value(s).
    #[serde(default)]
    pub metadata_filters: HashMap<String, FilterValue>,
    /// Documents with a lower `final_score` are dropped.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,
}

fn default_lexical_weight() -> f64 {
    0.3
}

fn default_semantic_weight() -> f64 {
    0.4
}

fn default_vector_weight() -> f64 {
    0.3
}

fn default_retrieval_window() -> usize {
    20
}

fn default_final_window() -> usize {
    5
}

fn default_score_threshold() -> f64 {
    0.1
}

impl Default for HybridSearchConfig {
    fn default() -> Self {
        Self {
            method: RerankingMethod::default(),
            lexical_weight: default_lexical_weight(),
            semantic_weight: default_semantic_weight(),
            vector_weight: default_vector_weight(),
            retrieval_window: default_retrieval_window(),
            final_window: default_final_window(),
            metadata_filters: HashMap::new(),
            score_threshold: default_score_threshold(),
        }
    }
}

impl HybridSearchConfig {
    /// Create a validated config with the given method and weights and
    /// default windows, threshold and filters.
    pub fn new(
        method: RerankingMethod,
        lexical_weight: f64,
        semantic_weight: f64,
        vector_weight: f64,
    ) -> MedrankResult<Self> {
        Self {
            method,
            lexical_weight,
            semantic_weight,
            vector_weight,
            ..Default::default()
        }
        .validated()
    }

    /// Set the retrieval window. Chainable builder method.
    pub fn with_retrieval_window(mut self, retrieval_window: usize) -> Self {
        self.retrieval_window = retrieval_window;
        self
    }

    /// Set the final window. Chainable builder method.
    pub fn with_final_window(mut self, final_window: usize) -> Self {
        self.final_window = final_window;
        self
    }

    /// Set the score threshold. Chainable builder method.
    pub fn with_score_threshold(mut self, score_threshold: f64) -> Self {
        self.score_threshold = score_threshold;
        self
    }

    /// Add a metadata filter. Chainable builder method.
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.metadata_filters.insert(key.into(), value.into());
        self
    }

    /// Validate and rescale the weights so they sum to 1.0.
    ///
    /// Rejects negative or non-finite weights, an all-zero weight set, a
    /// non-finite threshold and zero-sized windows.
    pub fn validated(mut self) -> MedrankResult<Self> {
        for (name, weight) in [
            ("lexical_weight", self.lexical_weight),
            ("semantic_weight", self.semantic_weight),
            ("vector_weight", self.vector_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(MedrankError::Config(format!(
                    "{name} must be a finite value >= 0, got {weight}"
                )));
            }
        }

        let sum = self.lexical_weight + self.semantic_weight + self.vector_weight;
        if sum <= 0.0 {
            return Err(MedrankError::Config(
                "at least one of lexical_weight, semantic_weight, vector_weight must be > 0"
                    .to_string(),
            ));
        }
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!(
                sum,
                lexical_weight = self.lexical_weight,
                semantic_weight = self.semantic_weight,
                vector_weight = self.vector_weight,
                "Fusion weights do not sum to 1.0; renormalizing"
            );
        }
        self.lexical_weight /= sum;
        self.semantic_weight /= sum;
        self.vector_weight /= sum;

        if !self.score_threshold.is_finite() {
            return Err(MedrankError::Config(format!(
                "score_threshold must be finite, got {}",
                self.score_threshold
            )));
        }
        if self.retrieval_window == 0 {
            return Err(MedrankError::Config(
                "retrieval_window must be > 0".to_string(),
            ));
        }
        if self.final_window == 0 {
            return Err(MedrankError::Config("final_window must be > 0".to_string()));
        }

        Ok(self)
    }

    /// The three fusion weights.
    pub fn weights(&self) -> FusionWeights {
        FusionWeights {
            vector: self.vector_weight,
            lexical: self.lexical_weight,
            semantic: self.semantic_weight,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weight_sum(config: &HybridSearchConfig) -> f64 {
        config.lexical_weight + config.semantic_weight + config.vector_weight
    }

    #[test]
    fn test_defaults() {
        let config = HybridSearchConfig::default();
        assert_eq!(config.method, RerankingMethod::FullHybrid);
        assert_eq!(config.retrieval_window, 20);
        assert_eq!(config.final_window, 5);
        assert_eq!(config.score_threshold, 0.1);
        assert!(config.metadata_filters.is_empty());
        assert!((weight_sum(&config) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_renormalized() {
        let config = HybridSearchConfig::new(RerankingMethod::FullHybrid, 2.0, 1.0, 1.0).unwrap();
        assert!((weight_sum(&config) - 1.0).abs() < 1e-6);
        assert!((config.lexical_weight - 0.5).abs() < 1e-12);
        assert!((config.vector_weight - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_weights_summing_to_one_are_preserved() {
        let config =
            HybridSearchConfig::new(RerankingMethod::VectorLexical, 0.4, 0.0, 0.6).unwrap();
        assert!((config.vector_weight - 0.6).abs() < 1e-12);
        assert!((config.lexical_weight - 0.4).abs() < 1e-12);
        assert_eq!(config.semantic_weight, 0.0);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = HybridSearchConfig::new(RerankingMethod::FullHybrid, -0.1, 0.6, 0.5).unwrap_err();
        assert!(matches!(err, MedrankError::Config(_)));
        assert!(err.to_string().contains("lexical_weight"));
    }

    #[test]
    fn test_nan_and_zero_weights_rejected() {
        assert!(HybridSearchConfig::new(RerankingMethod::FullHybrid, f64::NAN, 0.5, 0.5).is_err());
        assert!(HybridSearchConfig::new(RerankingMethod::FullHybrid, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_zero_windows_rejected() {
        let config = HybridSearchConfig::default().with_final_window(0);
        assert!(config.validated().is_err());
        let config = HybridSearchConfig::default().with_retrieval_window(0);
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let config = HybridSearchConfig::default().with_score_threshold(f64::INFINITY);
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_deserialize_partial_with_filters() {
        let config: HybridSearchConfig = serde_json::from_value(json!({
            "method": "vector_semantic",
            "final_window": 3,
            "metadata_filters": {
                "specialty": ["cardiology", "endocrinology"],
                "language": "en"
            }
        }))
        .unwrap();

        assert_eq!(config.method, RerankingMethod::VectorSemantic);
        assert_eq!(config.final_window, 3);
        assert_eq!(config.retrieval_window, 20);
        assert_eq!(
            config.metadata_filters.get("language"),
            Some(&FilterValue::Exact(json!("en")))
        );
        assert!(matches!(
            config.metadata_filters.get("specialty"),
            Some(FilterValue::AnyOf(values)) if values.len() == 2
        ));
    }

    #[test]
    fn test_weights_accessor() {
        let config = HybridSearchConfig::new(RerankingMethod::FullHybrid, 0.2, 0.3, 0.5).unwrap();
        let weights = config.weights();
        assert!((weights.vector - 0.5).abs() < 1e-12);
        assert!((weights.lexical - 0.2).abs() < 1e-12);
        assert!((weights.semantic - 0.3).abs() < 1e-12);
    }
}
