use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::MedrankError;

/// The hybrid reranking strategy applied by the orchestrator.
///
/// Each variant decides which scorers run and which configured weights feed
/// the final score. Every fusion site matches on this enum exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerankingMethod {
    /// BM25 only; `final_score = lexical_score`.
    LexicalOnly,
    /// Semantic scorer only; `final_score = semantic_score`.
    SemanticOnly,
    /// BM25 then semantic, fused with the lexical and semantic weights.
    LexicalSemantic,
    /// Upstream vector similarity fused with BM25.
    VectorLexical,
    /// Upstream vector similarity fused with the semantic score.
    VectorSemantic,
    /// All three signals.
    #[default]
    FullHybrid,
}

impl RerankingMethod {
    /// All variants, in declaration order.
    pub const ALL: [RerankingMethod; 6] = [
        RerankingMethod::LexicalOnly,
        RerankingMethod::SemanticOnly,
        RerankingMethod::LexicalSemantic,
        RerankingMethod::VectorLexical,
        RerankingMethod::VectorSemantic,
        RerankingMethod::FullHybrid,
    ];

    /// Whether this method needs BM25 scores.
    pub fn uses_lexical(self) -> bool {
        match self {
            RerankingMethod::LexicalOnly
            | RerankingMethod::LexicalSemantic
            | RerankingMethod::VectorLexical
            | RerankingMethod::FullHybrid => true,
            RerankingMethod::SemanticOnly | RerankingMethod::VectorSemantic => false,
        }
    }

    /// Whether this method needs semantic scores.
    pub fn uses_semantic(self) -> bool {
        match self {
            RerankingMethod::SemanticOnly
            | RerankingMethod::LexicalSemantic
            | RerankingMethod::VectorSemantic
            | RerankingMethod::FullHybrid => true,
            RerankingMethod::LexicalOnly | RerankingMethod::VectorLexical => false,
        }
    }

    /// Whether this method reads the upstream vector score.
    pub fn uses_vector(self) -> bool {
        match self {
            RerankingMethod::VectorLexical
            | RerankingMethod::VectorSemantic
            | RerankingMethod::FullHybrid => true,
            RerankingMethod::LexicalOnly
            | RerankingMethod::SemanticOnly
            | RerankingMethod::LexicalSemantic => false,
        }
    }

    /// The snake_case name used in configuration files and on the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            RerankingMethod::LexicalOnly => "lexical_only",
            RerankingMethod::SemanticOnly => "semantic_only",
            RerankingMethod::LexicalSemantic => "lexical_semantic",
            RerankingMethod::VectorLexical => "vector_lexical",
            RerankingMethod::VectorSemantic => "vector_semantic",
            RerankingMethod::FullHybrid => "full_hybrid",
        }
    }
}

impl fmt::Display for RerankingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RerankingMethod {
    type Err = MedrankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        RerankingMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| MedrankError::Config(format!("Unknown reranking method: {s}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_snake_and_kebab_case() {
        assert_eq!(
            "full_hybrid".parse::<RerankingMethod>().unwrap(),
            RerankingMethod::FullHybrid
        );
        assert_eq!(
            "Vector-Lexical".parse::<RerankingMethod>().unwrap(),
            RerankingMethod::VectorLexical
        );
        assert!("cross_encoder".parse::<RerankingMethod>().is_err());
    }

    #[test]
    fn test_display_matches_serde_name() {
        for method in RerankingMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{method}\""));
        }
    }

    #[test]
    fn test_scorer_usage_table() {
        assert!(RerankingMethod::FullHybrid.uses_lexical());
        assert!(RerankingMethod::FullHybrid.uses_semantic());
        assert!(RerankingMethod::FullHybrid.uses_vector());
        assert!(!RerankingMethod::LexicalOnly.uses_semantic());
        assert!(!RerankingMethod::SemanticOnly.uses_lexical());
        assert!(!RerankingMethod::LexicalSemantic.uses_vector());
        assert!(RerankingMethod::VectorSemantic.uses_vector());
    }

    #[test]
    fn test_default_is_full_hybrid() {
        assert_eq!(RerankingMethod::default(), RerankingMethod::FullHybrid);
    }
}
