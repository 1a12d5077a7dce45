use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::RerankingMethod;

/// Which single-scorer fusion produced a document's `combined_score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingTag {
    /// BM25 blended with the upstream vector score.
    HybridVectorBm25,
    /// BM25 alone; the document carried no vector score.
    Bm25Only,
    /// Semantic score blended with the upstream vector score.
    HybridVectorSemantic,
    /// Semantic score blended with a previously computed BM25 score.
    HybridLexicalSemantic,
    /// Semantic score alone.
    SemanticOnly,
}

/// A candidate chunk handed over by the upstream vector search.
///
/// The retriever fills `doc_id`, `chunk_id`, `content`, `vector_score` and
/// `metadata`. Everything else is attached by the reranking pipeline and is
/// `None` until the corresponding stage has run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier of the source document.
    pub doc_id: String,
    /// Identifier of this chunk within the source document.
    #[serde(default)]
    pub chunk_id: String,
    /// Chunk text.
    pub content: String,
    /// Similarity from the nearest-neighbor search, usually in `0..=1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_score: Option<f64>,
    /// Arbitrary key/value metadata used by metadata filters.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// BM25 score against the current query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexical_score: Option<f64>,
    /// Semantic scorer output in `0..=1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f64>,
    /// Score produced by a standalone scorer's own fusion rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_score: Option<f64>,
    /// Score produced by the hybrid orchestrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    /// Tag set alongside `combined_score`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_method: Option<RankingTag>,
    /// Strategy the orchestrator applied to produce `final_score`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reranking_method: Option<RerankingMethod>,
}

impl Document {
    /// Creates a document with the given identifiers and content and no scores.
    pub fn new(
        doc_id: impl Into<String>,
        chunk_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            chunk_id: chunk_id.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Sets the upstream vector similarity. Chainable builder method.
    pub fn with_vector_score(mut self, score: f64) -> Self {
        self.vector_score = Some(score);
        self
    }

    /// Adds a metadata entry. Chainable builder method.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// `combined_score`, or negative infinity when unset, for sorting.
    pub fn combined_or_min(&self) -> f64 {
        self.combined_score.unwrap_or(f64::NEG_INFINITY)
    }

    /// `final_score`, or negative infinity when unset, for sorting.
    pub fn final_or_min(&self) -> f64 {
        self.final_score.unwrap_or(f64::NEG_INFINITY)
    }
}
