use serde::Serialize;

use crate::bm25::TermContribution;
use crate::config::HybridSearchConfig;
use crate::intent::IntentProfile;
use crate::semantic::SemanticAnalysis;

/// Diagnostic report from [`crate::HybridSearchManager::get_search_stats`].
///
/// Meant for tuning and observability; nothing here feeds back into ranking.
#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    /// Active configuration.
    pub config: HybridSearchConfig,
    /// The query as the scorers see it.
    pub query_tokens: Vec<String>,
    /// Intents detected in the query.
    pub intents: IntentProfile,
    /// Candidates left after metadata filtering and the retrieval window.
    pub candidate_count: usize,
    /// Statistics of the BM25 index built over those candidates.
    pub corpus: CorpusStats,
    /// Breakdown for the candidate with the highest BM25 score.
    pub top_document: Option<TopDocumentStats>,
}

/// BM25 corpus statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    /// Indexed documents.
    pub documents: usize,
    /// Average document length in tokens.
    pub avg_doc_length: f64,
    /// Distinct terms.
    pub vocabulary_size: usize,
    /// BM25 `k1`.
    pub k1: f64,
    /// BM25 `b`.
    pub b: f64,
}

/// Score breakdown for one document.
#[derive(Debug, Clone, Serialize)]
pub struct TopDocumentStats {
    /// Document identifier.
    pub doc_id: String,
    /// Chunk identifier.
    pub chunk_id: String,
    /// Position among the candidates.
    pub position: usize,
    /// Total BM25 score.
    pub bm25_score: f64,
    /// Per-term BM25 contributions.
    pub term_contributions: Vec<TermContribution>,
    /// Semantic scorer breakdown.
    pub semantic: SemanticAnalysis,
}
