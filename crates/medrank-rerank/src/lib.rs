//! Hybrid reranking of retrieved medical documents.
//!
//! Takes candidates already ranked by vector similarity and reorders them
//! by combining that similarity with BM25 keyword relevance and a
//! rule-based medical semantic score.
//!
//! # Main types
//!
//! - [`HybridSearchManager`] — Filter, score, fuse, threshold and truncate in one call.
//! - [`HybridSearchConfig`] — Method, fusion weights, windows, filters and threshold.
//! - [`LexicalIndex`] — BM25 index over the current candidate set.
//! - [`SemanticScorer`] — Term-weight, synonym and intent based relevance in `0..=1`.
//! - [`ScoreFuser`] — Linear combination of the score sources per method.
//! - [`SearchStats`] — Diagnostic breakdown of how a query would be scored.

/// BM25 index and lexical reranking.
pub mod bm25;
/// Hybrid search configuration.
pub mod config;
/// Metadata filters.
pub mod filter;
/// Score fusion per reranking method.
pub mod fusion;
/// The hybrid search orchestrator.
pub mod hybrid;
/// Query intent detection.
pub mod intent;
/// Rule-based semantic scoring.
pub mod semantic;
/// Search diagnostics.
pub mod stats;
/// Text tokenization shared by all scorers.
pub mod tokenizer;
/// Medical term weights and relations.
pub mod vocabulary;

pub use bm25::{LexicalIndex, TermContribution};
pub use config::HybridSearchConfig;
pub use filter::FilterValue;
pub use fusion::{FusionWeights, ScoreFuser};
pub use hybrid::HybridSearchManager;
pub use intent::{extract_query_intent, IntentProfile, QueryIntent};
pub use semantic::{RelatedMatch, SemanticAnalysis, SemanticScorer};
pub use stats::{CorpusStats, SearchStats, TopDocumentStats};
pub use tokenizer::tokenize;
