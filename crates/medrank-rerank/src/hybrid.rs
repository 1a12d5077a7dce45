use medrank_core::{Document, MedrankError, MedrankResult};
use parking_lot::RwLock;
use tracing::debug;

use crate::bm25::{LexicalIndex, DEFAULT_B, DEFAULT_K1};
use crate::config::HybridSearchConfig;
use crate::filter::apply_filters;
use crate::fusion::ScoreFuser;
use crate::intent::extract_query_intent;
use crate::semantic::SemanticScorer;
use crate::stats::{CorpusStats, SearchStats, TopDocumentStats};
use crate::tokenizer::tokenize;

/// Hybrid reranker that composes the upstream vector similarity with BM25
/// and semantic scoring.
///
/// Every [`HybridSearchManager::hybrid_search`] call runs the whole pipeline
/// synchronously:
///
/// ```text
/// metadata filter -> retrieval window -> BM25 / semantic scoring
///   -> score fusion -> threshold -> final window
/// ```
///
/// The manager owns one [`LexicalIndex`]. Rebuilding and scoring it happen
/// under a write lock, so concurrent searches on a shared manager serialize
/// on the lexical stage instead of corrupting the corpus statistics.
pub struct HybridSearchManager {
    config: HybridSearchConfig,
    lexical: RwLock<LexicalIndex>,
    semantic: SemanticScorer,
    fuser: ScoreFuser,
}

impl HybridSearchManager {
    /// Create a manager with default BM25 parameters.
    ///
    /// Fails with [`MedrankError::Config`] when the config is malformed.
    pub fn new(config: HybridSearchConfig) -> MedrankResult<Self> {
        Self::with_bm25_params(config, DEFAULT_K1, DEFAULT_B)
    }

    /// Create a manager with custom BM25 `k1` and `b`.
    pub fn with_bm25_params(config: HybridSearchConfig, k1: f64, b: f64) -> MedrankResult<Self> {
        if !k1.is_finite() || k1 < 0.0 {
            return Err(MedrankError::Config(format!(
                "bm25 k1 must be a finite value >= 0, got {k1}"
            )));
        }
        if !(0.0..=1.0).contains(&b) {
            return Err(MedrankError::Config(format!(
                "bm25 b must be within 0..=1, got {b}"
            )));
        }

        let config = config.validated()?;
        let fuser = ScoreFuser::new(config.method, config.weights());
        Ok(Self {
            config,
            lexical: RwLock::new(LexicalIndex::with_params(k1, b)),
            semantic: SemanticScorer::new(),
            fuser,
        })
    }

    /// The validated, renormalized configuration.
    pub fn config(&self) -> &HybridSearchConfig {
        &self.config
    }

    /// Rebuild the lexical index over `documents`.
    ///
    /// `hybrid_search` rebuilds on its own whenever the candidate set
    /// differs from the indexed one; calling this ahead of time only moves
    /// the cost.
    pub fn build_index(&self, documents: &[Document]) {
        let contents: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        self.lexical.write().build_index(contents.as_slice());
    }

    /// Rerank `documents` for `query`.
    ///
    /// `documents` should arrive sorted by vector similarity; the retrieval
    /// window keeps the first `retrieval_window` of those passing the
    /// metadata filters. Methods with a semantic stage also drop documents
    /// whose `semantic_score` is below the semantic scorer's threshold.
    /// Returns at most `top_k` (or `final_window`) documents with
    /// `final_score >= score_threshold`, sorted by `final_score` descending
    /// with ties in input order.
    pub fn hybrid_search(
        &self,
        query: &str,
        documents: Vec<Document>,
        top_k: Option<usize>,
    ) -> Vec<Document> {
        let received = documents.len();
        let mut candidates = self.candidates(documents);
        debug!(
            received,
            candidates = candidates.len(),
            method = %self.config.method,
            "Candidates selected"
        );

        if candidates.is_empty() {
            return candidates;
        }

        self.score_candidates(query, &mut candidates);

        let threshold = self.config.score_threshold;
        candidates.retain(|d| d.final_or_min() >= threshold);

        candidates.sort_by(|a, b| {
            b.final_or_min()
                .partial_cmp(&a.final_or_min())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(top_k.unwrap_or(self.config.final_window));

        debug!(returned = candidates.len(), threshold, "Hybrid search complete");
        candidates
    }

    /// Explain how `query` would be scored against `documents`.
    ///
    /// Read-only: a scratch index is built over the candidates, so the
    /// manager's own index is left untouched.
    pub fn get_search_stats(&self, query: &str, documents: &[Document]) -> SearchStats {
        let candidates = self.candidates(documents.to_vec());
        let (k1, b) = self.lexical.read().params();

        let mut scratch = LexicalIndex::with_params(k1, b);
        let contents: Vec<&str> = candidates.iter().map(|d| d.content.as_str()).collect();
        scratch.build_index(contents.as_slice());

        let query_tokens = tokenize(query);
        let mut top: Option<(usize, f64)> = None;
        for idx in 0..candidates.len() {
            let score = scratch.score(&query_tokens, idx);
            if !matches!(top, Some((_, best)) if score <= best) {
                top = Some((idx, score));
            }
        }

        let top_document = top.map(|(position, bm25_score)| {
            let doc = &candidates[position];
            TopDocumentStats {
                doc_id: doc.doc_id.clone(),
                chunk_id: doc.chunk_id.clone(),
                position,
                bm25_score,
                term_contributions: scratch.term_contributions(&query_tokens, position),
                semantic: self.semantic.analyze(query, &doc.content),
            }
        });

        SearchStats {
            config: self.config.clone(),
            intents: extract_query_intent(query),
            query_tokens,
            candidate_count: candidates.len(),
            corpus: CorpusStats {
                documents: scratch.document_count(),
                avg_doc_length: scratch.avg_doc_length(),
                vocabulary_size: scratch.vocabulary_size(),
                k1,
                b,
            },
            top_document,
        }
    }

    /// Metadata filtering followed by the retrieval window.
    fn candidates(&self, documents: Vec<Document>) -> Vec<Document> {
        let mut filtered = apply_filters(documents, &self.config.metadata_filters);
        filtered.truncate(self.config.retrieval_window);
        filtered
    }

    /// Run the scorers the configured method needs, then fuse.
    ///
    /// The semantic stage drops candidates below the scorer's threshold
    /// before fusion, keeping the survivors in input order.
    fn score_candidates(&self, query: &str, candidates: &mut Vec<Document>) {
        let method = self.config.method;
        if method.uses_lexical() {
            let mut index = self.lexical.write();
            let rebuilt = index.ensure_index(candidates);
            index.annotate(query, candidates);
            debug!(rebuilt, documents = candidates.len(), "Lexical scoring done");
        }
        if method.uses_semantic() {
            self.semantic.annotate(query, candidates);

            let threshold = self.semantic.threshold();
            let before = candidates.len();
            candidates.retain(|d| d.semantic_score.is_some_and(|s| s >= threshold));
            debug!(
                kept = candidates.len(),
                dropped = before - candidates.len(),
                threshold,
                "Semantic scoring done"
            );
        }
        self.fuser.apply(candidates);
    }
}
