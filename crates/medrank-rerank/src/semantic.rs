use std::collections::HashSet;

use medrank_core::{Document, RankingTag};
use serde::Serialize;
use tracing::debug;

use crate::intent::{extract_query_intent, IntentProfile};
use crate::tokenizer::tokenize;
use crate::vocabulary::{find_related, term_weight};

/// Fraction of a term's weight awarded when only a related term matches.
const RELATED_CREDIT: f64 = 0.5;
/// Maximum boost an exact match gets per matching intent category.
const INTENT_TERM_BOOST: f64 = 0.1;
/// Additive boost per unit of total intent weight.
const INTENT_SCORE_BOOST: f64 = 0.05;

/// Weights of the lexical/semantic blend used when no vector score exists.
const RERANK_LEXICAL_WEIGHT: f64 = 0.3;
const RERANK_SEMANTIC_WEIGHT: f64 = 0.7;

/// A query term that matched through a synonym or shared prefix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedMatch {
    /// Term from the query.
    pub query_term: String,
    /// Related term found in the document.
    pub document_term: String,
}

/// Full breakdown of a semantic score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticAnalysis {
    /// Intents detected in the query.
    pub intents: IntentProfile,
    /// Query terms found verbatim in the document.
    pub exact_matches: Vec<String>,
    /// Query terms credited through a related document term.
    pub related_matches: Vec<RelatedMatch>,
    /// Query terms with no credit.
    pub unmatched: Vec<String>,
    /// Share of query terms with any credit.
    pub coverage: f64,
    /// Accumulated weight before normalization.
    pub raw_score: f64,
    /// Sum of all query term weights.
    pub max_score: f64,
    /// Additive intent boost applied after normalization.
    pub intent_boost: f64,
    /// Final score in `0..=1`.
    pub score: f64,
}

/// Rule-based stand-in for a cross-encoder.
///
/// Scores query/document relevance from medical term weights, curated term
/// relations and the query's detected intent. The output is always in
/// `0..=1`.
#[derive(Debug, Clone)]
pub struct SemanticScorer {
    /// Documents with a lower `semantic_score` are dropped by
    /// [`SemanticScorer::rerank`].
    threshold: f64,
    weight_vector: f64,
    weight_semantic: f64,
}

impl SemanticScorer {
    /// Create a scorer with threshold 0.1 and a 0.3 vector / 0.7 semantic blend.
    pub fn new() -> Self {
        Self {
            threshold: 0.1,
            weight_vector: 0.3,
            weight_semantic: 0.7,
        }
    }

    /// Set the minimum semantic score kept by `rerank`. Chainable builder method.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the vector/semantic blend used by `rerank`. Chainable builder method.
    pub fn with_weights(mut self, weight_vector: f64, weight_semantic: f64) -> Self {
        self.weight_vector = weight_vector;
        self.weight_semantic = weight_semantic;
        self
    }

    /// The minimum semantic score kept by `rerank`.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Relevance of `text` to `query`, in `0..=1`.
    pub fn score(&self, query: &str, text: &str) -> f64 {
        self.analyze(query, text).score
    }

    /// Score `text` against `query` and report how the score was reached.
    ///
    /// Exact matches earn the term's weight, boosted by up to 10% for every
    /// detected intent whose vocabulary covers the term. Misses earn half the
    /// weight when a related term is present. The sum is normalized by the
    /// total query weight, then `0.05 * sum(intent weights)` is added and the
    /// result is clamped to `0..=1`.
    pub fn analyze(&self, query: &str, text: &str) -> SemanticAnalysis {
        let query_terms = tokenize(query);
        let document_terms: HashSet<String> = tokenize(text).into_iter().collect();
        let intents = extract_query_intent(query);

        let mut exact_matches = Vec::new();
        let mut related_matches = Vec::new();
        let mut unmatched = Vec::new();
        let mut raw_score = 0.0;
        let mut max_score = 0.0;

        for term in &query_terms {
            let weight = term_weight(term);
            max_score += weight;

            if document_terms.contains(term) {
                let boost: f64 = intents
                    .iter()
                    .filter(|(intent, _)| intent.matches_term(term))
                    .map(|(_, w)| 1.0 + INTENT_TERM_BOOST * w.min(1.0))
                    .product();
                raw_score += weight * boost;
                exact_matches.push(term.clone());
            } else if let Some(related) = find_related(term, &document_terms) {
                raw_score += RELATED_CREDIT * weight;
                related_matches.push(RelatedMatch {
                    query_term: term.clone(),
                    document_term: related.to_string(),
                });
            } else {
                unmatched.push(term.clone());
            }
        }

        let normalized = if max_score > 0.0 {
            raw_score / max_score
        } else {
            0.0
        };
        let intent_boost = INTENT_SCORE_BOOST * intents.values().sum::<f64>();
        let score = if query_terms.is_empty() {
            0.0
        } else {
            (normalized + intent_boost).clamp(0.0, 1.0)
        };
        let coverage = if query_terms.is_empty() {
            0.0
        } else {
            (exact_matches.len() + related_matches.len()) as f64 / query_terms.len() as f64
        };

        SemanticAnalysis {
            intents,
            exact_matches,
            related_matches,
            unmatched,
            coverage,
            raw_score,
            max_score,
            intent_boost,
            score,
        }
    }

    /// Attach semantic scores to `documents` in place, without filtering or
    /// reordering.
    ///
    /// `combined_score` blends with the vector score when present, otherwise
    /// with a previously attached lexical score (fixed 0.3/0.7), otherwise it
    /// is the semantic score itself.
    pub fn annotate(&self, query: &str, documents: &mut [Document]) {
        for doc in documents {
            let semantic = self.score(query, &doc.content);
            doc.semantic_score = Some(semantic);

            let (combined, tag) = match (doc.vector_score, doc.lexical_score) {
                (Some(vector), _) => (
                    self.weight_vector * vector + self.weight_semantic * semantic,
                    RankingTag::HybridVectorSemantic,
                ),
                (None, Some(lexical)) => (
                    RERANK_LEXICAL_WEIGHT * lexical + RERANK_SEMANTIC_WEIGHT * semantic,
                    RankingTag::HybridLexicalSemantic,
                ),
                (None, None) => (semantic, RankingTag::SemanticOnly),
            };
            doc.combined_score = Some(combined);
            doc.ranking_method = Some(tag);
        }
    }

    /// Score, drop documents below the threshold, sort by `combined_score`
    /// descending and keep the first `top_k`.
    pub fn rerank(
        &self,
        query: &str,
        mut documents: Vec<Document>,
        top_k: Option<usize>,
    ) -> Vec<Document> {
        self.annotate(query, &mut documents);

        let before = documents.len();
        documents.retain(|d| d.semantic_score.unwrap_or(0.0) >= self.threshold);
        debug!(
            kept = documents.len(),
            dropped = before - documents.len(),
            threshold = self.threshold,
            "Semantic threshold applied"
        );

        documents.sort_by(|a, b| {
            b.combined_or_min()
                .partial_cmp(&a.combined_or_min())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(k) = top_k {
            documents.truncate(k);
        }
        documents
    }
}

impl Default for SemanticScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::intent::QueryIntent;

    #[test]
    fn test_full_exact_match_scores_one() {
        let scorer = SemanticScorer::new();
        assert_eq!(scorer.score("insulin glucose", "glucose and insulin values"), 1.0);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let scorer = SemanticScorer::new();
        assert_eq!(scorer.score("aspirin", "knee replacement rehabilitation"), 0.0);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let scorer = SemanticScorer::new();
        assert_eq!(scorer.score("", "anything at all"), 0.0);
        assert_eq!(scorer.score("42 !!", "anything at all"), 0.0);
    }

    #[test]
    fn test_related_term_earns_half_credit() {
        let scorer = SemanticScorer::new();
        let analysis = scorer.analyze("diabetes", "elevated fasting glucose");
        assert_eq!(analysis.related_matches.len(), 1);
        assert_eq!(analysis.related_matches[0].document_term, "glucose");
        assert!((analysis.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_prefix_relation_earns_half_credit() {
        let scorer = SemanticScorer::new();
        let score = scorer.score("cardiology", "dilated cardiomyopathy");
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_term_weights_shape_the_score() {
        let scorer = SemanticScorer::new();
        // diabetes (1.5) matched, zebra (1.0) missed -> 1.5 / 2.5
        let score = scorer.score("diabetes zebra", "diabetes clinic");
        assert!((score - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_intent_boost_is_applied_and_clamped() {
        let scorer = SemanticScorer::new();
        let analysis = scorer.analyze("insulin treatment", "insulin treatment protocol");
        assert_eq!(analysis.intents.get(&QueryIntent::Treatment), Some(&1.0));
        assert!((analysis.intent_boost - 0.05).abs() < 1e-12);
        assert!(analysis.raw_score > analysis.max_score);
        assert_eq!(analysis.score, 1.0);
    }

    #[test]
    fn test_intent_boost_without_term_overlap() {
        let scorer = SemanticScorer::new();
        let score = scorer.score("symptoms", "knee replacement");
        assert!((score - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_coverage_and_unmatched() {
        let scorer = SemanticScorer::new();
        let analysis = scorer.analyze("statin liver zebra", "statin hepatic panel");
        assert_eq!(analysis.exact_matches, vec!["statin"]);
        assert_eq!(analysis.related_matches[0].document_term, "hepatic");
        assert_eq!(analysis.unmatched, vec!["zebra"]);
        assert!((analysis.coverage - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_annotate_tags() {
        let scorer = SemanticScorer::new();
        let mut docs = vec![
            Document::new("v", "c", "insulin").with_vector_score(0.5),
            Document::new("l", "c", "insulin"),
            Document::new("s", "c", "insulin"),
        ];
        docs[1].lexical_score = Some(2.0);
        scorer.annotate("insulin", &mut docs);

        assert_eq!(docs[0].ranking_method, Some(RankingTag::HybridVectorSemantic));
        assert!((docs[0].combined_score.unwrap() - (0.3 * 0.5 + 0.7)).abs() < 1e-12);
        assert_eq!(docs[1].ranking_method, Some(RankingTag::HybridLexicalSemantic));
        assert!((docs[1].combined_score.unwrap() - (0.3 * 2.0 + 0.7)).abs() < 1e-12);
        assert_eq!(docs[2].ranking_method, Some(RankingTag::SemanticOnly));
        assert_eq!(docs[2].combined_score, Some(1.0));
    }

    #[test]
    fn test_rerank_filters_before_truncation() {
        let scorer = SemanticScorer::new().with_threshold(0.5);
        let docs = vec![
            Document::new("miss", "c", "orthopedic rehabilitation"),
            Document::new("half", "c", "fasting glucose"),
            Document::new("full", "c", "diabetes"),
        ];
        let ranked = scorer.rerank("diabetes", docs, Some(5));
        let ids: Vec<&str> = ranked.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["full", "half"]);
    }

    #[test]
    fn test_scores_stay_in_unit_range() {
        let scorer = SemanticScorer::new();
        let queries = [
            "diagnosis treatment levels symptoms chronic",
            "what is the normal glucose range",
            "the the the",
        ];
        for q in queries {
            for text in ["", "the", "glucose range normal chronic symptoms diagnosis"] {
                let s = scorer.score(q, text);
                assert!((0.0..=1.0).contains(&s), "score {s} for {q:?}/{text:?}");
            }
        }
    }
}
