use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use medrank_core::{Document, RankingTag};
use serde::Serialize;
use tracing::{debug, warn};

use crate::tokenizer::tokenize;

/// Default BM25 term frequency saturation.
pub const DEFAULT_K1: f64 = 1.2;
/// Default BM25 length normalization.
pub const DEFAULT_B: f64 = 0.75;

/// Weight of the upstream vector score in [`LexicalIndex::rerank`]'s own blend.
const RERANK_VECTOR_WEIGHT: f64 = 0.7;
/// Weight of the BM25 score in [`LexicalIndex::rerank`]'s own blend.
const RERANK_BM25_WEIGHT: f64 = 0.3;

/// How a single query term contributed to a document's BM25 score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermContribution {
    /// The query term.
    pub term: String,
    /// Occurrences of the term in the query.
    pub query_count: usize,
    /// Occurrences of the term in the document.
    pub tf: usize,
    /// Number of indexed documents containing the term.
    pub df: usize,
    /// Inverse document frequency; negative for very common terms.
    pub idf: f64,
    /// Total contribution to the document score.
    pub contribution: f64,
}

/// A BM25 index over one candidate set.
///
/// The index is a snapshot: [`LexicalIndex::build_index`] replaces all of
/// its statistics at once and nothing is ever updated incrementally.
/// Documents are addressed by their position in the indexed corpus.
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    k1: f64,
    b: f64,
    /// Tokenized corpus, in input order.
    corpus: Vec<Vec<String>>,
    /// Per-document term -> term frequency.
    term_freqs: Vec<HashMap<String, usize>>,
    /// term -> number of documents containing it.
    doc_freqs: HashMap<String, usize>,
    /// Per-document length in tokens.
    doc_lengths: Vec<usize>,
    avg_doc_length: f64,
    /// term -> IDF, filled for every indexed term at build time.
    idf_cache: HashMap<String, f64>,
    /// Hash of the raw texts last indexed.
    fingerprint: u64,
    built: bool,
}

impl LexicalIndex {
    /// Create an empty index with `k1 = 1.2` and `b = 0.75`.
    pub fn new() -> Self {
        Self::with_params(DEFAULT_K1, DEFAULT_B)
    }

    /// Create an empty index with custom BM25 parameters.
    pub fn with_params(k1: f64, b: f64) -> Self {
        Self {
            k1,
            b,
            corpus: Vec::new(),
            term_freqs: Vec::new(),
            doc_freqs: HashMap::new(),
            doc_lengths: Vec::new(),
            avg_doc_length: 0.0,
            idf_cache: HashMap::new(),
            fingerprint: 0,
            built: false,
        }
    }

    /// Index a corpus, replacing whatever was indexed before.
    ///
    /// An empty corpus is valid: the average length becomes 0 and every
    /// subsequent score is 0.
    pub fn build_index<S: AsRef<str>>(&mut self, documents: &[S]) {
        let corpus: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();

        let mut term_freqs = Vec::with_capacity(corpus.len());
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(corpus.len());

        for tokens in &corpus {
            let mut freqs: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *freqs.entry(token.clone()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            doc_lengths.push(tokens.len());
            term_freqs.push(freqs);
        }

        let n = corpus.len();
        let avg_doc_length = if n == 0 {
            0.0
        } else {
            doc_lengths.iter().sum::<usize>() as f64 / n as f64
        };

        if avg_doc_length == 0.0 {
            warn!(
                documents = n,
                "BM25 index built over an empty corpus; lexical scores will be 0"
            );
        }

        let idf_cache = doc_freqs
            .iter()
            .map(|(term, &df)| (term.clone(), Self::compute_idf(n, df)))
            .collect();

        self.corpus = corpus;
        self.term_freqs = term_freqs;
        self.doc_freqs = doc_freqs;
        self.doc_lengths = doc_lengths;
        self.avg_doc_length = avg_doc_length;
        self.idf_cache = idf_cache;
        self.fingerprint = Self::fingerprint_of(documents);
        self.built = true;

        debug!(
            documents = n,
            terms = self.doc_freqs.len(),
            avg_doc_length = self.avg_doc_length,
            "BM25 index built"
        );
    }

    /// Score a tokenized query against the document at `doc_index`.
    ///
    /// ```text
    /// score = sum over query terms with tf > 0 of:
    ///   IDF(t) * (tf * (k1 + 1)) / (tf + k1 * (1 - b + b * dl / avgdl))
    /// ```
    /// where `IDF(t) = ln((N - df + 0.5) / (df + 0.5))`. Terms present in
    /// more than half the corpus get a negative IDF and lower the score.
    pub fn score(&self, query_tokens: &[String], doc_index: usize) -> f64 {
        query_tokens
            .iter()
            .map(|term| self.term_score(term, doc_index))
            .sum()
    }

    /// Per-term breakdown of [`LexicalIndex::score`], one entry per distinct
    /// query term that occurs in the document, in query order.
    pub fn term_contributions(
        &self,
        query_tokens: &[String],
        doc_index: usize,
    ) -> Vec<TermContribution> {
        let mut contributions: Vec<TermContribution> = Vec::new();
        for term in query_tokens {
            if let Some(existing) = contributions.iter_mut().find(|c| &c.term == term) {
                existing.query_count += 1;
                existing.contribution += self.term_score(term, doc_index);
                continue;
            }
            let tf = self.term_frequency(term, doc_index);
            if tf == 0 {
                continue;
            }
            contributions.push(TermContribution {
                term: term.clone(),
                query_count: 1,
                tf,
                df: self.doc_frequency(term),
                idf: self.idf(term),
                contribution: self.term_score(term, doc_index),
            });
        }
        contributions
    }

    /// Rebuild the index if `documents` is not the corpus currently indexed.
    ///
    /// Returns `true` when a rebuild happened.
    pub fn ensure_index(&mut self, documents: &[Document]) -> bool {
        let contents: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let stale = !self.built
            || self.corpus.len() != contents.len()
            || self.fingerprint != Self::fingerprint_of(contents.as_slice());
        if stale {
            self.build_index(contents.as_slice());
        }
        stale
    }

    /// Attach BM25 scores to `documents` in place, without reordering.
    ///
    /// Sets `lexical_score`, and `combined_score`/`ranking_method` using the
    /// fixed 0.7 vector / 0.3 BM25 blend when a vector score is present.
    pub fn annotate(&mut self, query: &str, documents: &mut [Document]) {
        self.ensure_index(documents);
        let query_tokens = tokenize(query);

        for (idx, doc) in documents.iter_mut().enumerate() {
            let bm25 = self.score(&query_tokens, idx);
            doc.lexical_score = Some(bm25);
            match doc.vector_score {
                Some(vector) => {
                    doc.combined_score =
                        Some(RERANK_VECTOR_WEIGHT * vector + RERANK_BM25_WEIGHT * bm25);
                    doc.ranking_method = Some(RankingTag::HybridVectorBm25);
                }
                None => {
                    doc.combined_score = Some(bm25);
                    doc.ranking_method = Some(RankingTag::Bm25Only);
                }
            }
        }
    }

    /// Score, sort by `combined_score` descending and keep the first `top_k`.
    ///
    /// The sort is stable, so equally scored documents keep their input order.
    pub fn rerank(
        &mut self,
        query: &str,
        mut documents: Vec<Document>,
        top_k: Option<usize>,
    ) -> Vec<Document> {
        self.annotate(query, &mut documents);
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

    /// Number of documents in the indexed corpus.
    pub fn document_count(&self) -> usize {
        self.corpus.len()
    }

    /// Average document length in tokens.
    pub fn avg_doc_length(&self) -> f64 {
        self.avg_doc_length
    }

    /// Number of distinct terms in the indexed corpus.
    pub fn vocabulary_size(&self) -> usize {
        self.doc_freqs.len()
    }

    /// Number of indexed documents containing `term`.
    pub fn doc_frequency(&self, term: &str) -> usize {
        self.doc_freqs.get(term).copied().unwrap_or(0)
    }

    /// Inverse document frequency of `term` over the indexed corpus.
    pub fn idf(&self, term: &str) -> f64 {
        self.idf_cache
            .get(term)
            .copied()
            .unwrap_or_else(|| Self::compute_idf(self.corpus.len(), 0))
    }

    /// Whether [`LexicalIndex::build_index`] has run at least once.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// The `(k1, b)` parameters.
    pub fn params(&self) -> (f64, f64) {
        (self.k1, self.b)
    }

    fn term_frequency(&self, term: &str, doc_index: usize) -> usize {
        self.term_freqs
            .get(doc_index)
            .and_then(|freqs| freqs.get(term))
            .copied()
            .unwrap_or(0)
    }

    fn term_score(&self, term: &str, doc_index: usize) -> f64 {
        if self.avg_doc_length <= 0.0 {
            return 0.0;
        }
        let tf = self.term_frequency(term, doc_index) as f64;
        if tf == 0.0 {
            return 0.0;
        }
        let dl = self.doc_lengths.get(doc_index).copied().unwrap_or(0) as f64;
        let numerator = tf * (self.k1 + 1.0);
        let denominator = tf + self.k1 * (1.0 - self.b + self.b * dl / self.avg_doc_length);
        self.idf(term) * numerator / denominator
    }

    fn compute_idf(n: usize, df: usize) -> f64 {
        let n = n as f64;
        let df = df as f64;
        ((n - df + 0.5) / (df + 0.5)).ln()
    }

    fn fingerprint_of<S: AsRef<str>>(documents: &[S]) -> u64 {
        let mut hasher = DefaultHasher::new();
        documents.len().hash(&mut hasher);
        for doc in documents {
            doc.as_ref().hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl Default for LexicalIndex {
    fn default() -> Self {
        Self::new()
    }
}
