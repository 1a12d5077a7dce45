use medrank_core::{Document, RerankingMethod};
use serde::Serialize;
use tracing::debug;

/// Per-source weights for linear score fusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionWeights {
    /// Weight of the upstream vector similarity.
    pub vector: f64,
    /// Weight of the BM25 score.
    pub lexical: f64,
    /// Weight of the semantic score.
    pub semantic: f64,
}

/// Linear combination of vector, lexical and semantic scores.
///
/// | Method | final_score |
/// |--------|-------------|
/// | `LexicalOnly` | lexical |
/// | `SemanticOnly` | semantic |
/// | `LexicalSemantic` | lw·lexical + sw·semantic |
/// | `VectorLexical` | vw·vector + lw·lexical |
/// | `VectorSemantic` | vw·vector + sw·semantic |
/// | `FullHybrid` | vw·vector + lw·lexical + sw·semantic |
///
/// A source the document lacks contributes 0.
#[derive(Debug, Clone, Copy)]
pub struct ScoreFuser {
    method: RerankingMethod,
    weights: FusionWeights,
}

impl ScoreFuser {
    /// Create a fuser for one method and weight set.
    pub fn new(method: RerankingMethod, weights: FusionWeights) -> Self {
        Self { method, weights }
    }

    /// The method this fuser applies.
    pub fn method(&self) -> RerankingMethod {
        self.method
    }

    /// Fused score for one document.
    pub fn fuse(&self, doc: &Document) -> f64 {
        let w = self.weights;
        let vector = || component(doc, doc.vector_score, "vector_score");
        let lexical = || component(doc, doc.lexical_score, "lexical_score");
        let semantic = || component(doc, doc.semantic_score, "semantic_score");

        match self.method {
            RerankingMethod::LexicalOnly => lexical(),
            RerankingMethod::SemanticOnly => semantic(),
            RerankingMethod::LexicalSemantic => w.lexical * lexical() + w.semantic * semantic(),
            RerankingMethod::VectorLexical => w.vector * vector() + w.lexical * lexical(),
            RerankingMethod::VectorSemantic => w.vector * vector() + w.semantic * semantic(),
            RerankingMethod::FullHybrid => {
                w.vector * vector() + w.lexical * lexical() + w.semantic * semantic()
            }
        }
    }

    /// Set `final_score` and `reranking_method` on every document.
    pub fn apply(&self, documents: &mut [Document]) {
        for doc in documents {
            doc.final_score = Some(self.fuse(doc));
            doc.reranking_method = Some(self.method);
        }
    }
}

fn component(doc: &Document, value: Option<f64>, source: &'static str) -> f64 {
    value.unwrap_or_else(|| {
        debug!(
            doc_id = %doc.doc_id,
            chunk_id = %doc.chunk_id,
            source,
            "Score source missing; contributing 0"
        );
        0.0
    })
}
