//! Curated medical vocabulary backing the semantic scorer.
//!
//! Three fixed tables: per-term importance weights, synonym and
//! abbreviation relations, and shared clinical prefixes. Terms are stored in
//! the tokenizer's output form (lowercase, alphabetic, hyphens kept).

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Weight for any term missing from [`TERM_WEIGHTS`].
pub const DEFAULT_TERM_WEIGHT: f64 = 1.0;

const TERM_WEIGHTS: &[(&str, f64)] = &[
    // Conditions
    ("diabetes", 1.5),
    ("hypertension", 1.5),
    ("cancer", 1.5),
    ("carcinoma", 1.5),
    ("stroke", 1.5),
    ("sepsis", 1.5),
    ("pneumonia", 1.5),
    ("infarction", 1.5),
    ("asthma", 1.4),
    ("copd", 1.4),
    ("anemia", 1.4),
    ("arrhythmia", 1.4),
    ("fibrillation", 1.4),
    ("cirrhosis", 1.4),
    ("hepatitis", 1.4),
    ("nephropathy", 1.4),
    ("neuropathy", 1.4),
    ("thrombosis", 1.4),
    ("embolism", 1.4),
    // Drugs, labs and procedures
    ("insulin", 1.3),
    ("glucose", 1.3),
    ("metformin", 1.3),
    ("cholesterol", 1.3),
    ("statin", 1.3),
    ("creatinine", 1.3),
    ("hemoglobin", 1.3),
    ("troponin", 1.3),
    ("biopsy", 1.3),
    ("anticoagulant", 1.3),
    ("warfarin", 1.3),
    ("antibiotic", 1.3),
    // Clinical intent words
    ("diagnosis", 1.2),
    ("treatment", 1.2),
    ("therapy", 1.2),
    ("symptoms", 1.2),
    ("medication", 1.2),
    ("dosage", 1.2),
    ("prognosis", 1.2),
    // Generic clinical filler
    ("patient", 0.3),
    ("patients", 0.3),
    ("doctor", 0.3),
    ("hospital", 0.3),
    ("medical", 0.3),
    ("clinical", 0.3),
    ("disease", 0.5),
    ("condition", 0.5),
    // Function words
    ("the", 0.1),
    ("a", 0.1),
    ("an", 0.1),
    ("of", 0.1),
    ("for", 0.1),
    ("and", 0.1),
    ("or", 0.1),
    ("in", 0.1),
    ("on", 0.1),
    ("with", 0.1),
    ("to", 0.1),
    ("is", 0.1),
    ("are", 0.1),
    ("was", 0.1),
    ("be", 0.1),
    ("by", 0.1),
    ("at", 0.1),
    ("what", 0.1),
    ("how", 0.1),
    ("which", 0.1),
];

/// Synonyms and abbreviations. Consulted in both directions.
const RELATIONS: &[(&str, &[&str])] = &[
    (
        "diabetes",
        &["glucose", "insulin", "hyperglycemia", "metformin", "diabetic", "hba"],
    ),
    (
        "hypertension",
        &["pressure", "bp", "hypertensive", "antihypertensive"],
    ),
    ("infarction", &["mi", "myocardial", "troponin", "heart"]),
    ("heart", &["cardiac", "cardiovascular", "coronary"]),
    ("kidney", &["renal", "nephropathy", "creatinine"]),
    ("liver", &["hepatic", "cirrhosis", "hepatitis"]),
    ("lung", &["pulmonary", "respiratory"]),
    ("stroke", &["cerebrovascular", "cva"]),
    (
        "cancer",
        &["tumor", "malignancy", "carcinoma", "oncology", "neoplasm"],
    ),
    ("infection", &["sepsis", "bacterial", "antibiotic"]),
    ("pain", &["analgesic", "ache"]),
    ("fever", &["pyrexia", "febrile"]),
    ("copd", &["emphysema", "bronchitis"]),
    ("anemia", &["hemoglobin"]),
    (
        "cholesterol",
        &["lipid", "statin", "ldl", "hdl", "hyperlipidemia"],
    ),
    ("clot", &["thrombosis", "embolism", "anticoagulant", "warfarin"]),
];

/// Clinical prefixes; two different terms sharing one count as related.
const MEDICAL_PREFIXES: &[&str] = &[
    "cardio", "neuro", "hepato", "nephro", "gastro", "pulmo", "dermato", "hemato", "onco", "osteo",
    "endo", "immuno", "psycho", "arthro", "ophthalmo", "pneumo",
];

fn weight_table() -> &'static HashMap<&'static str, f64> {
    static WEIGHTS: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
    WEIGHTS.get_or_init(|| TERM_WEIGHTS.iter().copied().collect())
}

fn relation_table() -> &'static HashMap<&'static str, Vec<&'static str>> {
    static RELATED: OnceLock<HashMap<&'static str, Vec<&'static str>>> = OnceLock::new();
    RELATED.get_or_init(|| {
        let mut map: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for &(term, related) in RELATIONS {
            for &other in related {
                map.entry(term).or_default().push(other);
                map.entry(other).or_default().push(term);
            }
        }
        map
    })
}

/// Importance weight of a query term.
pub fn term_weight(term: &str) -> f64 {
    weight_table()
        .get(term)
        .copied()
        .unwrap_or(DEFAULT_TERM_WEIGHT)
}

/// Terms curated as synonyms or abbreviations of `term`.
pub fn related_terms(term: &str) -> &'static [&'static str] {
    relation_table()
        .get(term)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The clinical prefix `term` starts with, if any.
pub fn medical_prefix(term: &str) -> Option<&'static str> {
    MEDICAL_PREFIXES
        .iter()
        .copied()
        .find(|prefix| term.len() > prefix.len() && term.starts_with(prefix))
}

/// Find a document term related to `term`, via the curated relations first
/// and then via a shared clinical prefix.
pub fn find_related<'a>(term: &str, document_terms: &'a HashSet<String>) -> Option<&'a str> {
    for related in related_terms(term) {
        if let Some(found) = document_terms.get(*related) {
            return Some(found.as_str());
        }
    }

    let prefix = medical_prefix(term)?;
    document_terms
        .iter()
        .filter(|doc_term| doc_term.as_str() != term)
        .filter(|doc_term| medical_prefix(doc_term.as_str()) == Some(prefix))
        .min()
        .map(String::as_str)
}
