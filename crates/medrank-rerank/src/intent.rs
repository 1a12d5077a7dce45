use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Coarse clinical intent detected in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    /// Asking how a condition is identified.
    Diagnosis,
    /// Asking how a condition is managed.
    Treatment,
    /// Asking about lab values, levels or ranges.
    Measurement,
    /// Asking about presentation and complaints.
    Symptom,
    /// Asking about timing, onset or course.
    Temporal,
}

/// Accumulated weight per detected intent. Undetected intents are absent.
pub type IntentProfile = BTreeMap<QueryIntent, f64>;

struct IntentPattern {
    intent: QueryIntent,
    weight: f64,
    regex: Regex,
}

#[allow(clippy::expect_used)]
fn intent_patterns() -> &'static [IntentPattern] {
    static PATTERNS: OnceLock<Vec<IntentPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let specs: [(QueryIntent, f64, &str); 5] = [
            (
                QueryIntent::Diagnosis,
                1.0,
                r"\b(?:diagnos\w*|detect\w*|identif\w*|screen\w*|test\w*|differential|workup)\b",
            ),
            (
                QueryIntent::Treatment,
                1.0,
                r"\b(?:treat\w*|therap\w*|medicat\w*|drugs?|manag\w*|prescri\w*|dose|doses|dosage|dosing|surgery|intervention\w*)\b",
            ),
            (
                QueryIntent::Measurement,
                0.8,
                r"\b(?:levels?|measur\w*|values?|ranges?|normal|counts?|rates?|concentration\w*|results?|readings?)\b",
            ),
            (
                QueryIntent::Symptom,
                0.8,
                r"\b(?:symptom\w*|signs?|pain\w*|present\w*|complain\w*|fever|fatigue|nausea|ache\w*)\b",
            ),
            (
                QueryIntent::Temporal,
                0.6,
                r"\b(?:when|duration|chronic|acute|onset|history|follow-up|timeline|progression|recurr\w*|since)\b",
            ),
        ];
        specs
            .into_iter()
            .map(|(intent, weight, pattern)| IntentPattern {
                intent,
                weight,
                regex: Regex::new(pattern).expect("Invalid intent regex"),
            })
            .collect()
    })
}

impl QueryIntent {
    /// Whether a single term falls under this intent's vocabulary.
    pub fn matches_term(self, term: &str) -> bool {
        intent_patterns()
            .iter()
            .find(|p| p.intent == self)
            .is_some_and(|p| p.regex.is_match(term))
    }
}

/// Detect query intents.
///
/// Each pattern match adds `pattern_weight` to its category, so a query
/// mentioning two treatment words scores 2.0 for [`QueryIntent::Treatment`].
pub fn extract_query_intent(query: &str) -> IntentProfile {
    let lowered = query.to_lowercase();
    let mut profile = IntentProfile::new();
    for pattern in intent_patterns() {
        let matches = pattern.regex.find_iter(&lowered).count();
        if matches > 0 {
            *profile.entry(pattern.intent).or_insert(0.0) += pattern.weight * matches as f64;
        }
    }
    profile
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_treatment_and_measurement_detected() {
        let profile =
            extract_query_intent("What is the recommended insulin dosage and target glucose level?");
        assert_eq!(profile.get(&QueryIntent::Treatment), Some(&1.0));
        assert_eq!(profile.get(&QueryIntent::Measurement), Some(&0.8));
        assert!(!profile.contains_key(&QueryIntent::Diagnosis));
    }

    #[test]
    fn test_match_counts_accumulate() {
        let profile = extract_query_intent("treatment and therapy options for chronic acute pain");
        assert_eq!(profile.get(&QueryIntent::Treatment), Some(&2.0));
        assert!((profile[&QueryIntent::Temporal] - 1.2).abs() < 1e-12);
        assert_eq!(profile.get(&QueryIntent::Symptom), Some(&0.8));
    }

    #[test]
    fn test_no_intent_for_plain_query() {
        assert!(extract_query_intent("aspirin").is_empty());
        assert!(extract_query_intent("").is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let profile = extract_query_intent("DIAGNOSIS of Sepsis");
        assert_eq!(profile.get(&QueryIntent::Diagnosis), Some(&1.0));
    }

    #[test]
    fn test_matches_term() {
        assert!(QueryIntent::Treatment.matches_term("insulin-therapy"));
        assert!(QueryIntent::Diagnosis.matches_term("diagnosed"));
        assert!(!QueryIntent::Diagnosis.matches_term("insulin"));
        assert!(QueryIntent::Measurement.matches_term("levels"));
    }
}
