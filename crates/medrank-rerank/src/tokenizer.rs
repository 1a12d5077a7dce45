use regex::Regex;
use std::sync::OnceLock;

/// Alphabetic runs with internal hyphens kept, so "anti-inflammatory" stays
/// a single term.
#[allow(clippy::expect_used)]
fn term_regex() -> &'static Regex {
    static TERM_REGEX: OnceLock<Regex> = OnceLock::new();
    TERM_REGEX.get_or_init(|| Regex::new(r"[a-z]+(?:-[a-z]+)*").expect("Invalid term regex"))
}

/// Tokenize text into lowercase alphabetic terms.
///
/// Digits, punctuation and non-ASCII letters act as separators. Shared by
/// BM25 and the semantic scorer so both see the same term sequence.
pub fn tokenize(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let lowered = text.to_lowercase();
    term_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        let tokens = tokenize("Hello, World! This is a TEST.");
        assert_eq!(tokens, vec!["hello", "world", "this", "is", "a", "test"]);
    }

    #[test]
    fn test_tokenize_keeps_hyphenated_compounds() {
        let tokens = tokenize("Non-steroidal anti-inflammatory drugs");
        assert_eq!(tokens, vec!["non-steroidal", "anti-inflammatory", "drugs"]);
    }

    #[test]
    fn test_tokenize_drops_digits_and_dangling_hyphens() {
        let tokens = tokenize("HbA1c of 7.2% -- follow- up");
        assert_eq!(tokens, vec!["hba", "c", "of", "follow", "up"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("123 456 !!!").is_empty());
    }

    #[test]
    fn test_tokenize_deterministic() {
        let text = "Type-2 diabetes mellitus, glucose 180 mg/dL";
        assert_eq!(tokenize(text), tokenize(text));
    }
}
