//! Text Normalizer
//!
//! Lower-cases free text and blanks out everything that is not an ASCII
//! letter or whitespace. Noise characters become a space rather than being
//! deleted, so `"fever,nausea"` still yields two words.

use std::sync::LazyLock;

/// Anything outside `[a-zA-Z]` and whitespace
static NOISE: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"[^a-zA-Z\s]").unwrap());

/// Normalize free text for symptom matching
///
/// Every input character maps to exactly one output character, so the
/// output is never shorter than the number of letters in the input.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let cleaned = NOISE.replace_all(&lower, " ");

    // `\s` in regex-lite is ASCII-only; fold remaining Unicode spaces too.
    cleaned
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Split normalized text into word tokens
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}

/// Whether the text carries anything worth diagnosing
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("Fever, Nausea & BODY-pain!"), "fever  nausea   body pain ");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_noise_keeps_words_apart() {
        let out = normalize("fever,nausea;cough2days");
        assert_eq!(tokens(&out).collect::<Vec<_>>(), vec!["fever", "nausea", "cough", "days"]);
    }

    #[test]
    fn test_only_lowercase_letters_and_whitespace() {
        let inputs = [
            "Héadache 🤒 since 3 days",
            "ÇOUGH\tand\u{00A0}chills",
            "İtching\nrash",
            "42!!!",
        ];
        for input in inputs {
            let out = normalize(input);
            assert!(
                out.chars().all(|c| c.is_ascii_lowercase() || c.is_whitespace()),
                "unexpected char in {:?}",
                out
            );
            let letters = input.chars().filter(|c| c.is_ascii_alphabetic()).count();
            assert!(out.chars().count() >= letters);
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["Joint Pain, SWELLING", "vomiting...", "  a  b  ", "ümlaut"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" \n\t "));
        assert!(!is_blank(" x "));
    }
}
