//! Canonical text forms used for every comparison

use deunicode::deunicode;
use regex::Regex;

lazy_static::lazy_static! {
    static ref NON_ALNUM_RE: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Normalize free text into its canonical form.
///
/// Transliterates to ASCII (which strips diacritics), lowercases, folds every
/// run of characters outside `[a-z0-9]` into a single space and trims.
/// Total and idempotent.
pub fn normalize(s: &str) -> String {
    let latin = deunicode(s).to_lowercase();
    NON_ALNUM_RE.replace_all(&latin, " ").trim().to_string()
}

/// Whitespace tokens of the normalized form
pub fn word_set(s: &str) -> std::collections::HashSet<String> {
    normalize(s).split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_punctuation() {
        assert_eq!(normalize("Zebra  Midge!"), normalize("zebra midge"));
        assert_eq!(normalize("  UTC 70D Thread -- Black "), "utc 70d thread black");
        assert_eq!(normalize("Copper John (Red)"), "copper john red");
    }

    #[test]
    fn test_strips_accents() {
        assert_eq!(normalize("Pâté Crème"), "pate creme");
        assert_eq!(normalize("Ñymph"), "nymph");
    }

    #[test]
    fn test_idempotent() {
        for s in ["Zebra  Midge!", "MFC 3/16\" Brass Bead - Nickel", "", "  ", "Élan--Vital"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_empty_and_symbols_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("@@--!!"), "");
    }

    #[test]
    fn test_word_set() {
        let words = word_set("Krystal Flash, Pearl / pearl");
        assert_eq!(words.len(), 3);
        assert!(words.contains("krystal"));
        assert!(words.contains("pearl"));
    }
}
