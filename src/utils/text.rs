use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lower-case, diacritic-stripped form of `text` used for all keyword
/// comparisons ("Táo" → "tao").
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Substring match under `normalize`. An empty keyword matches everything;
/// an item with no display text never matches a non-empty keyword.
pub fn matches_keyword(text: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return true;
    }
    if text.is_empty() {
        return false;
    }
    normalize(text).contains(&normalize(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_diacritics() {
        assert_eq!(normalize("Táo"), "tao");
        assert_eq!(normalize("Chuối"), "chuoi");
        assert_eq!(normalize("CRÈME brûlée"), "creme brulee");
        assert_eq!(normalize("plain"), "plain");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_matches_keyword_case_and_accent_insensitive() {
        assert!(matches_keyword("Táo", "tao"));
        assert!(matches_keyword("Banana", "BAN"));
        assert!(matches_keyword("Crème brûlée", "creme"));
        assert!(!matches_keyword("Apple", "xyz"));
    }

    #[test]
    fn test_matches_keyword_empty_cases() {
        assert!(matches_keyword("anything", ""));
        assert!(matches_keyword("", ""));
        assert!(!matches_keyword("", "a"));
    }
}
