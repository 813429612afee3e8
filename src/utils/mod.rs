//! Utility functions and helpers.

pub mod case_insensitive;
pub mod http;
pub mod log;

pub use case_insensitive::CaseInsensitiveMap;

/// Whether the text contains at least one alphabetic character.
pub fn has_letters(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

/// Remove every whitespace character.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Project a name onto the characters Discord accepts in emoji names.
///
/// Keeps ASCII letters, digits and spaces.
pub fn emoji_safe(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_letters() {
        assert!(has_letters("Top"));
        assert!(has_letters("12a"));
        assert!(!has_letters("\u{200E}"));
        assert!(!has_letters("⚠ 42"));
        assert!(!has_letters(""));
    }

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace("Nunu & Willump"), "Nunu&Willump");
        assert_eq!(strip_whitespace(" Lee\tSin "), "LeeSin");
    }

    #[test]
    fn test_emoji_safe() {
        assert_eq!(emoji_safe("Nunu&Willump"), "NunuWillump");
        assert_eq!(emoji_safe("Kai'Sa"), "KaiSa");
        assert_eq!(emoji_safe("Dr. Mundo"), "Dr Mundo");
    }
}
