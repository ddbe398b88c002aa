//! Note filename derivation from entity display names.

use crate::defaults::UNNAMED_NOTE;

/// Sanitize an entity display name into a filesystem-safe filename stem.
///
/// Path-hostile characters (`/ \ : * ? " | < >`) and control characters are
/// replaced with `-`; leading/trailing dots and spaces are trimmed. A name
/// that sanitizes to nothing falls back to `"unnamed"` rather than failing.
///
/// Two distinct display names can sanitize to the same stem; such notes
/// share a file (last writer wins).
pub fn note_filename(display_name: &str) -> String {
    let sanitized: String = display_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '|' | '<' | '>' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        UNNAMED_NOTE.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_unchanged() {
        assert_eq!(note_filename("John Smith"), "John Smith");
    }

    #[test]
    fn test_hostile_characters_replaced() {
        assert_eq!(note_filename("a/b\\c:d*e?f\"g|h<i>j"), "a-b-c-d-e-f-g-h-i-j");
    }

    #[test]
    fn test_control_characters_replaced() {
        assert_eq!(note_filename("a\nb\tc"), "a-b-c");
    }

    #[test]
    fn test_leading_trailing_dots_and_spaces_trimmed() {
        assert_eq!(note_filename(" .name. "), "name");
        assert_eq!(note_filename("..hidden"), "hidden");
    }

    #[test]
    fn test_empty_result_falls_back() {
        assert_eq!(note_filename(""), "unnamed");
        assert_eq!(note_filename(" ... "), "unnamed");
    }

    #[test]
    fn test_distinct_names_may_collide() {
        assert_eq!(note_filename("a/b"), note_filename("a\\b"));
    }
}
