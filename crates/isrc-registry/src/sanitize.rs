//! Free-text normalisation for track titles and owner names.

/// Longest stored title or owner name, in characters.
pub const MAX_TEXT_CHARS: usize = 100;

/// Strip markup-significant characters (`< > " ' &`), trim surrounding
/// whitespace, and truncate to [`MAX_TEXT_CHARS`] characters.
pub fn sanitize_text(input: &str) -> String {
    let stripped: String = input
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '&'))
        .collect();
    stripped.trim().chars().take(MAX_TEXT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_markup_characters() {
        assert_eq!(sanitize_text("<b>Rock & \"Roll\"</b>"), "bRock  Roll/b");
        assert_eq!(sanitize_text("Don't Stop"), "Dont Stop");
    }

    #[test]
    fn test_trims() {
        assert_eq!(sanitize_text("  Title \n"), "Title");
        assert_eq!(sanitize_text(" <> "), "");
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        let out = sanitize_text(&long);
        assert_eq!(out.chars().count(), MAX_TEXT_CHARS);
    }
}
