//! Validation Utilities

use validator::ValidationErrors;

/// Flatten validator errors into one human-readable message, first field
/// first.
pub fn validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let detail = e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, detail)
            })
        })
        .next()
        .unwrap_or_else(|| "Validation failed".into())
}

/// Strip control characters and surrounding whitespace from user-provided
/// text before it is persisted. Newlines and tabs survive; everything else
/// below U+0020 is dropped.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("  hello  ", "hello" ; "trims whitespace")]
    #[test_case("line\nbreak", "line\nbreak" ; "keeps newlines")]
    #[test_case("tab\there", "tab\there" ; "keeps tabs")]
    #[test_case("nul\u{0}byte", "nulbyte" ; "drops control characters")]
    #[test_case("", "" ; "empty stays empty")]
    fn sanitize_text_cases(input: &str, expected: &str) {
        assert_eq!(sanitize_text(input), expected);
    }
}
