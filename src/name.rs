// Artifact name derivation.
//
// Summarizes the input patterns as a single identifier safe for use in
// file or section names. Runs over the raw input strings and is entirely
// independent of the bytecode pipeline.

/// Derive a sanitized identifier from the pattern list.
///
/// Patterns starting with `-` (conventionally "exclude") are skipped.
/// Each remaining pattern is stripped of boundary dots and whitespace,
/// split into labels, a bare `*` label becomes `any`, every byte outside
/// `[A-Za-z0-9]` becomes `x`, and labels join with `_`. Patterns join
/// with `_` as well. An empty input list yields an empty string.
pub fn derive_name(patterns: &[String]) -> String {
    let mut parts = Vec::new();
    for pattern in patterns {
        if pattern.starts_with('-') {
            continue;
        }
        let trimmed = pattern.trim_matches('.').trim();
        let labels: Vec<String> = trimmed
            .split('.')
            .map(|label| {
                if label == "*" {
                    "any".to_string()
                } else {
                    label
                        .chars()
                        .map(|c| if c.is_ascii_alphanumeric() { c } else { 'x' })
                        .collect()
                }
            })
            .collect();
        parts.push(labels.join("_"));
    }
    parts.join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(patterns: &[&str]) -> String {
        let owned: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        derive_name(&owned)
    }

    #[test]
    fn literal_and_wildcard_patterns() {
        assert_eq!(
            name(&["example.com", "*.www.fint.me"]),
            "example_com_any_www_fint_me"
        );
    }

    #[test]
    fn unsafe_characters_become_x() {
        assert_eq!(name(&["fin?.me"]), "finx_me");
        assert_eq!(name(&["*{4-255}.example.com"]), "xx4x255x_example_com");
    }

    #[test]
    fn excluded_patterns_are_skipped() {
        assert_eq!(name(&["-skip.me", "keep.me"]), "keep_me");
    }

    #[test]
    fn boundary_dots_are_stripped() {
        assert_eq!(name(&[".example.com."]), "example_com");
    }

    #[test]
    fn empty_input_yields_empty_name() {
        assert_eq!(name(&[]), "");
    }

    #[test]
    fn free_suffix_marker_sanitizes() {
        assert_eq!(name(&["example.**"]), "example_xx");
    }
}
