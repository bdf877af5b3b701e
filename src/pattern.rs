// Domain pattern parsing.
//
// One input string becomes an ordered list of segments: literal labels,
// whole-label wildcards with optional length bounds, and a trailing
// free-suffix marker. Leading/trailing dots are insignificant.

use crate::error::CompileError;

/// One component of a parsed domain pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A literal label's decoded bytes. A `?` byte matches any single byte
    /// at that position.
    Literal(Vec<u8>),
    /// Matches exactly one label whose byte length lies in
    /// `[min.unwrap_or(0), max.unwrap_or(255)]`.
    Star { min: Option<u8>, max: Option<u8> },
    /// Matches all remaining bytes of the query name. `exact` when the
    /// pattern had a separator dot immediately before the trailing `**`,
    /// so the preceding label still ends on a label boundary.
    FreeSuffix { exact: bool },
}

/// A parsed domain pattern. At most one `FreeSuffix` segment exists, and
/// only in final position (guaranteed by the parser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub segments: Vec<Segment>,
}

impl Pattern {
    /// `Some(exact)` when the pattern ends in a free suffix.
    pub fn free_suffix(&self) -> Option<bool> {
        match self.segments.last() {
            Some(Segment::FreeSuffix { exact }) => Some(*exact),
            _ => None,
        }
    }
}

/// Parse one domain pattern string.
///
/// `example.com` and `.example.com.` are equivalent. A trailing `**` marks
/// the free suffix; `name.**` keeps the last label's boundary exact while
/// `name**` leaves the last label's length open.
pub fn parse_pattern(input: &str) -> Result<Pattern, CompileError> {
    let trimmed = input.trim().trim_start_matches('.');

    let (body, free_suffix) = match trimmed.strip_suffix("**") {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    };
    let exact = free_suffix && body.ends_with('.');
    let body = body.trim_end_matches('.');

    if body.is_empty() && !free_suffix {
        return Err(CompileError::InvalidPatternSyntax {
            pattern: input.to_string(),
            detail: "empty pattern".to_string(),
        });
    }

    let mut segments = Vec::new();
    if !body.is_empty() {
        for label in body.split('.') {
            segments.push(parse_label(label, input)?);
        }
    }
    if free_suffix {
        segments.push(Segment::FreeSuffix { exact });
    }

    Ok(Pattern { segments })
}

/// Classify one dot-separated label.
///
/// `*` alone is a wildcard, `*{min-max}` a bounded wildcard. A star that is
/// only part of a label (`*xxx`, `xxx*`) has no special meaning and stays a
/// literal asterisk. Classification happens before percent-decoding, so an
/// escaped `%2a` is always literal.
fn parse_label(raw: &str, pattern: &str) -> Result<Segment, CompileError> {
    if raw == "*" {
        return Ok(Segment::Star {
            min: None,
            max: None,
        });
    }
    if let Some(inner) = raw.strip_prefix("*{").and_then(|r| r.strip_suffix('}')) {
        return parse_star_range(inner, pattern);
    }

    let decoded = percent_decode(raw);
    // The wire format length-prefixes every label with a single byte.
    if decoded.len() > 255 {
        return Err(CompileError::InvalidPatternSyntax {
            pattern: pattern.to_string(),
            detail: format!("label of {} bytes cannot be length-prefixed", decoded.len()),
        });
    }
    Ok(Segment::Literal(decoded))
}

/// Parse the inside of `*{min-max}`. Either bound may be omitted.
fn parse_star_range(inner: &str, pattern: &str) -> Result<Segment, CompileError> {
    let Some((lo, hi)) = inner.split_once('-') else {
        return Err(CompileError::InvalidPatternSyntax {
            pattern: pattern.to_string(),
            detail: format!("wildcard range `{{{inner}}}` must be `{{min-max}}`"),
        });
    };
    let min = parse_bound(lo, pattern)?;
    let max = parse_bound(hi, pattern)?;
    if let (Some(mi), Some(ma)) = (min, max) {
        if mi > ma {
            return Err(CompileError::UnsupportedRange {
                pattern: pattern.to_string(),
                detail: format!("minimum {mi} exceeds maximum {ma}"),
            });
        }
    }
    Ok(Segment::Star { min, max })
}

fn parse_bound(text: &str, pattern: &str) -> Result<Option<u8>, CompileError> {
    if text.is_empty() {
        return Ok(None);
    }
    let value: u32 = text
        .parse()
        .map_err(|_| CompileError::InvalidPatternSyntax {
            pattern: pattern.to_string(),
            detail: format!("non-numeric wildcard bound `{text}`"),
        })?;
    if value > 255 {
        return Err(CompileError::UnsupportedRange {
            pattern: pattern.to_string(),
            detail: format!("bound {value} outside 0-255"),
        });
    }
    Ok(Some(value as u8))
}

/// Decode `%XX` escapes (two hex digits) into raw bytes.
///
/// This is the whole escape table: a `%` not followed by two hex digits
/// passes through verbatim, and nothing else is rewritten.
fn percent_decode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(s: &str) -> Segment {
        Segment::Literal(s.as_bytes().to_vec())
    }

    #[test]
    fn plain_domain() {
        let p = parse_pattern("example.com").unwrap();
        assert_eq!(p.segments, vec![literal("example"), literal("com")]);
        assert_eq!(p.free_suffix(), None);
    }

    #[test]
    fn boundary_dots_are_insignificant() {
        let plain = parse_pattern("example.com").unwrap();
        assert_eq!(parse_pattern(".example.com").unwrap(), plain);
        assert_eq!(parse_pattern("example.com.").unwrap(), plain);
        assert_eq!(parse_pattern(" ..example.com. ").unwrap(), plain);
    }

    #[test]
    fn bare_star_is_wildcard() {
        let p = parse_pattern("*.www.fint.me").unwrap();
        assert_eq!(
            p.segments[0],
            Segment::Star {
                min: None,
                max: None
            }
        );
        assert_eq!(p.segments[1], literal("www"));
    }

    #[test]
    fn partial_star_is_literal() {
        let p = parse_pattern("*xxx.example.com").unwrap();
        assert_eq!(p.segments[0], literal("*xxx"));
        let p = parse_pattern("xxx*.example.com").unwrap();
        assert_eq!(p.segments[0], literal("xxx*"));
    }

    #[test]
    fn star_range_both_bounds() {
        let p = parse_pattern("*{4-255}.example.com").unwrap();
        assert_eq!(
            p.segments[0],
            Segment::Star {
                min: Some(4),
                max: Some(255)
            }
        );
    }

    #[test]
    fn star_range_open_bounds() {
        let p = parse_pattern("*{4-}.com").unwrap();
        assert_eq!(
            p.segments[0],
            Segment::Star {
                min: Some(4),
                max: None
            }
        );
        let p = parse_pattern("*{-8}.com").unwrap();
        assert_eq!(
            p.segments[0],
            Segment::Star {
                min: None,
                max: Some(8)
            }
        );
    }

    #[test]
    fn star_range_errors() {
        assert!(matches!(
            parse_pattern("*{a-b}.com"),
            Err(CompileError::InvalidPatternSyntax { .. })
        ));
        assert!(matches!(
            parse_pattern("*{4}.com"),
            Err(CompileError::InvalidPatternSyntax { .. })
        ));
        assert!(matches!(
            parse_pattern("*{5-4}.com"),
            Err(CompileError::UnsupportedRange { .. })
        ));
        assert!(matches!(
            parse_pattern("*{0-300}.com"),
            Err(CompileError::UnsupportedRange { .. })
        ));
    }

    #[test]
    fn free_suffix_exact() {
        let p = parse_pattern("example.**").unwrap();
        assert_eq!(
            p.segments,
            vec![literal("example"), Segment::FreeSuffix { exact: true }]
        );
    }

    #[test]
    fn free_suffix_open() {
        let p = parse_pattern("example**").unwrap();
        assert_eq!(
            p.segments,
            vec![literal("example"), Segment::FreeSuffix { exact: false }]
        );
    }

    #[test]
    fn free_suffix_alone_matches_everything() {
        let p = parse_pattern("**").unwrap();
        assert_eq!(p.segments, vec![Segment::FreeSuffix { exact: false }]);
    }

    #[test]
    fn empty_pattern_is_error() {
        assert!(matches!(
            parse_pattern(""),
            Err(CompileError::InvalidPatternSyntax { .. })
        ));
        assert!(matches!(
            parse_pattern(" . "),
            Err(CompileError::InvalidPatternSyntax { .. })
        ));
    }

    #[test]
    fn question_mark_stays_in_literal() {
        let p = parse_pattern("fin?.me").unwrap();
        assert_eq!(p.segments[0], literal("fin?"));
    }

    #[test]
    fn percent_decoding_inside_labels() {
        let p = parse_pattern("a%2fb.com").unwrap();
        assert_eq!(p.segments[0], literal("a/b"));

        // An escaped star decodes after classification, so it is literal.
        let p = parse_pattern("%2a.com").unwrap();
        assert_eq!(p.segments[0], literal("*"));

        // Escapes that are not two hex digits pass through untouched.
        let p = parse_pattern("a%zz.com").unwrap();
        assert_eq!(p.segments[0], literal("a%zz"));
        let p = parse_pattern("a%2.com").unwrap();
        assert_eq!(p.segments[0], literal("a%2"));
    }

    #[test]
    fn empty_interior_label_is_kept() {
        // "a..b" wires to a zero-length label between the two.
        let p = parse_pattern("a..b").unwrap();
        assert_eq!(p.segments, vec![literal("a"), literal(""), literal("b")]);
    }
}
