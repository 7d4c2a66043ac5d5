//! # RoutePattern: compiled URI path template
//!
//! `profile/{userId}/posts/{postId}` compiles into one anchored regex.
//! Literal text is escaped and every `{name}` captures exactly one path
//! segment. Leading and trailing `/` are not significant.

use crate::error::{DeepLinkError, DeepLinkResult};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Characters escaped inside a rendered path segment (RFC 3986 unreserved stay).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([^{}/]*)\}").unwrap_or_else(|e| panic!("placeholder regex: {e}"))
});

static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap_or_else(|e| panic!("name regex: {e}"))
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
pub struct RoutePattern {
    pattern: String,
    regex: Regex,
    parts: Vec<Part>,
    param_names: Vec<String>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> DeepLinkResult<Self> {
        let trimmed = pattern.trim_matches('/');
        let mut parts = Vec::new();
        let mut param_names: Vec<String> = Vec::new();
        let mut source = String::from("^");

        for (i, segment) in trimmed.split('/').enumerate() {
            if trimmed.is_empty() {
                break;
            }
            if segment.is_empty() {
                return Err(DeepLinkError::invalid_pattern(pattern, "empty path segment"));
            }
            if i > 0 {
                source.push('/');
                push_literal(&mut parts, "/");
            }

            let mut cursor = 0;
            for caps in PLACEHOLDER.captures_iter(segment) {
                let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let literal = &segment[cursor..whole.start()];
                check_literal(pattern, literal)?;
                source.push_str(&regex::escape(literal));
                push_literal(&mut parts, literal);

                let name = name.as_str();
                if !NAME.is_match(name) {
                    return Err(DeepLinkError::invalid_pattern(
                        pattern,
                        format!("bad placeholder name {name:?}"),
                    ));
                }
                if param_names.iter().any(|n| n == name) {
                    return Err(DeepLinkError::invalid_pattern(
                        pattern,
                        format!("placeholder {{{name}}} appears twice"),
                    ));
                }
                source.push_str("([^/]+)");
                parts.push(Part::Param(name.to_string()));
                param_names.push(name.to_string());
                cursor = whole.end();
            }

            let rest = &segment[cursor..];
            check_literal(pattern, rest)?;
            source.push_str(&regex::escape(rest));
            push_literal(&mut parts, rest);
        }
        source.push('$');

        let regex = Regex::new(&source)
            .map_err(|e| DeepLinkError::invalid_pattern(pattern, e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            parts,
            param_names,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Placeholder names in path order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Match a path (without scheme or query) and return the percent-decoded
    /// captures in path order. `Ok(None)` means the path does not match; a
    /// capture that does not decode to UTF-8 is an error.
    pub fn captures(&self, path: &str) -> DeepLinkResult<Option<Vec<(String, String)>>> {
        let Some(caps) = self.regex.captures(path.trim_matches('/')) else {
            return Ok(None);
        };
        let values = self
            .param_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let raw = caps.get(i + 1).map_or("", |m| m.as_str());
                Ok((name.clone(), decode_segment(name, raw)?))
            })
            .collect::<DeepLinkResult<Vec<_>>>()?;
        Ok(Some(values))
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path.trim_matches('/'))
    }

    /// Substitute every placeholder with the encoded value returned by
    /// `value_of`. `None` if any placeholder has no value.
    pub fn render<F>(&self, mut value_of: F) -> Option<String>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Param(name) => {
                    let value = value_of(name)?;
                    out.extend(utf8_percent_encode(&value, SEGMENT));
                }
            }
        }
        Some(out)
    }
}

fn push_literal(parts: &mut Vec<Part>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Part::Literal(prev)) = parts.last_mut() {
        prev.push_str(text);
    } else {
        parts.push(Part::Literal(text.to_string()));
    }
}

fn check_literal(pattern: &str, literal: &str) -> DeepLinkResult<()> {
    if literal.contains(['{', '}']) {
        return Err(DeepLinkError::invalid_pattern(pattern, "unbalanced braces"));
    }
    if literal.contains(['?', '#']) {
        return Err(DeepLinkError::invalid_pattern(
            pattern,
            "query and fragment do not belong in a path pattern",
        ));
    }
    Ok(())
}

fn decode_segment(name: &str, raw: &str) -> DeepLinkResult<String> {
    let decoded = percent_decode_str(raw).decode_utf8().map_err(|_| {
        DeepLinkError::InvalidParameterType {
            name: name.to_string(),
            expected: "utf-8 text".to_string(),
            value: raw.to_string(),
        }
    })?;
    Ok(decoded.into_owned())
}
