//! Expression templates.
//!
//! A template is an expression in the execution engine's own language with
//! `${name}` placeholders. Placeholders name either the row id column or a
//! base column; they are the only part of the text this crate interprets.
//! Rendering splices each referenced value in as a literal and the result is
//! forwarded to the engine unchanged.

use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Placeholder(usize),
}

/// A parsed expression template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    /// Distinct placeholder names in order of first appearance.
    names: Vec<String>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut names: Vec<String> = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let text = &source[last..whole.start()];
            check_no_stray_marker(text)?;
            if !text.is_empty() {
                segments.push(Segment::Text(text.to_string()));
            }
            let slot = match names.iter().position(|n| n == name.as_str()) {
                Some(slot) => slot,
                None => {
                    names.push(name.as_str().to_string());
                    names.len() - 1
                }
            };
            segments.push(Segment::Placeholder(slot));
            last = whole.end();
        }

        let tail = &source[last..];
        check_no_stray_marker(tail)?;
        if !tail.is_empty() {
            segments.push(Segment::Text(tail.to_string()));
        }

        if source.trim().is_empty() {
            return Err("expression must not be empty".to_string());
        }

        Ok(Self {
            source: source.to_string(),
            segments,
            names,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Distinct placeholder names, in order of first appearance.
    pub fn placeholders(&self) -> &[String] {
        &self.names
    }

    /// Substitute placeholder values.
    ///
    /// `literals[i]` is the rendered value for `placeholders()[i]`.
    pub fn render(&self, literals: &[String]) -> String {
        let mut out = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(slot) => {
                    if let Some(literal) = literals.get(*slot) {
                        out.push_str(literal);
                    }
                }
            }
        }
        out
    }
}

fn check_no_stray_marker(text: &str) -> Result<(), String> {
    if text.contains("${") {
        return Err(format!(
            "malformed placeholder near '{}'; placeholders look like ${{column_name}}",
            text.trim()
        ));
    }
    Ok(())
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_placeholders_in_order() {
        let t = Template::parse("${price} * ${qty} + ${price} / ${ id }").unwrap();
        assert_eq!(t.placeholders(), &["price", "qty", "id"]);
    }

    #[test]
    fn test_render_substitutes_every_occurrence() {
        let t = Template::parse("concat(${a}, '-', ${b}, ${a})").unwrap();
        let out = t.render(&["'x'".to_string(), "7".to_string()]);
        assert_eq!(out, "concat('x', '-', 7, 'x')");
    }

    #[test]
    fn test_plain_expression_has_no_placeholders() {
        let t = Template::parse("rand() * 10").unwrap();
        assert!(t.placeholders().is_empty());
        assert_eq!(t.render(&[]), "rand() * 10");
    }

    #[test]
    fn test_malformed_placeholders_are_rejected() {
        assert!(Template::parse("${a").is_err());
        assert!(Template::parse("${1abc} + 1").is_err());
        assert!(Template::parse("  ").is_err());
    }
}
