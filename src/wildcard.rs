//! Shell-style wildcard matching over type identifiers
//!
//! `*` matches any run of characters, `?` matches exactly one character and
//! everything else is literal. Matching is always against the full candidate.

use regex::Regex;

use crate::error::PatternError;

/// A compiled wildcard pattern
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    pattern: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Compile a wildcard pattern
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let regex = wildcard_to_regex(pattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Check whether the whole candidate matches
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Source pattern
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

/// Translate a wildcard into an anchored regex
pub fn wildcard_to_regex(pattern: &str) -> Result<Regex, PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }

    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push_str("(?s)^");

    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '*' | '?' => {
                expr.push_str(&regex::escape(&literal));
                literal.clear();
                expr.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    expr.push_str(&regex::escape(&literal));
    expr.push('$');

    Regex::new(&expr).map_err(|source| PatternError::Regex {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, candidate: &str) -> bool {
        WildcardPattern::compile(pattern).unwrap().is_match(candidate)
    }

    #[test]
    fn test_star_requires_literal_prefix() {
        assert!(matches("Foo.*", "Foo.Bar"));
        assert!(matches("Foo.*", "Foo."));
        assert!(!matches("Foo.*", "Foo"));
        assert!(!matches("Foo.*", "FooXBar"));
    }

    #[test]
    fn test_question_mark_single_char() {
        assert!(matches("F?o", "Foo"));
        assert!(matches("F?o", "F.o"));
        assert!(!matches("F?o", "Fo"));
        assert!(!matches("F?o", "Fooo"));
    }

    #[test]
    fn test_full_match_only() {
        assert!(!matches("actions", "ids_loader::actions::LogAction"));
        assert!(matches("*actions*", "ids_loader::actions::LogAction"));
        assert!(matches("ids_loader::actions::*", "ids_loader::actions::LogAction"));
        assert!(!matches("ids_loader::actions::*", "corp::actions::PagerAction"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        assert!(matches("a+b(c)[d]$", "a+b(c)[d]$"));
        assert!(!matches("a+b", "aab"));
        assert!(matches("x^*", "x^anything"));
        assert!(matches(r"back\slash", r"back\slash"));
    }

    #[test]
    fn test_star_spans_newlines() {
        assert!(matches("a*b", "a\nb"));
        assert!(matches("*", ""));
        assert!(!matches("?", ""));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(WildcardPattern::compile(""), Err(PatternError::Empty)));
    }
}
