//! Header rules.
//!
//! # Data Flow
//! ```text
//! Raw secret entry ("/*.jpg,/*.png" = "cache-control: max-age=60; x-a: b")
//!     → parser.rs (split patterns on ',' and headers on ';')
//!     → pattern.rs (compile each pattern, case-insensitive)
//!     → Rule (immutable, shared via Arc in the resolver cache)
//! ```
//!
//! # Design Decisions
//! - Parsing never fails: malformed input degrades to a partial rule
//! - Patterns are compiled once, when the rule is built
//! - A rule matches when any one of its patterns matches

pub mod headers;
pub mod parser;
pub mod pattern;

pub use headers::HeaderSet;
pub use parser::{DefaultRuleParser, RuleParser};
pub use pattern::{EmptyPatternPolicy, Pattern};

/// A set of patterns paired with the headers to apply when any of them match.
#[derive(Debug, Clone)]
pub struct Rule {
    patterns: Vec<Pattern>,
    headers: HeaderSet,
}

impl Rule {
    pub fn new(patterns: Vec<Pattern>, headers: HeaderSet) -> Self {
        Self { patterns, headers }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// The trimmed pattern sources, in declaration order.
    pub fn pattern_sources(&self) -> Vec<&str> {
        self.patterns.iter().map(Pattern::source).collect()
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Returns true if any pattern matches the already decoded URL.
    pub fn matches(&self, decoded_url: &str, empty_patterns: EmptyPatternPolicy) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches(decoded_url, empty_patterns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_matches_any_pattern() {
        let rule = DefaultRuleParser.parse("/*.jpg, /*.png", "x-a: 1");

        assert!(rule.matches("/img/logo.PNG", EmptyPatternPolicy::Ignore));
        assert!(rule.matches("/img/photo.jpg", EmptyPatternPolicy::Ignore));
        assert!(!rule.matches("/index.html", EmptyPatternPolicy::Ignore));
    }

    #[test]
    fn test_rule_without_patterns_never_matches() {
        let rule = Rule::new(Vec::new(), HeaderSet::default());
        assert!(!rule.matches("/anything", EmptyPatternPolicy::MatchAll));
    }
}
