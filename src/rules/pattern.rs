//! URL pattern matching.
//!
//! # Responsibilities
//! - Compile a pattern source as a case-insensitive regex
//! - Fall back to case-insensitive literal containment for invalid regexes
//! - Apply the configured policy for empty patterns
//!
//! # Design Decisions
//! - Unanchored: a pattern matches if it is found anywhere in the URL
//! - `/*.jpg` is a regex, not a glob: it finds any character followed by `jpg`

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// What an empty pattern (e.g. from `"/a,,/b"`) matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPatternPolicy {
    /// Empty patterns match every URL, as an empty regex would.
    #[default]
    MatchAll,
    /// Empty patterns match nothing.
    Ignore,
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    /// Lower-cased literal, used when the source is not a valid regex.
    Literal(String),
}

/// A single compiled URL pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    matcher: Matcher,
}

impl Pattern {
    /// Compile a pattern. The source is trimmed first. Never fails.
    pub fn new(source: &str) -> Self {
        let source = source.trim().to_string();
        let matcher = match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(regex) => Matcher::Regex(regex),
            Err(e) => {
                tracing::debug!(
                    pattern = %source,
                    error = %e,
                    "Pattern is not a valid regex, matching it literally"
                );
                Matcher::Literal(source.to_lowercase())
            }
        };

        Self { source, matcher }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.matcher, Matcher::Literal(_))
    }

    /// Returns true if the pattern is found anywhere in `decoded_url`.
    pub fn matches(&self, decoded_url: &str, empty_patterns: EmptyPatternPolicy) -> bool {
        if self.is_empty() {
            return empty_patterns == EmptyPatternPolicy::MatchAll;
        }

        match &self.matcher {
            Matcher::Regex(regex) => regex.is_match(decoded_url),
            Matcher::Literal(needle) => decoded_url.to_lowercase().contains(needle.as_str()),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

#[cfg(test)]
mod tests {
    use super::*;

    const IGNORE: EmptyPatternPolicy = EmptyPatternPolicy::Ignore;

    #[test]
    fn test_regex_pattern_case_insensitive() {
        let pattern = Pattern::new("/api/");
        assert!(pattern.matches("/API/users", IGNORE));
        assert!(pattern.matches("/v1/api/users", IGNORE));
        assert!(!pattern.matches("/static/app.js", IGNORE));
    }

    #[test]
    fn test_glob_like_pattern_behaves_as_regex() {
        let pattern = Pattern::new("/*.jpg");
        assert!(pattern.matches("/images/cat.JPG", IGNORE));
        assert!(pattern.matches("/photo-jpg", IGNORE));
        assert!(!pattern.matches("/images/cat.gif", IGNORE));
    }

    #[test]
    fn test_invalid_regex_falls_back_to_literal() {
        let pattern = Pattern::new("/files/[draft");
        assert!(pattern.is_literal());
        assert!(pattern.matches("/FILES/[Draft/notes.txt", IGNORE));
        assert!(!pattern.matches("/files/draft", IGNORE));
    }

    #[test]
    fn test_source_is_trimmed() {
        assert_eq!(Pattern::new("  /a  ").source(), "/a");
    }

    #[test]
    fn test_empty_pattern_policy() {
        let pattern = Pattern::new("   ");
        assert!(pattern.is_empty());
        assert!(pattern.matches("/anything", EmptyPatternPolicy::default()));
        assert!(!pattern.matches("/anything", EmptyPatternPolicy::Ignore));
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: EmptyPatternPolicy,
        }

        let w: Wrapper = toml::from_str(r#"policy = "ignore""#).unwrap();
        assert_eq!(w.policy, EmptyPatternPolicy::Ignore);
    }
}
