//! Rule parsing from raw secret entries.
//!
//! The entry key is a comma separated pattern list:
//!
//! ```text
//! /*.jpg,/*.png,/*.webp
//! ```
//!
//! The entry value is a semicolon separated list of `name: value` headers:
//!
//! ```text
//! access-control-allow-credentials:true; access-control-allow-methods: GET,PUT,POST
//! ```

use crate::rules::{HeaderSet, Pattern, Rule};

/// Turns a raw `(patterns, headers)` pair into a [`Rule`].
///
/// Implementations must not fail: any input yields a rule, possibly empty.
pub trait RuleParser: Send + Sync + std::fmt::Debug {
    fn parse(&self, patterns: &str, headers: &str) -> Rule;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRuleParser;

impl RuleParser for DefaultRuleParser {
    fn parse(&self, patterns: &str, headers: &str) -> Rule {
        // Empty tokens are kept; EmptyPatternPolicy decides what they match.
        let patterns = patterns.split(',').map(Pattern::new).collect();

        let mut header_set = HeaderSet::new();
        for declaration in headers.split(';') {
            let Some((name, value)) = declaration.trim().split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            header_set.insert(name, value.trim());
        }

        Rule::new(patterns, header_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_of(rule: &Rule) -> Vec<(&str, &str)> {
        rule.headers().iter().collect()
    }

    #[test]
    fn test_parse_patterns_and_headers() {
        let rule = DefaultRuleParser.parse(
            "/*.jpg,/*.png",
            "access-control-allow-credentials:true; access-control-allow-headers:*",
        );

        assert_eq!(rule.pattern_sources(), vec!["/*.jpg", "/*.png"]);
        assert_eq!(
            headers_of(&rule),
            vec![
                ("access-control-allow-credentials", "true"),
                ("access-control-allow-headers", "*"),
            ]
        );
    }

    #[test]
    fn test_declaration_without_colon_is_dropped() {
        let rule = DefaultRuleParser.parse("/*.jpg", "malformed-no-colon");

        assert_eq!(rule.pattern_sources(), vec!["/*.jpg"]);
        assert!(rule.headers().is_empty());
    }

    #[test]
    fn test_value_split_on_first_colon_only() {
        let rule = DefaultRuleParser.parse(
            "/",
            "access-control-allow-origin: https://example.com:8443",
        );
        assert_eq!(
            rule.headers().get("access-control-allow-origin"),
            Some("https://example.com:8443")
        );
    }

    #[test]
    fn test_comma_inside_header_value_is_kept() {
        let rule = DefaultRuleParser.parse(
            "/api",
            "access-control-allow-methods: GET,PUT,POST,DELETE",
        );
        assert_eq!(
            rule.headers().get("access-control-allow-methods"),
            Some("GET,PUT,POST,DELETE")
        );
    }

    #[test]
    fn test_later_duplicate_header_overwrites() {
        let rule = DefaultRuleParser.parse("/", "x-a: 1; x-b: 2; x-a: 3");
        assert_eq!(headers_of(&rule), vec![("x-a", "3"), ("x-b", "2")]);
    }

    #[test]
    fn test_empty_tokens_are_preserved() {
        let rule = DefaultRuleParser.parse("/*.jpg,,/*.png,", "");
        assert_eq!(rule.pattern_sources(), vec!["/*.jpg", "", "/*.png", ""]);
        assert!(rule.headers().is_empty());
    }

    #[test]
    fn test_blank_and_nameless_declarations() {
        let rule = DefaultRuleParser.parse(" /a ", " ; : orphan ;x-ok:  yes ;");
        assert_eq!(rule.pattern_sources(), vec!["/a"]);
        assert_eq!(headers_of(&rule), vec![("x-ok", "yes")]);
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let rule = DefaultRuleParser.parse("/", "x-empty:");
        assert_eq!(headers_of(&rule), vec![("x-empty", "")]);
    }
}
