//! Combined `{{NAME}}` matcher over a set of placeholder names.
//!
//! One regex per name set: `\{\{(NAME_A|NAME_B|…)\}\}`. Names are escaped, so
//! `.`, `+`, `$` and friends match themselves. Alternatives are ordered
//! longest first: with leftmost-first alternation this guarantees that
//! `{{CLIENT_NAME}}` is matched as `CLIENT_NAME` even when `CLIENT` is also a
//! name.

use std::ops::Range;

use regex::Regex;

/// A compiled token matcher.
#[derive(Debug, Clone)]
pub struct PlaceholderMatcher {
    regex: Regex,
}

/// One `{{NAME}}` occurrence inside a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch<'t> {
    /// Byte range of the whole token, braces included.
    pub range: Range<usize>,
    /// The name between the braces.
    pub name: &'t str,
}

impl PlaceholderMatcher {
    /// Build a matcher for `names`.
    ///
    /// Returns `None` when there is nothing to match (no names, or only empty
    /// ones), which callers treat as the identity transform.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut names: Vec<&str> = names.into_iter().filter(|n| !n.is_empty()).collect();
        if names.is_empty() {
            return None;
        }
        // Longest first; ties by name so the pattern is deterministic.
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names.dedup();

        let alternation = names
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"\{{\{{({alternation})\}}\}}");

        match Regex::new(&pattern) {
            Ok(regex) => Some(Self { regex }),
            Err(e) => {
                // Escaped literals only; reachable just for absurdly large name sets.
                tracing::warn!("placeholder matcher failed to compile: {e}");
                None
            }
        }
    }

    /// All non-overlapping tokens in `text`, left to right.
    pub fn find_iter<'t>(&self, text: &'t str) -> impl Iterator<Item = TokenMatch<'t>> {
        self.regex.captures_iter(text).filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(TokenMatch {
                range: whole.range(),
                name: name.as_str(),
            })
        })
    }

    /// Whether `text` contains at least one token.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The compiled pattern (for diagnostics).
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(m: &PlaceholderMatcher, text: &str) -> Vec<String> {
        m.find_iter(text).map(|t| t.name.to_string()).collect()
    }

    #[test]
    fn test_no_names_no_matcher() {
        assert!(PlaceholderMatcher::new(std::iter::empty::<&str>()).is_none());
        assert!(PlaceholderMatcher::new([""]).is_none());
    }

    #[test]
    fn test_finds_all_matches_in_run() {
        let m = PlaceholderMatcher::new(["A", "B"]).unwrap();
        assert_eq!(names(&m, "{{A}} x {{B}} y {{A}}"), vec!["A", "B", "A"]);
    }

    #[test]
    fn test_ranges_cover_braces() {
        let m = PlaceholderMatcher::new(["NAME"]).unwrap();
        let found: Vec<TokenMatch> = m.find_iter("Hi {{NAME}}!").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].range, 3..11);
    }

    #[test]
    fn test_longest_name_wins() {
        let m = PlaceholderMatcher::new(["CLIENT", "CLIENT_NAME"]).unwrap();
        assert_eq!(names(&m, "{{CLIENT_NAME}} / {{CLIENT}}"), vec!["CLIENT_NAME", "CLIENT"]);
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let m = PlaceholderMatcher::new(["a.b", "x+", "$y"]).unwrap();
        assert_eq!(names(&m, "{{a.b}} {{axb}} {{x+}} {{xx}} {{$y}}"), vec!["a.b", "x+", "$y"]);
    }

    #[test]
    fn test_case_sensitive() {
        let m = PlaceholderMatcher::new(["Name"]).unwrap();
        assert!(!m.is_match("{{NAME}}"));
        assert!(m.is_match("{{Name}}"));
    }

    #[test]
    fn test_unknown_names_ignored() {
        let m = PlaceholderMatcher::new(["A"]).unwrap();
        assert!(names(&m, "{{B}} {A} {{ A }}").is_empty());
    }

    #[test]
    fn test_duplicate_names_collapse() {
        let m = PlaceholderMatcher::new(["A", "A"]).unwrap();
        assert_eq!(m.as_str(), r"\{\{(A)\}\}");
    }
}
