//! Name patterns: literal substrings or `/.../` regular expressions.

use std::collections::HashMap;
use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};

/// Flags accepted after the closing delimiter of a regex pattern.
const REGEX_FLAGS: &str = "imsx";

/// A compiled name pattern.
///
/// Text wrapped in slashes (`/java\.lang/`, optionally followed by `i`, `m`,
/// `s` or `x` flags) is a regular expression searched anywhere in the name.
/// Any other text matches names that contain it as a substring. `//` is the
/// empty expression and matches every name.
#[derive(Debug, Clone)]
pub struct Pattern {
    text: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    Regex(Regex),
}

impl Pattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the text is delimited as a regular
    /// expression but does not compile.
    pub fn parse(text: &str) -> Result<Self> {
        let matcher = match split_delimited(text) {
            Some((expr, flags)) => {
                let regex = RegexBuilder::new(expr)
                    .case_insensitive(flags.contains('i'))
                    .multi_line(flags.contains('m'))
                    .dot_matches_new_line(flags.contains('s'))
                    .ignore_whitespace(flags.contains('x'))
                    .build()
                    .map_err(|source| Error::InvalidPattern {
                        pattern: text.to_string(),
                        source,
                    })?;
                Matcher::Regex(regex)
            }
            None => Matcher::Literal(text.to_string()),
        };

        Ok(Self {
            text: text.to_string(),
            matcher,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// `true` for the `/.../` form.
    #[must_use]
    pub fn is_regex(&self) -> bool {
        matches!(self.matcher, Matcher::Regex(_))
    }

    /// Test a fully-qualified name against the pattern.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(needle) => name.contains(needle.as_str()),
            Matcher::Regex(regex) => regex.is_match(name),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Split `/expr/flags` into `(expr, flags)`. `None` for literal text.
fn split_delimited(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('/')?;
    let close = rest.rfind('/')?;
    let flags = &rest[close + 1..];
    if flags.chars().all(|c| REGEX_FLAGS.contains(c)) {
        Some((&rest[..close], flags))
    } else {
        None
    }
}

/// Per-criteria cache of compiled patterns, keyed by pattern text.
///
/// Owned by one [`SelectionCriteria`](super::SelectionCriteria); nothing is
/// shared between criteria instances.
#[derive(Debug, Clone, Default)]
pub(crate) struct PatternCache {
    compiled: HashMap<String, Pattern>,
}

impl PatternCache {
    /// Compile a whole list, reusing earlier compilations of the same text.
    ///
    /// Nothing is cached unless every pattern in the list compiles.
    pub(crate) fn compile_all<I, S>(&mut self, texts: I) -> Result<Vec<Pattern>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fresh = Vec::new();
        let mut patterns = Vec::new();

        for text in texts {
            let text = text.as_ref();
            let pattern = match self.compiled.get(text) {
                Some(pattern) => pattern.clone(),
                None => {
                    let pattern = Pattern::parse(text)?;
                    fresh.push(pattern.clone());
                    pattern
                }
            };
            patterns.push(pattern);
        }

        for pattern in fresh {
            self.compiled.insert(pattern.text.clone(), pattern);
        }
        Ok(patterns)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.compiled.len()
    }
}
