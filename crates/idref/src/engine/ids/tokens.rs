use crate::engine::runtime::Error;
use compact_str::CompactString;
use core::fmt;
use itertools::Itertools;
use std::collections::HashSet;

/// XML whitespace: space, tab, carriage return, line feed.
fn is_xml_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Non-empty whitespace-separated tokens of `s`.
pub fn xml_tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(is_xml_ws).filter(|t| !t.is_empty())
}

/// Deduplicated identifier tokens requested by a single resolution.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: HashSet<CompactString>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the tokens of every value produced by `source`.
    ///
    /// The first `Err` item aborts collection and is returned unchanged.
    pub fn from_source<I, S>(source: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Result<S, Error>>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for value in source {
            set.insert_tokens(value?.as_ref());
        }
        Ok(set)
    }

    /// Splits `value` on whitespace and adds each token.
    pub fn insert_tokens(&mut self, value: &str) {
        for t in xml_tokens(value) {
            if !self.tokens.contains(t) {
                self.tokens.insert(CompactString::from(t));
            }
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// True if any whitespace token of `value` is in the set.
    pub fn matches_any(&self, value: &str) -> bool {
        xml_tokens(value).any(|t| self.contains(t))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in sorted order, used as index lookup keys.
    pub fn request_keys(&self) -> Vec<CompactString> {
        self.tokens.iter().sorted().cloned().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TokenSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = Self::new();
        for v in iter {
            set.insert_tokens(v.as_ref());
        }
        set
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenSet{{{}}}", self.tokens.iter().sorted().join(", "))
    }
}
