//! # Property Path Grammar
//!
//! Alias paths are `/`-separated property names with optional bracket
//! selectors:
//!
//! ```text
//! properties/accessTier
//! properties/ipRules[*]/value
//! properties/securityRules[0]/name
//! tags/[*]
//! ```
//!
//! A named segment is joined to its predecessor with `/`; a bracket segment
//! attaches directly to the preceding segment. `[*]` is a wildcard step
//! (any array element or object key); `[N]` selects a fixed array index.
//!
//! Declared paths are parsed strictly into [`PathStep`]s by
//! [`PropertyPath::parse`]. Concrete paths (resolver output, which may
//! carry pattern-rewritten bracket text such as `[rule1]`) are split
//! leniently into [`PathToken`]s by [`tokenize`].
//!
//! Segment text taken from a document (object keys, bound pattern values)
//! may contain the grammar's own delimiters. [`escape_segment`]
//! percent-encodes `%`, `/`, `[` and `]` so that such text always
//! tokenizes back into exactly one segment.

use std::borrow::Cow;
use std::fmt;

use crate::error::PathSyntaxError;

/// How a segment attaches to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// Joined with `/` (named segments).
    Slash,
    /// Appended directly (bracket segments).
    Attached,
}

/// A lexical segment of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    /// A property name.
    Name(String),
    /// The text between `[` and `]`.
    Bracket(String),
}

impl PathToken {
    /// Separator used when rendering this token.
    pub fn separator(&self) -> Separator {
        match self {
            Self::Name(_) => Separator::Slash,
            Self::Bracket(_) => Separator::Attached,
        }
    }
}

/// A parsed step of a declared path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Descend into an object property.
    Key(String),
    /// Descend into a fixed array index.
    Index(usize),
    /// Enumerate every array element or object key.
    Wildcard,
}

impl PathStep {
    /// Whether this step matches a token of a concrete path.
    ///
    /// A wildcard matches any bracket (array element, possibly rewritten)
    /// and any name (object key).
    pub fn matches(&self, token: &PathToken) -> bool {
        match (self, token) {
            (Self::Wildcard, _) => true,
            (Self::Key(key), PathToken::Name(name)) => key == name,
            (Self::Index(index), PathToken::Bracket(text)) => text.parse::<usize>().ok() == Some(*index),
            _ => false,
        }
    }
}

/// A declared alias property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    raw: String,
    steps: Vec<PathStep>,
}

impl PropertyPath {
    /// Parse a declared path.
    ///
    /// # Errors
    ///
    /// Returns [`PathSyntaxError`] for empty paths or segments, unbalanced
    /// brackets, and selectors other than `*` or a decimal index.
    pub fn parse(path: &str) -> Result<Self, PathSyntaxError> {
        let steps = tokenize(path)?
            .into_iter()
            .map(|token| match token {
                PathToken::Name(name) => Ok(PathStep::Key(name)),
                PathToken::Bracket(selector) if selector == "*" => Ok(PathStep::Wildcard),
                PathToken::Bracket(selector) => selector
                    .parse::<usize>()
                    .map(PathStep::Index)
                    .map_err(|_| PathSyntaxError::InvalidSelector {
                        path: path.to_string(),
                        selector,
                    }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: path.to_string(),
            steps,
        })
    }

    /// The path exactly as declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed steps in order.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Whether any step is a wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.steps.iter().any(|s| matches!(s, PathStep::Wildcard))
    }

    /// Whether a concrete path is an instance of this declared path.
    pub fn matches_concrete(&self, tokens: &[PathToken]) -> bool {
        self.steps.len() == tokens.len()
            && self.steps.iter().zip(tokens).all(|(step, token)| step.matches(token))
    }
}

impl fmt::Display for PropertyPath {
    /// Canonical rendering; `a/[*]/b` renders as `a[*]/b`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = render(self.steps.iter().map(|step| match step {
            PathStep::Key(key) => (Separator::Slash, key.clone()),
            PathStep::Index(index) => (Separator::Attached, format!("[{index}]")),
            PathStep::Wildcard => (Separator::Attached, "[*]".to_string()),
        }));
        f.write_str(&rendered)
    }
}

/// Split a path into tokens without interpreting bracket contents.
///
/// # Errors
///
/// Returns [`PathSyntaxError`] for empty paths or segments and unbalanced
/// brackets.
pub fn tokenize(path: &str) -> Result<Vec<PathToken>, PathSyntaxError> {
    if path.is_empty() {
        return Err(PathSyntaxError::Empty);
    }

    let unbalanced = |segment: &str| PathSyntaxError::UnbalancedBracket {
        path: path.to_string(),
        segment: segment.to_string(),
    };

    let mut tokens = Vec::new();
    for (position, segment) in path.split('/').enumerate() {
        if segment.is_empty() {
            return Err(PathSyntaxError::EmptySegment {
                path: path.to_string(),
                position,
            });
        }

        let (name, mut rest) = match segment.find('[') {
            Some(open) => segment.split_at(open),
            None => (segment, ""),
        };
        if name.contains(']') {
            return Err(unbalanced(segment));
        }
        if !name.is_empty() {
            tokens.push(PathToken::Name(name.to_string()));
        }

        while !rest.is_empty() {
            // `rest` always starts with '[' here.
            let close = rest.find(']').ok_or_else(|| unbalanced(segment))?;
            let selector = &rest[1..close];
            if selector.contains('[') {
                return Err(unbalanced(segment));
            }
            tokens.push(PathToken::Bracket(selector.to_string()));
            rest = &rest[close + 1..];
            if !rest.is_empty() && !rest.starts_with('[') {
                return Err(unbalanced(segment));
            }
        }
    }

    Ok(tokens)
}

/// Percent-encode the characters that delimit path segments.
///
/// `%` is encoded too, so distinct inputs never collide.
pub fn escape_segment(text: &str) -> Cow<'_, str> {
    if !text.contains(|c: char| matches!(c, '%' | '/' | '[' | ']')) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '[' => out.push_str("%5B"),
            ']' => out.push_str("%5D"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Join rendered segments: named segments with `/`, bracket segments
/// appended directly. The first segment never gets a leading `/`.
pub fn render<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = (Separator, S)>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (separator, text) in segments {
        if separator == Separator::Slash && !out.is_empty() {
            out.push('/');
        }
        out.push_str(text.as_ref());
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every concrete instantiation of a wildcard path matches it.
        #[test]
        fn wildcard_instances_match_declared(
            names in prop::collection::vec("[a-zA-Z][a-zA-Z0-9]{0,8}", 1..5),
            index in 0usize..1000,
            key in "[a-z0-9-]{1,10}",
        ) {
            let base = names.join("/");
            let declared = PropertyPath::parse(&format!("{base}[*]/leaf")).unwrap();
            let by_index = tokenize(&format!("{base}[{index}]/leaf")).unwrap();
            let by_key = tokenize(&format!("{base}[{key}]/leaf")).unwrap();
            prop_assert!(declared.matches_concrete(&by_index));
            prop_assert!(declared.matches_concrete(&by_key));

            let shorter = tokenize(&format!("{base}[{index}]")).unwrap();
            prop_assert!(!declared.matches_concrete(&shorter));
        }

        /// Canonical rendering parses back to the same steps.
        #[test]
        fn canonical_rendering_is_stable(
            names in prop::collection::vec("[a-z]{1,6}", 1..4),
            wildcard in any::<bool>(),
        ) {
            let selector = if wildcard { "/[*]" } else { "/[0]" };
            let raw = format!("{}{selector}", names.join("/"));
            let parsed = PropertyPath::parse(&raw).unwrap();
            let reparsed = PropertyPath::parse(&parsed.to_string()).unwrap();
            prop_assert_eq!(parsed.steps(), reparsed.steps());
        }
    }
}
