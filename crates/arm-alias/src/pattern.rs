//! # Pattern Matcher
//!
//! Compiles an alias [`Pattern`] into a segment matcher and applies it.
//!
//! ## Matching Rules
//!
//! Matching is case-sensitive and operates on one rendered path segment at
//! a time (`ipRules`, `[0]`, `[rule1]`).
//!
//! - `Extract` with a `{variable}` placeholder: the segment must start with
//!   the phrase text before the placeholder and end with the text after it;
//!   the non-empty middle is the capture. `[{name}]` matches `[0]` with
//!   capture `0`.
//! - `Extract` without a placeholder: the segment must equal the phrase;
//!   the whole segment is the capture.
//! - `Full`: the segment must start with the phrase text before any
//!   placeholder (the whole phrase when there is none). The whole segment
//!   is replaced.
//!
//! Both operations are pure.

use arm_core::{Pattern, PatternError, PatternType};

/// The outcome of a successful segment match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// A captured variable inside the segment.
    Extract {
        /// Segment text before the capture.
        prefix: String,
        /// The captured value.
        captured: String,
        /// Segment text after the capture.
        suffix: String,
    },
    /// The whole segment is to be replaced.
    Full {
        /// The matched segment.
        segment: String,
    },
}

impl MatchResult {
    /// The captured value, for `Extract` matches.
    pub fn captured(&self) -> Option<&str> {
        match self {
            Self::Extract { captured, .. } => Some(captured),
            Self::Full { .. } => None,
        }
    }

    /// The segment the match was taken from.
    pub fn segment(&self) -> String {
        match self {
            Self::Extract {
                prefix,
                captured,
                suffix,
            } => format!("{prefix}{captured}{suffix}"),
            Self::Full { segment } => segment.clone(),
        }
    }
}

/// A pattern whose phrase has been split around its placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    kind: PatternType,
    phrase: String,
    variable: String,
    /// `(before, after)` when the phrase contains `{variable}`.
    template: Option<(String, String)>,
}

impl CompiledPattern {
    /// Check the pattern invariants and split the phrase.
    ///
    /// # Errors
    ///
    /// - [`PatternError::EmptyPhrase`] when `phrase` is empty.
    /// - [`PatternError::MissingVariable`] for `Extract` without a variable.
    /// - [`PatternError::RepeatedPlaceholder`] when `{variable}` occurs twice.
    pub fn compile(pattern: &Pattern) -> Result<Self, PatternError> {
        if pattern.phrase.is_empty() {
            return Err(PatternError::EmptyPhrase);
        }
        if pattern.kind == PatternType::Extract && pattern.variable.is_empty() {
            return Err(PatternError::MissingVariable {
                phrase: pattern.phrase.clone(),
            });
        }

        let template = match pattern.placeholder() {
            Some(token) => {
                if pattern.phrase.matches(token.as_str()).count() > 1 {
                    return Err(PatternError::RepeatedPlaceholder {
                        phrase: pattern.phrase.clone(),
                        variable: pattern.variable.clone(),
                    });
                }
                pattern.phrase.split_once(token.as_str()).map(|(before, after)| {
                    (before.to_string(), after.to_string())
                })
            }
            None => None,
        };

        Ok(Self {
            kind: pattern.kind,
            phrase: pattern.phrase.clone(),
            variable: pattern.variable.clone(),
            template,
        })
    }

    /// The rewrite mode.
    pub fn kind(&self) -> PatternType {
        self.kind
    }

    /// The declared phrase.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// The variable name; empty for `Full` patterns without one.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Match one segment. `None` is the no-match outcome.
    pub fn match_segment(&self, segment: &str) -> Option<MatchResult> {
        match self.kind {
            PatternType::Extract => match &self.template {
                Some((before, after)) => {
                    if segment.len() <= before.len() + after.len() {
                        return None;
                    }
                    let captured = segment.strip_prefix(before.as_str())?.strip_suffix(after.as_str())?;
                    Some(MatchResult::Extract {
                        prefix: before.clone(),
                        captured: captured.to_string(),
                        suffix: after.clone(),
                    })
                }
                None => (segment == self.phrase).then(|| MatchResult::Extract {
                    prefix: String::new(),
                    captured: segment.to_string(),
                    suffix: String::new(),
                }),
            },
            PatternType::Full => {
                let literal = self
                    .template
                    .as_ref()
                    .map_or(self.phrase.as_str(), |(before, _)| before.as_str());
                segment.starts_with(literal).then(|| MatchResult::Full {
                    segment: segment.to_string(),
                })
            }
        }
    }

    /// Build the rewritten segment.
    ///
    /// `Extract` replaces only the captured portion; `Full` replaces the
    /// entire segment.
    pub fn substitute(&self, matched: &MatchResult, replacement: &str) -> String {
        splice(self.kind, matched, replacement)
    }
}

/// Match `segment` against `pattern`.
///
/// An invalid pattern never matches.
pub fn match_segment(pattern: &Pattern, segment: &str) -> Option<MatchResult> {
    CompiledPattern::compile(pattern).ok()?.match_segment(segment)
}

/// Rewrite a matched segment with `replacement`.
pub fn substitute(pattern: &Pattern, matched: &MatchResult, replacement: &str) -> String {
    splice(pattern.kind, matched, replacement)
}

fn splice(kind: PatternType, matched: &MatchResult, replacement: &str) -> String {
    match (kind, matched) {
        (PatternType::Extract, MatchResult::Extract { prefix, suffix, .. }) => {
            format!("{prefix}{replacement}{suffix}")
        }
        _ => replacement.to_string(),
    }
}
