//! # Error Types
//!
//! Structural errors raised while interpreting alias definitions. All
//! errors use `thiserror` for derive-based `Display` and `Error`.
//!
//! Absence of data in a resource document is never an error anywhere in
//! the workspace; these types describe malformed *definitions* only.

use thiserror::Error;

/// A declared or concrete property path could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathSyntaxError {
    /// The path string is empty.
    #[error("property path is empty")]
    Empty,

    /// Two separators with nothing between them, or a leading/trailing `/`.
    #[error("empty segment at position {position} in '{path}'")]
    EmptySegment {
        /// The offending path.
        path: String,
        /// Zero-based segment index.
        position: usize,
    },

    /// A `[` without a closing `]`, or a stray `]`.
    #[error("unbalanced bracket in segment '{segment}' of '{path}'")]
    UnbalancedBracket {
        /// The offending path.
        path: String,
        /// The raw segment containing the bracket.
        segment: String,
    },

    /// Bracket contents that are neither `*` nor an array index.
    #[error("invalid selector '[{selector}]' in '{path}': expected '[*]' or '[<index>]'")]
    InvalidSelector {
        /// The offending path.
        path: String,
        /// The text between the brackets.
        selector: String,
    },
}

/// A pattern violates its declaration invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// `phrase` is empty.
    #[error("pattern phrase is empty")]
    EmptyPhrase,

    /// An `Extract` pattern without a variable name.
    #[error("extract pattern '{phrase}' declares no variable")]
    MissingVariable {
        /// The pattern phrase.
        phrase: String,
    },

    /// The `{variable}` placeholder occurs more than once in the phrase.
    #[error("placeholder '{{{variable}}}' occurs more than once in '{phrase}'")]
    RepeatedPlaceholder {
        /// The pattern phrase.
        phrase: String,
        /// The variable name.
        variable: String,
    },
}
