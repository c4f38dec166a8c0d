//! Declare an error type for the relaynn-netdoc crate.

use thiserror::Error;

use crate::types::PolicyError;

/// An error that occurred while parsing a server descriptor.
///
/// Position-carrying variants report the 1-based line number within the
/// document that was being parsed.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// An empty line appeared where an item was expected.
    #[error("line {0}: empty line inside a descriptor")]
    EmptyLine(usize),

    /// A keyword contained characters that are not allowed in keywords.
    #[error("line {0}: invalid keyword")]
    BadKeyword(usize),

    /// A `-----BEGIN X-----` line was malformed.
    #[error("line {0}: malformed object begin tag")]
    BadObjectBeginTag(usize),

    /// A `-----END X-----` tag did not match its begin tag.
    #[error("line {0}: object end tag does not match begin tag")]
    BadObjectMismatchedTag(usize),

    /// A document ended in the middle of an object.
    #[error("line {0}: unterminated object")]
    UnterminatedObject(usize),

    /// An item that every server descriptor must contain was absent.
    #[error("missing required item: {0}")]
    MissingItem(&'static str),

    /// An item had fewer arguments than its keyword requires.
    #[error("line {line}: item {kwd:?} is missing argument {idx}")]
    MissingArgument {
        /// Keyword of the offending item.
        kwd: String,
        /// Zero-based index of the argument that was absent.
        idx: usize,
        /// Line of the offending item.
        line: usize,
    },

    /// An argument was present but could not be parsed.
    #[error("line {line}: bad argument for {kwd:?}: {msg}")]
    BadArgument {
        /// Keyword of the offending item.
        kwd: String,
        /// Line of the offending item.
        line: usize,
        /// Explanation of what was wrong with the argument.
        msg: String,
    },

    /// A relay nickname was empty, too long, or not ASCII alphanumeric.
    #[error("invalid relay nickname")]
    BadNickname,

    /// A relay fingerprint was not 40 hexadecimal digits.
    #[error("invalid relay fingerprint")]
    BadFingerprint,

    /// A timestamp was not in `YYYY-MM-DD HH:MM:SS` form.
    #[error("invalid timestamp: {0}")]
    BadTimestamp(String),

    /// An exit policy rule was malformed.
    #[error("invalid exit policy: {0}")]
    Policy(#[from] PolicyError),
}
