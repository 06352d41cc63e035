//! Error types for versicle operations.

use thiserror::Error;

use crate::codec::PhraseId;

/// Errors that can occur while encoding references, normalizing verse
/// numbering, or assembling content trees.
///
/// None of these are retried internally: a failed book import or query
/// aborts atomically and the error propagates to the caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown book code: {0}")]
    UnknownBook(String),

    #[error("invalid book id: {0} (valid ids are 1-87, excluding 67-69)")]
    InvalidBookId(u64),

    #[error("{field} value {value} exceeds its packed field width")]
    FieldOverflow { field: &'static str, value: u64 },

    #[error("malformed versification test: {0:?}")]
    InvalidRuleTest(String),

    #[error("duplicate normalized reference {0} during book import")]
    DuplicateNormalizedReference(u64),

    #[error("structural corruption at phrase {phrase}: {detail}")]
    StructuralCorruption { phrase: PhraseId, detail: String },
}

pub type Result<T> = std::result::Result<T, Error>;
