// ── Atoms: Error Types ─────────────────────────────────────────────────────
// Single canonical error enum for the engine, built with `thiserror`.
//
// Design rules:
//   • Variants are coarse-grained by domain (validation, pattern, storage…).
//   • `#[from]` wires the rusqlite conversion automatically; storage errors
//     propagate unchanged — the engine performs no retries of its own.
//   • Empty results are never errors. A query that matches nothing returns
//     an empty collection.

use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TaxonomyError {
    /// Malformed caller input: over-long tag strings, text that normalizes
    /// to nothing, non-numeric seed ids.
    #[error("validation error: {0}")]
    Validation(String),

    /// A pattern string that does not parse: unknown role token, or fewer
    /// than two roles.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// An operation that would break referential integrity — most notably
    /// any attempt to rename a tag, which is rejected unconditionally.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// SQLite / rusqlite failure, propagated unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Catch-all for errors that do not yet have a dedicated variant.
    /// Prefer adding a specific variant over using this in new code.
    #[error("{0}")]
    Other(String),
}

// ── Convenience constructors ───────────────────────────────────────────────

impl TaxonomyError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn pattern(message: impl Into<String>) -> Self {
        Self::InvalidPattern(message.into())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity(message.into())
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All engine operations return this type.
pub type TaxonomyResult<T> = Result<T, TaxonomyError>;
