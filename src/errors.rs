//! Error types shared across the crate.
//!
//! Library entry points return `anyhow::Result` for flexibility at the
//! host boundary; structured variants live here so callers that need to
//! branch on a failure class can downcast.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TempmendError {
    /// Source text could not be parsed into a compilation unit.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = anyhow::Result<T>;
