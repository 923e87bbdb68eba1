//! # Common Types and Utilities
//!
//! This module provides the error handling infrastructure shared by every
//! stage of the ingestion pipeline. Each stage wraps the failure of its
//! underlying library or transport call into a stage-specific error kind,
//! preserving the original message as context; nothing is retried or
//! recovered locally.

pub type IngestResult<R> = Result<R, IngestError>;

/// Represents errors that can occur during certificate ingestion
///
/// One variant per pipeline stage, plus a configuration variant for the
/// cold-start wiring. The payload carries the underlying error message.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum IngestError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("certificate parse failed: {0}")]
    Parse(String),
    #[error("unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("persistence failed: {0}")]
    Persistence(String),
    #[error("configuration error: {0}")]
    Config(String),
}
