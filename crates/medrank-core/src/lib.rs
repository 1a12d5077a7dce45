//! Core types and error definitions for the Medrank reranking engine.
//!
//! This crate provides the foundational types shared across all Medrank crates,
//! including error handling, the candidate document record, and the closed set
//! of reranking strategies.
//!
//! # Main types
//!
//! - [`MedrankError`] — Unified error enum for all Medrank subsystems.
//! - [`MedrankResult`] — Convenience alias for `Result<T, MedrankError>`.
//! - [`Document`] — A retrieved chunk plus the scores attached while reranking.
//! - [`RankingTag`] — Which single-scorer fusion produced a `combined_score`.
//! - [`RerankingMethod`] — The hybrid strategy the orchestrator applies.

/// Candidate document record and score annotations.
pub mod document;
/// Reranking strategy selector.
pub mod method;

pub use document::{Document, RankingTag};
pub use method::RerankingMethod;

// --- Error types ---

/// Top-level error type for the Medrank engine.
///
/// Scoring itself never fails; errors surface only while validating
/// configuration or moving data in and out of the engine.
#[derive(Debug, thiserror::Error)]
pub enum MedrankError {
    /// Malformed configuration, rejected before any scoring happens.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`MedrankError`].
pub type MedrankResult<T> = Result<T, MedrankError>;
