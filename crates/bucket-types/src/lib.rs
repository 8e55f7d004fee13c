//! # bucket-types
//!
//! Wire-level types exchanged between the storage miner, the verifier and the
//! chain client when proving data possession.
//!
//! Big integers never appear natively here: coefficients, authenticator
//! values and proof outputs are carried as base-10 strings so that the JSON
//! payloads stay byte-compatible with existing verifiers. Conversion to a
//! big-integer type happens inside `bucket-pdp`.
//!
//! ## Modules
//!
//! - [`challenge`] — Challenge elements `(I, V)` and challenge sequences
//! - [`tag`] — Per-fragment homomorphic authenticator tags
//! - [`response`] — Proof responses, status codes and aggregated proofs

pub mod challenge;
pub mod response;
pub mod tag;

pub use challenge::{Challenge, QElement};
pub use response::{AggregatedProof, ProofResponse, StatusCode, StatusMsg};
pub use tag::{Tag, TagInner};

/// Error types for wire-type conversions.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// A numeric status code has no known meaning.
    #[error("unknown status code: {0}")]
    UnknownStatusCode(i32),

    /// A JSON payload could not be decoded.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Convenience result type for wire-type conversions.
pub type Result<T> = std::result::Result<T, TypesError>;
