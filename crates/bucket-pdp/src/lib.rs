//! # bucket-pdp
//!
//! Provable Data Possession for the storage miner.
//!
//! A miner stores file fragments together with one homomorphic authenticator
//! per block (the fragment's tag). When the verifier challenges a fragment
//! with block indices and random coefficients, the miner answers with
//! `(MU, Sigma)`: the coefficient-weighted sum of the challenged blocks and the
//! product of the challenged authenticators raised to those coefficients,
//! modulo the RSA modulus `N`. Several fragments can be answered at once with
//! a single aggregated `Sigma`.
//!
//! ## Modules
//!
//! - [`split`] — Fixed-size block splitting with zero-padded tail
//! - [`params`] — RSA public parameters `(N, e)`
//! - [`parse`] — Decimal big-integer boundary parsing
//! - [`prover`] — Single-tag proof generation
//! - [`aggregate`] — Multi-tag `Sigma` aggregation
//! - [`attest`] — Optional tag attestation check
//! - [`service`] — Async prover facade for worker pools

use std::path::PathBuf;

use bucket_types::{ProofResponse, StatusCode};

pub mod aggregate;
pub mod attest;
pub mod params;
pub mod parse;
pub mod prover;
pub mod service;
pub mod split;

pub use aggregate::aggregate_proofs;
pub use attest::{HashAlgorithm, RsaAttestationVerifier, TagHasher, TagVerifier};
pub use params::PublicParams;
pub use prover::{gen_proof, generate_proof, generate_verified_proof, Proof};
pub use service::Prover;
pub use split::{split_bytes, split_file, BlockMatrix, Padding};

/// Error types for proof operations.
#[derive(Debug, thiserror::Error)]
pub enum PdpError {
    /// The fragment file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        source: std::io::Error,
    },

    /// Block size of zero.
    #[error("block size must be greater than zero")]
    InvalidBlockSize,

    /// A challenge element references a missing block or has a bad coefficient.
    #[error("malformed challenge element {position} (block {index}): {reason}")]
    MalformedChallenge {
        /// Position of the element within the challenge.
        position: usize,
        /// Block index the element refers to.
        index: u64,
        reason: String,
    },

    /// The tag does not match the block matrix or holds a bad authenticator.
    #[error("malformed tag: {reason}")]
    MalformedTag { reason: String },

    /// The tag's attestation signature did not verify.
    #[error("tag attestation invalid: {0}")]
    AttestationInvalid(String),

    /// The public parameters are unusable.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// One tag of an aggregation failed; the whole aggregate is void.
    #[error("aggregation failed at tag {tag_position} ({tag_name}): {source}")]
    Aggregate {
        /// Position of the failing tag in the input list.
        tag_position: usize,
        /// Name of the failing tag.
        tag_name: String,
        source: Box<PdpError>,
    },

    /// Worker failure unrelated to the inputs.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Discriminant of a [`PdpError`], stable across wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    InvalidBlockSize,
    MalformedChallenge,
    MalformedTag,
    AttestationInvalid,
    InvalidPublicKey,
    Internal,
}

impl PdpError {
    /// The kind of failure. Aggregation errors report the kind of the
    /// underlying tag failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PdpError::Io { .. } => ErrorKind::Io,
            PdpError::InvalidBlockSize => ErrorKind::InvalidBlockSize,
            PdpError::MalformedChallenge { .. } => ErrorKind::MalformedChallenge,
            PdpError::MalformedTag { .. } => ErrorKind::MalformedTag,
            PdpError::AttestationInvalid(_) => ErrorKind::AttestationInvalid,
            PdpError::InvalidPublicKey(_) => ErrorKind::InvalidPublicKey,
            PdpError::Aggregate { source, .. } => source.kind(),
            PdpError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Status code reported to the verifier for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::MalformedChallenge => StatusCode::MalformedChallenge,
            ErrorKind::MalformedTag => StatusCode::MalformedTag,
            ErrorKind::AttestationInvalid => StatusCode::AttestationInvalid,
            ErrorKind::Io
            | ErrorKind::InvalidBlockSize
            | ErrorKind::InvalidPublicKey
            | ErrorKind::Internal => StatusCode::Internal,
        }
    }

    /// A non-success proof response describing this failure.
    pub fn to_response(&self) -> ProofResponse {
        ProofResponse::failure(self.status_code(), self.to_string())
    }
}

/// Convenience result type for proof operations.
pub type Result<T> = std::result::Result<T, PdpError>;
