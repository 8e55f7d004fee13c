//! Async prover facade.
//!
//! Each call moves its inputs onto Tokio's blocking pool and resolves to a
//! single value. The prover holds no queues and no locks; callers decide how
//! many proofs run at once.

use std::sync::Arc;

use bucket_types::{AggregatedProof, Challenge, ProofResponse, Tag};

use crate::aggregate::aggregate_proofs;
use crate::attest::{HashAlgorithm, TagVerifier};
use crate::prover::{gen_proof, generate_verified_proof, Proof};
use crate::split::BlockMatrix;
use crate::{PdpError, PublicParams, Result};

/// Shared, cloneable proof engine handle.
#[derive(Clone)]
pub struct Prover {
    params: Arc<PublicParams>,
    hash: HashAlgorithm,
    verifier: Option<Arc<dyn TagVerifier>>,
}

impl Prover {
    /// A prover that trusts tags as given.
    pub fn new(params: Arc<PublicParams>) -> Self {
        Self {
            params,
            hash: HashAlgorithm::default(),
            verifier: None,
        }
    }

    /// Select the digest used for attestation checks.
    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    /// Check every tag with `verifier` before proving over it.
    pub fn with_verifier(mut self, verifier: Arc<dyn TagVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn params(&self) -> &PublicParams {
        &self.params
    }

    /// Whether tags are attestation-checked.
    pub fn verifies_tags(&self) -> bool {
        self.verifier.is_some()
    }

    fn check_tag(&self, tag: &Tag) -> Result<()> {
        match &self.verifier {
            Some(verifier) => verifier.verify(tag, self.hash),
            None => Ok(()),
        }
    }

    /// Prove one fragment on the calling thread.
    pub fn prove_blocking(
        &self,
        challenge: &Challenge,
        tag: &Tag,
        blocks: &BlockMatrix,
    ) -> Result<Proof> {
        generate_verified_proof(
            challenge,
            self.hash,
            self.verifier.as_deref(),
            tag,
            blocks,
            &self.params,
        )
    }

    /// Aggregate several tags on the calling thread.
    pub fn aggregate_blocking(&self, challenge: &Challenge, tags: &[Tag]) -> Result<AggregatedProof> {
        for (tag_position, tag) in tags.iter().enumerate() {
            self.check_tag(tag).map_err(|source| PdpError::Aggregate {
                tag_position,
                tag_name: tag.name().to_string(),
                source: Box::new(source),
            })?;
        }
        aggregate_proofs(challenge, tags, &self.params)
    }

    /// Prove one fragment on the blocking pool.
    ///
    /// Always resolves to a response; any failure yields a non-success status
    /// with empty proof fields.
    pub async fn prove(
        &self,
        challenge: Arc<Challenge>,
        tag: Arc<Tag>,
        blocks: Arc<BlockMatrix>,
    ) -> ProofResponse {
        let prover = self.clone();
        let name = tag.name().to_string();
        let joined = tokio::task::spawn_blocking(move || {
            gen_proof(
                &challenge,
                prover.hash,
                prover.verifier.as_deref(),
                &tag,
                &blocks,
                &prover.params,
            )
        })
        .await;

        match joined {
            Ok(response) => {
                if response.is_success() {
                    tracing::debug!(tag = %name, "proof ready");
                }
                response
            }
            Err(e) => {
                tracing::error!(tag = %name, error = %e, "proof worker failed");
                PdpError::Internal(e.to_string()).to_response()
            }
        }
    }

    /// Aggregate several tags on the blocking pool.
    pub async fn aggregate(
        &self,
        challenge: Arc<Challenge>,
        tags: Arc<Vec<Tag>>,
    ) -> Result<AggregatedProof> {
        let prover = self.clone();
        tokio::task::spawn_blocking(move || prover.aggregate_blocking(&challenge, &tags))
            .await
            .map_err(|e| PdpError::Internal(e.to_string()))?
    }
}
