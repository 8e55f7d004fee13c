//! Single-tag proof generation.
//!
//! For a challenge `{(I_k, V_k)}` over one fragment:
//!
//! ```text
//! MU    = Σ V_k · m_{I_k}              (full precision, never reduced)
//! Sigma = Π Phi[I_k]^{V_k} mod N
//! ```
//!
//! where `m_i` is block `i` read as a big-endian unsigned integer. Elements are
//! consumed in challenge order.

use bucket_types::{Challenge, ProofResponse, Tag};
use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::attest::{HashAlgorithm, TagVerifier};
use crate::parse::{authenticator, block_index, coefficient, to_decimal};
use crate::split::BlockMatrix;
use crate::{PdpError, PublicParams, Result};

/// A computed proof pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    /// Weighted sum of the challenged blocks.
    pub mu: BigUint,
    /// Aggregated authenticator, in `[0, N)`.
    pub sigma: BigUint,
}

impl Proof {
    /// Encode as a successful wire response.
    pub fn into_response(self) -> ProofResponse {
        ProofResponse::success(to_decimal(&self.mu), to_decimal(&self.sigma))
    }
}

/// Compute the possession proof of one fragment.
///
/// An empty challenge yields `MU = 0` and `Sigma = 1 mod N`.
///
/// # Errors
///
/// - [`PdpError::MalformedTag`] if the tag does not cover exactly the blocks
///   of `blocks`, or a challenged authenticator is not a decimal integer
/// - [`PdpError::MalformedChallenge`] if an index is out of range or a
///   coefficient is not a non-negative decimal integer
pub fn generate_proof(
    challenge: &Challenge,
    tag: &Tag,
    blocks: &BlockMatrix,
    params: &PublicParams,
) -> Result<Proof> {
    if tag.block_count() != blocks.len() {
        return Err(PdpError::MalformedTag {
            reason: format!(
                "tag {} has {} authenticators for {} blocks",
                tag.name(),
                tag.block_count(),
                blocks.len()
            ),
        });
    }

    let n = params.modulus();
    let mut mu = BigUint::zero();
    let mut sigma = BigUint::one();

    for (position, q) in challenge.iter().enumerate() {
        let index = block_index(position, q, blocks.len())?;
        let v = coefficient(position, q)?;

        let m = BigUint::from_bytes_be(&blocks.blocks()[index]);
        mu += &m * &v;

        let phi = authenticator(tag, index)?;
        sigma *= phi.modpow(&v, n);
    }
    sigma %= n;

    tracing::trace!(
        tag = tag.name(),
        elements = challenge.len(),
        mu_bits = mu.bits(),
        "proof generated"
    );

    Ok(Proof { mu, sigma })
}

/// Check `tag` with `verifier`, when one is given, then prove over it.
///
/// `hash` selects the digest the verifier recomputes; it is unused when
/// `verifier` is `None`.
///
/// # Errors
///
/// - [`PdpError::AttestationInvalid`] if the verifier rejects the tag
/// - any error of [`generate_proof`]
pub fn generate_verified_proof(
    challenge: &Challenge,
    hash: HashAlgorithm,
    verifier: Option<&dyn TagVerifier>,
    tag: &Tag,
    blocks: &BlockMatrix,
    params: &PublicParams,
) -> Result<Proof> {
    if let Some(verifier) = verifier {
        verifier.verify(tag, hash)?;
    }
    generate_proof(challenge, tag, blocks, params)
}

/// Compute a proof and encode the outcome as a wire response.
///
/// Failures produce a non-success response with empty proof fields.
pub fn gen_proof(
    challenge: &Challenge,
    hash: HashAlgorithm,
    verifier: Option<&dyn TagVerifier>,
    tag: &Tag,
    blocks: &BlockMatrix,
    params: &PublicParams,
) -> ProofResponse {
    match generate_verified_proof(challenge, hash, verifier, tag, blocks, params) {
        Ok(proof) => proof.into_response(),
        Err(e) => {
            tracing::warn!(tag = tag.name(), error = %e, "proof generation failed");
            e.to_response()
        }
    }
}
