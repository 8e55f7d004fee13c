//! Multi-tag `Sigma` aggregation.
//!
//! One challenge is applied to every tag and all authenticator powers are
//! multiplied into a single value:
//!
//! ```text
//! Sigma = Π_tags Π_k Phi_tag[I_k]^{V_k} mod N
//! ```
//!
//! The running product is reduced once per tag. Proof size stays constant in
//! the number of aggregated fragments.

use bucket_types::{AggregatedProof, Challenge, Tag};
use num_bigint::BigUint;
use num_traits::One;

use crate::parse::{authenticator, block_index, coefficient, to_decimal};
use crate::{PdpError, PublicParams, Result};

/// Aggregate the authenticators of `tags` under one challenge.
///
/// Tags are folded in slice order. An empty tag list yields `"1"`.
///
/// # Errors
///
/// - [`PdpError::Aggregate`] wrapping the first tag failure; the partial
///   product is discarded
pub fn aggregate_proofs(
    challenge: &Challenge,
    tags: &[Tag],
    params: &PublicParams,
) -> Result<AggregatedProof> {
    let n = params.modulus();
    let mut sigma = BigUint::one();

    for (tag_position, tag) in tags.iter().enumerate() {
        fold_tag(&mut sigma, challenge, tag, n).map_err(|source| PdpError::Aggregate {
            tag_position,
            tag_name: tag.name().to_string(),
            source: Box::new(source),
        })?;
        sigma %= n;
    }

    tracing::debug!(
        tags = tags.len(),
        elements = challenge.len(),
        "proofs aggregated"
    );

    Ok(AggregatedProof(to_decimal(&sigma)))
}

fn fold_tag(sigma: &mut BigUint, challenge: &Challenge, tag: &Tag, n: &BigUint) -> Result<()> {
    for (position, q) in challenge.iter().enumerate() {
        let index = block_index(position, q, tag.block_count())?;
        let v = coefficient(position, q)?;
        let phi = authenticator(tag, index)?;
        *sigma *= phi.modpow(&v, n);
    }
    Ok(())
}
