//! Decimal big-integer boundary parsing.
//!
//! Coefficients and authenticators cross the wire as base-10 strings. Only
//! plain ASCII digits are accepted: no sign, no whitespace, no separators.

use bucket_types::{QElement, Tag};
use num_bigint::BigUint;

use crate::{PdpError, Result};

/// Parse a non-negative base-10 integer.
pub fn parse_decimal(s: &str) -> Option<BigUint> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(s.as_bytes(), 10)
}

/// Render an integer in base 10.
pub fn to_decimal(value: &BigUint) -> String {
    value.to_str_radix(10)
}

/// Resolve the block index of a challenge element against `len` blocks.
pub(crate) fn block_index(position: usize, q: &QElement, len: usize) -> Result<usize> {
    match usize::try_from(q.i) {
        Ok(index) if index < len => Ok(index),
        _ => Err(PdpError::MalformedChallenge {
            position,
            index: q.i,
            reason: format!("index out of range for {len} blocks"),
        }),
    }
}

/// Parse the coefficient of a challenge element.
pub(crate) fn coefficient(position: usize, q: &QElement) -> Result<BigUint> {
    parse_decimal(&q.v).ok_or_else(|| PdpError::MalformedChallenge {
        position,
        index: q.i,
        reason: format!("coefficient {:?} is not a non-negative decimal integer", q.v),
    })
}

/// Parse the authenticator of block `index`.
pub(crate) fn authenticator(tag: &Tag, index: usize) -> Result<BigUint> {
    let raw = tag.phi().get(index).ok_or_else(|| {
        PdpError::MalformedTag {
            reason: format!("tag {} has no authenticator for block {index}", tag.name()),
        }
    })?;
    parse_decimal(raw).ok_or_else(|| {
        PdpError::MalformedTag {
            reason: format!(
                "tag {} authenticator {index} is not a decimal integer",
                tag.name()
            ),
        }
    })
}
