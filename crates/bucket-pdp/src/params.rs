//! RSA public parameters `(N, e)`.
//!
//! Loaded once from the miner's key material and shared read-only between
//! concurrent proof computations.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;

use crate::parse::parse_decimal;
use crate::{PdpError, Result};

/// Public modulus and exponent of the tag-signing key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicParams {
    n: BigUint,
    e: BigUint,
}

impl PublicParams {
    /// Create parameters from a modulus and exponent.
    ///
    /// # Errors
    ///
    /// - [`PdpError::InvalidPublicKey`] if `n <= 1` or `e == 0`
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        if n <= BigUint::one() {
            return Err(PdpError::InvalidPublicKey(
                "modulus must be greater than 1".to_string(),
            ));
        }
        if e.is_zero() {
            return Err(PdpError::InvalidPublicKey(
                "exponent must be non-zero".to_string(),
            ));
        }
        Ok(Self { n, e })
    }

    /// Parse base-10 modulus and exponent strings.
    pub fn from_decimal(n: &str, e: &str) -> Result<Self> {
        let n = parse_decimal(n)
            .ok_or_else(|| PdpError::InvalidPublicKey("modulus is not a decimal integer".to_string()))?;
        let e = parse_decimal(e)
            .ok_or_else(|| PdpError::InvalidPublicKey("exponent is not a decimal integer".to_string()))?;
        Self::new(n, e)
    }

    /// Take the parameters of an RSA public key.
    pub fn from_rsa(key: &RsaPublicKey) -> Result<Self> {
        Self::new(
            BigUint::from_bytes_be(&key.n().to_bytes_be()),
            BigUint::from_bytes_be(&key.e().to_bytes_be()),
        )
    }

    /// Build an RSA public key for signature checks.
    ///
    /// # Errors
    ///
    /// - [`PdpError::InvalidPublicKey`] if the parameters are not a usable
    ///   RSA key
    pub fn to_rsa(&self) -> Result<RsaPublicKey> {
        RsaPublicKey::new(
            rsa::BigUint::from_bytes_be(&self.n.to_bytes_be()),
            rsa::BigUint::from_bytes_be(&self.e.to_bytes_be()),
        )
        .map_err(|e| PdpError::InvalidPublicKey(e.to_string()))
    }

    /// The modulus `N`.
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// The public exponent `e`.
    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    /// Bit length of the modulus.
    pub fn bits(&self) -> u64 {
        self.n.bits()
    }
}
