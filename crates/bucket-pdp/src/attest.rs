//! Optional tag attestation check.
//!
//! The tag-generation service signs each tag: the fields `Name`, `U` and
//! `PhiHash` are hashed in that order and the digest is signed with
//! RSASSA-PKCS1-v1_5 under the same key whose modulus the proofs use. `Attest`
//! carries the hex-encoded signature.
//!
//! Proving never requires this check. Callers that want to refuse unattested
//! tags plug a [`TagVerifier`] into [`crate::Prover`].

use bucket_types::Tag;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

use crate::{PdpError, PublicParams, Result};

/// Hash selection for attestation digests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
    Blake3,
}

impl HashAlgorithm {
    /// A fresh hasher for this algorithm.
    pub fn hasher(self) -> TagHasher {
        TagHasher::new(self)
    }

    /// PKCS#1 v1.5 signature scheme matching this digest. SHA-2 digests carry
    /// their DigestInfo prefix; BLAKE3 has no registered OID and is signed raw.
    pub fn signature_scheme(self) -> Pkcs1v15Sign {
        match self {
            HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
            HashAlgorithm::Blake3 => Pkcs1v15Sign::new_unprefixed(),
        }
    }
}

enum HasherState {
    Sha256(Sha256),
    Sha512(Sha512),
    Blake3(Box<blake3::Hasher>),
}

/// Incremental hasher over tag fields.
pub struct TagHasher {
    algorithm: HashAlgorithm,
    state: HasherState,
}

impl TagHasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let state = match algorithm {
            HashAlgorithm::Sha256 => HasherState::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => HasherState::Sha512(Sha512::new()),
            HashAlgorithm::Blake3 => HasherState::Blake3(Box::new(blake3::Hasher::new())),
        };
        Self { algorithm, state }
    }

    /// Feed one field.
    pub fn load_field(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Sha256(h) => h.update(data),
            HasherState::Sha512(h) => h.update(data),
            HasherState::Blake3(h) => {
                h.update(data);
            }
        }
    }

    /// Finish hashing, returning the digest and the algorithm used.
    pub fn finish(self) -> (Vec<u8>, HashAlgorithm) {
        let digest = match self.state {
            HasherState::Sha256(h) => h.finalize().to_vec(),
            HasherState::Sha512(h) => h.finalize().to_vec(),
            HasherState::Blake3(h) => h.finalize().as_bytes().to_vec(),
        };
        (digest, self.algorithm)
    }
}

/// Digest signed by a tag's attestation.
pub fn attestation_digest(tag: &Tag, algorithm: HashAlgorithm) -> Vec<u8> {
    let mut hasher = algorithm.hasher();
    hasher.load_field(tag.t.name.as_bytes());
    hasher.load_field(tag.t.u.as_bytes());
    hasher.load_field(tag.phi_hash.as_bytes());
    hasher.finish().0
}

/// Checks a tag before its authenticators are trusted.
pub trait TagVerifier: Send + Sync {
    /// # Errors
    ///
    /// - [`PdpError::AttestationInvalid`] if the tag is not genuine
    fn verify(&self, tag: &Tag, algorithm: HashAlgorithm) -> Result<()>;
}

/// Verifies `Attest` as an RSA PKCS#1 v1.5 signature.
#[derive(Clone, Debug)]
pub struct RsaAttestationVerifier {
    key: RsaPublicKey,
}

impl RsaAttestationVerifier {
    pub fn new(key: RsaPublicKey) -> Self {
        Self { key }
    }

    /// Verifier for the key behind `params`.
    pub fn from_params(params: &PublicParams) -> Result<Self> {
        Ok(Self::new(params.to_rsa()?))
    }
}

impl TagVerifier for RsaAttestationVerifier {
    fn verify(&self, tag: &Tag, algorithm: HashAlgorithm) -> Result<()> {
        let signature = hex::decode(&tag.attest).map_err(|e| {
            PdpError::AttestationInvalid(format!("tag {} attest is not hex: {e}", tag.name()))
        })?;
        let digest = attestation_digest(tag, algorithm);

        self.key
            .verify(algorithm.signature_scheme(), &digest, &signature)
            .map_err(|e| {
                tracing::debug!(tag = tag.name(), ?algorithm, "attestation rejected");
                PdpError::AttestationInvalid(format!("tag {}: {e}", tag.name()))
            })
    }
}
