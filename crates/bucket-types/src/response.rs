//! Proof responses and aggregated proofs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TypesError;

/// Outcome code carried in a [`ProofResponse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum StatusCode {
    /// Proof computed; safe to submit.
    Success,
    /// Challenge references a missing block or carries a bad coefficient.
    MalformedChallenge,
    /// Tag attestation did not verify.
    AttestationInvalid,
    /// Tag does not match the block matrix or holds a bad authenticator.
    MalformedTag,
    /// Engine-side failure unrelated to the inputs.
    Internal,
}

impl StatusCode {
    pub fn as_i32(self) -> i32 {
        match self {
            StatusCode::Success => 200,
            StatusCode::MalformedChallenge => 400,
            StatusCode::AttestationInvalid => 403,
            StatusCode::MalformedTag => 422,
            StatusCode::Internal => 500,
        }
    }

    pub fn is_success(self) -> bool {
        self == StatusCode::Success
    }
}

impl TryFrom<i32> for StatusCode {
    type Error = TypesError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(StatusCode::Success),
            400 => Ok(StatusCode::MalformedChallenge),
            403 => Ok(StatusCode::AttestationInvalid),
            422 => Ok(StatusCode::MalformedTag),
            500 => Ok(StatusCode::Internal),
            other => Err(TypesError::UnknownStatusCode(other)),
        }
    }
}

impl From<StatusCode> for i32 {
    fn from(code: StatusCode) -> Self {
        code.as_i32()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

/// Status block of a proof response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMsg {
    #[serde(rename = "StatusCode")]
    pub code: StatusCode,
    #[serde(rename = "Msg")]
    pub msg: String,
}

/// A single-tag possession proof.
///
/// `mu` is the full-precision weighted block sum and is never reduced.
/// `sigma` is the aggregated authenticator, reduced modulo `N`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofResponse {
    #[serde(rename = "MU")]
    pub mu: String,
    #[serde(rename = "Sigma")]
    pub sigma: String,
    /// Wire name kept as deployed verifiers expect it.
    #[serde(rename = "StatueMsg")]
    pub status: StatusMsg,
}

impl ProofResponse {
    /// A successful response carrying the proof pair.
    pub fn success(mu: String, sigma: String) -> Self {
        Self {
            mu,
            sigma,
            status: StatusMsg {
                code: StatusCode::Success,
                msg: "Success".to_string(),
            },
        }
    }

    /// A failed response. Proof fields are left empty so a failure can never
    /// be mistaken for a zero-valued proof.
    pub fn failure(code: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            mu: String::new(),
            sigma: String::new(),
            status: StatusMsg {
                code,
                msg: msg.into(),
            },
        }
    }

    /// Whether the response may be submitted.
    pub fn is_success(&self) -> bool {
        self.status.code.is_success()
    }
}

/// One aggregated authenticator value covering several tags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedProof(pub String);

impl AggregatedProof {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AggregatedProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
