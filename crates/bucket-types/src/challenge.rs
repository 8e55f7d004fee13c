//! Challenge payloads.
//!
//! A verifier challenges a fragment by picking block indices and a random
//! coefficient for each. The order of elements is significant for proof
//! reproducibility and duplicates are passed through untouched.

use serde::{Deserialize, Serialize};

use crate::{Result, TypesError};

/// One challenge element: a block index and its random coefficient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QElement {
    /// Zero-based block index.
    #[serde(rename = "I")]
    pub i: u64,
    /// Coefficient as a base-10 non-negative integer.
    #[serde(rename = "V")]
    pub v: String,
}

impl QElement {
    /// Create a challenge element.
    pub fn new(i: u64, v: impl Into<String>) -> Self {
        Self { i, v: v.into() }
    }
}

/// An ordered sequence of challenge elements.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Challenge(pub Vec<QElement>);

impl Challenge {
    /// Create a challenge from its elements.
    pub fn new(elements: Vec<QElement>) -> Self {
        Self(elements)
    }

    /// Decode a challenge from its JSON array form.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| TypesError::InvalidPayload(e.to_string()))
    }

    /// The challenge elements in order.
    pub fn elements(&self) -> &[QElement] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the elements in challenge order.
    pub fn iter(&self) -> std::slice::Iter<'_, QElement> {
        self.0.iter()
    }
}

impl From<Vec<QElement>> for Challenge {
    fn from(elements: Vec<QElement>) -> Self {
        Self(elements)
    }
}

impl<'a> IntoIterator for &'a Challenge {
    type Item = &'a QElement;
    type IntoIter = std::slice::Iter<'a, QElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
