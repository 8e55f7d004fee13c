//! Homomorphic authenticator tags.
//!
//! Tags are produced once, at storage time, by the tag-generation service and
//! handed to the miner together with the fragment. The miner only reads them.

use serde::{Deserialize, Serialize};

use crate::{Result, TypesError};

/// Inner tag descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInner {
    /// Identifier of the tagged fragment.
    #[serde(rename = "Name")]
    pub name: String,
    /// Scheme parameter `u`.
    #[serde(rename = "U")]
    pub u: String,
    /// One authenticator per block, base-10, indexed like the block matrix.
    #[serde(rename = "Phi")]
    pub phi: Vec<String>,
}

/// A fragment tag with its attestation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "T")]
    pub t: TagInner,
    /// Digest of the tag.
    #[serde(rename = "PhiHash")]
    pub phi_hash: String,
    /// Hex-encoded signature over `phi_hash`.
    #[serde(rename = "Attest")]
    pub attest: String,
}

impl Tag {
    /// Build an unattested tag from its authenticator values.
    pub fn new(name: impl Into<String>, u: impl Into<String>, phi: Vec<String>) -> Self {
        Self {
            t: TagInner {
                name: name.into(),
                u: u.into(),
                phi,
            },
            phi_hash: String::new(),
            attest: String::new(),
        }
    }

    /// Decode a tag from JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| TypesError::InvalidPayload(e.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.t.name
    }

    /// Authenticator values in block order.
    pub fn phi(&self) -> &[String] {
        &self.t.phi
    }

    /// Number of blocks this tag covers.
    pub fn block_count(&self) -> usize {
        self.t.phi.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_wire_format() {
        let json = br#"{
            "T": {"Name": "frag-0", "U": "17", "Phi": ["4", "9"]},
            "PhiHash": "abcd",
            "Attest": "00ff"
        }"#;
        let tag = Tag::from_json(json).expect("decode");
        assert_eq!(tag.name(), "frag-0");
        assert_eq!(tag.t.u, "17");
        assert_eq!(tag.phi(), &["4".to_string(), "9".to_string()]);
        assert_eq!(tag.block_count(), 2);
        assert_eq!(tag.phi_hash, "abcd");
        assert_eq!(tag.attest, "00ff");
    }

    #[test]
    fn test_tag_serializes_with_wire_names() {
        let tag = Tag::new("f", "1", vec!["2".to_string()]);
        let value = serde_json::to_value(&tag).expect("serialize");
        assert_eq!(value["T"]["Name"], "f");
        assert_eq!(value["T"]["Phi"][0], "2");
        assert_eq!(value["PhiHash"], "");
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = br#"{"T": {"Name": "x", "U": "1"}, "PhiHash": "", "Attest": ""}"#;
        assert!(Tag::from_json(json).is_err());
    }
}
