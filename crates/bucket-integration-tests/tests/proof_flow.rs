//! Integration test: fragment -> tags -> proof -> verifier equation.
//!
//! Exercises the miner-side pipeline against tags built the way the
//! tag-generation service builds them:
//! 1. Split a fragment file into fixed-size blocks
//! 2. Tag every block as `phi_i = (H(i) * g^{m_i})^d mod N`
//! 3. Prove a random challenge
//! 4. Check `Sigma^e == Π H(i)^{v_i} * g^MU (mod N)`
//! 5. Aggregate several fragments and check against the individual proofs
//!
//! Verification lives here only as a test oracle; the engine never verifies.

use std::io::Write;
use std::sync::Arc;

use bucket_pdp::{
    aggregate_proofs, generate_proof, split_file, BlockMatrix, Padding, Prover, PublicParams,
};
use bucket_types::{Challenge, QElement, Tag};
use num_bigint::BigUint;
use num_traits::One;
use rand::Rng;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::RsaPrivateKey;

/// Toy RSA key: p = 61, q = 53.
const TOY_N: u32 = 3233;
const TOY_E: u32 = 17;
const TOY_D: u32 = 2753;

/// Generator used in the tags.
const G: u32 = 2;

struct Signer {
    n: BigUint,
    e: BigUint,
    d: BigUint,
}

impl Signer {
    fn toy() -> Self {
        Self {
            n: BigUint::from(TOY_N),
            e: BigUint::from(TOY_E),
            d: BigUint::from(TOY_D),
        }
    }

    fn from_rsa(key: &RsaPrivateKey) -> Self {
        Self {
            n: BigUint::from_bytes_be(&key.n().to_bytes_be()),
            e: BigUint::from_bytes_be(&key.e().to_bytes_be()),
            d: BigUint::from_bytes_be(&key.d().to_bytes_be()),
        }
    }

    fn params(&self) -> PublicParams {
        PublicParams::new(self.n.clone(), self.e.clone()).expect("params")
    }

    /// Deterministic per-block hash into Z_N, never zero.
    fn block_hash(&self, name: &str, index: usize) -> BigUint {
        let seed = name.bytes().fold(index as u64 * 31 + 7, |acc, b| {
            acc.wrapping_mul(131).wrapping_add(u64::from(b))
        });
        BigUint::from(seed) % (&self.n - 1u32) + 1u32
    }

    fn tag(&self, name: &str, blocks: &BlockMatrix) -> Tag {
        let g = BigUint::from(G);
        let phi = blocks
            .blocks()
            .iter()
            .enumerate()
            .map(|(i, block)| {
                let m = BigUint::from_bytes_be(block);
                let base = self.block_hash(name, i) * g.modpow(&m, &self.n) % &self.n;
                base.modpow(&self.d, &self.n).to_str_radix(10)
            })
            .collect();
        Tag::new(name, "1", phi)
    }

    /// Right-hand side of the verifier equation.
    fn expected(&self, name: &str, challenge: &Challenge, mu: &BigUint) -> BigUint {
        let mut acc = BigUint::from(G).modpow(mu, &self.n);
        for q in challenge {
            let v = BigUint::parse_bytes(q.v.as_bytes(), 10).expect("coefficient");
            acc = acc * self.block_hash(name, q.i as usize).modpow(&v, &self.n) % &self.n;
        }
        acc
    }
}

fn write_fragment(len: usize) -> tempfile::NamedTempFile {
    let mut rng = rand::thread_rng();
    let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(&data).expect("write");
    file
}

fn random_challenge(blocks: usize, elements: usize) -> Challenge {
    let mut rng = rand::thread_rng();
    (0..elements)
        .map(|_| {
            QElement::new(
                rng.gen_range(0..blocks as u64),
                rng.gen::<u64>().to_string(),
            )
        })
        .collect::<Vec<_>>()
        .into()
}

#[test]
fn proof_satisfies_verifier_equation_toy_key() {
    let signer = Signer::toy();
    let params = signer.params();
    let fragment = write_fragment(1000);
    let blocks = split_file(fragment.path(), 16, Padding::TailOnly).expect("split");
    assert_eq!(blocks.len(), 63);

    let tag = signer.tag("frag-0", &blocks);
    let challenge = random_challenge(blocks.len(), 12);
    let proof = generate_proof(&challenge, &tag, &blocks, &params).expect("proof");

    assert!(&proof.sigma < params.modulus());
    assert_eq!(
        proof.sigma.modpow(&signer.e, &signer.n),
        signer.expected("frag-0", &challenge, &proof.mu)
    );
}

#[test]
fn proof_satisfies_verifier_equation_rsa_1024() {
    let mut rng = rand::thread_rng();
    let key = RsaPrivateKey::new(&mut rng, 1024).expect("keygen");
    let signer = Signer::from_rsa(&key);
    let params = PublicParams::from_rsa(&key.to_public_key()).expect("params");

    let fragment = write_fragment(4096 + 100);
    let blocks = split_file(fragment.path(), 512, Padding::TailOnly).expect("split");
    assert_eq!(blocks.len(), 9);

    let tag = signer.tag("frag-rsa", &blocks);
    let challenge = random_challenge(blocks.len(), 5);
    let proof = generate_proof(&challenge, &tag, &blocks, &params).expect("proof");

    assert_eq!(
        proof.sigma.modpow(&signer.e, &signer.n),
        signer.expected("frag-rsa", &challenge, &proof.mu)
    );
}

#[test]
fn aggregate_equals_product_of_individual_sigmas() {
    let signer = Signer::toy();
    let params = signer.params();

    let fragments: Vec<_> = (0..3).map(|_| write_fragment(256)).collect();
    let matrices: Vec<BlockMatrix> = fragments
        .iter()
        .map(|f| split_file(f.path(), 32, Padding::TailOnly).expect("split"))
        .collect();
    let tags: Vec<Tag> = matrices
        .iter()
        .enumerate()
        .map(|(i, m)| signer.tag(&format!("frag-{i}"), m))
        .collect();

    let challenge = random_challenge(8, 6);
    let mut product = BigUint::one();
    for (tag, blocks) in tags.iter().zip(&matrices) {
        let proof = generate_proof(&challenge, tag, blocks, &params).expect("proof");
        product = product * proof.sigma % params.modulus();
    }

    let aggregated = aggregate_proofs(&challenge, &tags, &params).expect("aggregate");
    assert_eq!(aggregated.as_str(), product.to_str_radix(10));
}

#[test]
fn documented_scenarios() {
    let blocks = bucket_pdp::split_bytes(b"ABCDEFG", 4, Padding::TailOnly).expect("split");
    assert_eq!(blocks.blocks(), &[b"ABCD".to_vec(), b"EFG\0".to_vec()]);

    let params = PublicParams::from_decimal("15", "3").expect("params");
    let tag = Tag::new("t", "1", vec!["4".to_string(), "4".to_string()]);
    let challenge = Challenge::new(vec![QElement::new(0, "3")]);
    let proof = generate_proof(&challenge, &tag, &blocks, &params).expect("proof");
    assert_eq!(proof.sigma, BigUint::from(4u32));

    let aggregated =
        aggregate_proofs(&challenge, &[tag.clone(), tag], &params).expect("aggregate");
    assert_eq!(aggregated.as_str(), "1");
}

#[tokio::test]
async fn attested_tags_flow_through_prover() {
    let mut rng = rand::thread_rng();
    let key = RsaPrivateKey::new(&mut rng, 1024).expect("keygen");
    let signer = Signer::from_rsa(&key);
    let params = Arc::new(PublicParams::from_rsa(&key.to_public_key()).expect("params"));
    let verifier = bucket_pdp::RsaAttestationVerifier::from_params(&params).expect("verifier");
    let prover = Prover::new(params).with_verifier(Arc::new(verifier));

    let fragment = write_fragment(2048);
    let blocks = split_file(fragment.path(), 256, Padding::TailOnly).expect("split");
    let mut tag = signer.tag("frag-attested", &blocks);
    tag.phi_hash = "c0ffee".to_string();
    let digest = bucket_pdp::attest::attestation_digest(&tag, bucket_pdp::HashAlgorithm::Sha256);
    let signature = key
        .sign(bucket_pdp::HashAlgorithm::Sha256.signature_scheme(), &digest)
        .expect("sign");
    tag.attest = hex::encode(signature);

    let challenge = Arc::new(random_challenge(blocks.len(), 4));
    let blocks = Arc::new(blocks);

    let resp = prover
        .prove(challenge.clone(), Arc::new(tag.clone()), blocks.clone())
        .await;
    assert!(resp.is_success(), "{}", resp.status.msg);

    let mu = BigUint::parse_bytes(resp.mu.as_bytes(), 10).expect("mu");
    let sigma = BigUint::parse_bytes(resp.sigma.as_bytes(), 10).expect("sigma");
    assert_eq!(
        sigma.modpow(&signer.e, &signer.n),
        signer.expected("frag-attested", &challenge, &mu)
    );

    let mut forged = tag;
    forged.t.name = "frag-forged".to_string();
    let resp = prover.prove(challenge, Arc::new(forged), blocks).await;
    assert_eq!(
        resp.status.code,
        bucket_types::StatusCode::AttestationInvalid
    );
    assert!(resp.sigma.is_empty());
}
