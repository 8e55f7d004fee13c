//! Subcommand implementations.
//!
//! Every command writes a single JSON document to stdout; logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bucket_pdp::{split_file, BlockMatrix, Padding, PdpError};
use bucket_types::{AggregatedProof, Challenge, ProofResponse, Tag};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::ProverConfig;

/// Result of `split`.
#[derive(Debug, Serialize)]
pub struct SplitSummary {
    pub fragment: PathBuf,
    pub block_size: usize,
    pub blocks: usize,
}

/// One fragment of a batch manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchJob {
    pub tag: PathBuf,
    pub fragment: PathBuf,
}

/// Batch manifest: one challenge applied to many fragments.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchManifest {
    pub challenge: PathBuf,
    pub jobs: Vec<BatchJob>,
}

/// Result of `batch`.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    /// Responses in manifest order.
    pub proofs: Vec<ProofResponse>,
    /// Aggregated `Sigma` over all tags, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<AggregatedProof>,
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

async fn read_challenge(path: &Path) -> Result<Challenge> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading challenge {}", path.display()))?;
    Challenge::from_json(&bytes).with_context(|| format!("decoding challenge {}", path.display()))
}

async fn read_tag(path: &Path) -> Result<Tag> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading tag {}", path.display()))?;
    Tag::from_json(&bytes).with_context(|| format!("decoding tag {}", path.display()))
}

async fn split_blocking(
    path: &Path,
    block_size: usize,
    padding: Padding,
) -> std::result::Result<BlockMatrix, PdpError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || split_file(&path, block_size, padding))
        .await
        .map_err(|e| PdpError::Internal(e.to_string()))?
}

async fn read_blocks(path: &Path, block_size: usize, padding: Padding) -> Result<BlockMatrix> {
    Ok(split_blocking(path, block_size, padding).await?)
}

/// Split a fragment and report its block layout.
pub async fn split(config: &ProverConfig, fragment: &Path) -> Result<SplitSummary> {
    let matrix = read_blocks(fragment, config.engine.block_size, config.engine.padding).await?;
    Ok(SplitSummary {
        fragment: fragment.to_path_buf(),
        block_size: matrix.block_size(),
        blocks: matrix.len(),
    })
}

/// Prove possession of one fragment.
pub async fn prove(
    config: &ProverConfig,
    challenge: &Path,
    tag: &Path,
    fragment: &Path,
) -> Result<ProofResponse> {
    let prover = config.prover()?;
    let challenge = read_challenge(challenge).await?;
    let tag = read_tag(tag).await?;
    let blocks = read_blocks(fragment, config.engine.block_size, config.engine.padding).await?;

    info!(
        tag = tag.name(),
        elements = challenge.len(),
        blocks = blocks.len(),
        "proving fragment"
    );
    Ok(prover
        .prove(Arc::new(challenge), Arc::new(tag), Arc::new(blocks))
        .await)
}

/// Aggregate the authenticators of several tags.
pub async fn aggregate(
    config: &ProverConfig,
    challenge: &Path,
    tags: &[PathBuf],
) -> Result<AggregatedProof> {
    if tags.is_empty() {
        bail!("at least one tag is required");
    }
    let prover = config.prover()?;
    let challenge = read_challenge(challenge).await?;
    let mut loaded = Vec::with_capacity(tags.len());
    for path in tags {
        loaded.push(read_tag(path).await?);
    }

    info!(tags = loaded.len(), elements = challenge.len(), "aggregating tags");
    let proof = prover
        .aggregate(Arc::new(challenge), Arc::new(loaded))
        .await?;
    Ok(proof)
}

/// Prove every fragment of a manifest, at most `runtime.workers` at a time.
pub async fn batch(
    config: &ProverConfig,
    manifest: &Path,
    with_aggregate: bool,
) -> Result<BatchReport> {
    let raw = tokio::fs::read(manifest)
        .await
        .with_context(|| format!("reading manifest {}", manifest.display()))?;
    let manifest: BatchManifest = serde_json::from_slice(&raw).context("decoding manifest")?;

    let prover = config.prover()?;
    let challenge = Arc::new(read_challenge(&manifest.challenge).await?);
    let permits = Arc::new(Semaphore::new(config.runtime.workers));
    let block_size = config.engine.block_size;
    let padding = config.engine.padding;

    let mut tags = Vec::with_capacity(manifest.jobs.len());
    let mut set = JoinSet::new();
    for (position, job) in manifest.jobs.iter().enumerate() {
        let tag = Arc::new(read_tag(&job.tag).await?);
        tags.push(tag.as_ref().clone());

        let prover = prover.clone();
        let challenge = challenge.clone();
        let permits = permits.clone();
        let fragment = job.fragment.clone();
        set.spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let response = match split_blocking(&fragment, block_size, padding).await {
                Ok(blocks) => prover.prove(challenge, tag, Arc::new(blocks)).await,
                Err(e) => e.to_response(),
            };
            anyhow::Ok((position, response))
        });
    }

    let mut proofs: Vec<Option<ProofResponse>> = vec![None; manifest.jobs.len()];
    while let Some(joined) = set.join_next().await {
        let (position, response) = joined??;
        if !response.is_success() {
            warn!(position, msg = %response.status.msg, "batch job failed");
        }
        proofs[position] = Some(response);
    }
    let proofs: Vec<ProofResponse> = proofs.into_iter().flatten().collect();

    let aggregate = if with_aggregate {
        Some(prover.aggregate(challenge, Arc::new(tags)).await?)
    } else {
        None
    };

    info!(jobs = proofs.len(), "batch complete");
    Ok(BatchReport { proofs, aggregate })
}

#[cfg(test)]
mod tests {
    use bucket_types::StatusCode;

    use super::*;

    fn config15(block_size: usize) -> ProverConfig {
        let mut config = ProverConfig::default();
        config.engine.block_size = block_size;
        config.key.modulus = "15".to_string();
        config.key.exponent = "3".to_string();
        config
    }

    #[tokio::test]
    async fn test_prove_from_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let challenge = dir.path().join("challenge.json");
        let tag = dir.path().join("tag.json");
        let fragment = dir.path().join("fragment");
        std::fs::write(&challenge, r#"[{"I":0,"V":"3"}]"#).expect("write");
        std::fs::write(
            &tag,
            r#"{"T":{"Name":"f","U":"1","Phi":["4","9"]},"PhiHash":"","Attest":""}"#,
        )
        .expect("write");
        std::fs::write(&fragment, b"ABCDEFG").expect("write");

        let resp = prove(&config15(4), &challenge, &tag, &fragment)
            .await
            .expect("prove");
        assert!(resp.is_success());
        assert_eq!(resp.sigma, "4");
        let m0 = u64::from(u32::from_be_bytes(*b"ABCD"));
        assert_eq!(resp.mu, (m0 * 3).to_string());
    }

    #[tokio::test]
    async fn test_batch_keeps_manifest_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let challenge = dir.path().join("challenge.json");
        std::fs::write(&challenge, r#"[{"I":0,"V":"3"}]"#).expect("write");

        let mut jobs = Vec::new();
        for (i, phi) in ["4", "2", "7"].iter().enumerate() {
            let tag = dir.path().join(format!("tag{i}.json"));
            let fragment = dir.path().join(format!("frag{i}"));
            std::fs::write(
                &tag,
                format!(r#"{{"T":{{"Name":"f{i}","U":"1","Phi":["{phi}"]}},"PhiHash":"","Attest":""}}"#),
            )
            .expect("write");
            std::fs::write(&fragment, [i as u8 + 1]).expect("write");
            jobs.push(serde_json::json!({"tag": tag, "fragment": fragment}));
        }
        let manifest = dir.path().join("manifest.json");
        std::fs::write(
            &manifest,
            serde_json::json!({"challenge": challenge, "jobs": jobs}).to_string(),
        )
        .expect("write");

        let mut config = config15(4);
        config.runtime.workers = 2;
        let report = batch(&config, &manifest, true).await.expect("batch");

        // 4^3=4, 2^3=8, 7^3=343=13 (mod 15)
        let sigmas: Vec<&str> = report.proofs.iter().map(|p| p.sigma.as_str()).collect();
        assert_eq!(sigmas, ["4", "8", "13"]);
        let mus: Vec<&str> = report.proofs.iter().map(|p| p.mu.as_str()).collect();
        assert_eq!(mus, ["3", "6", "9"]);
        // 4 * 8 * 13 = 416 = 11 (mod 15)
        assert_eq!(report.aggregate.map(|a| a.0), Some("11".to_string()));
    }

    #[tokio::test]
    async fn test_batch_unreadable_fragment_fails_only_its_job() {
        let dir = tempfile::tempdir().expect("tempdir");
        let challenge = dir.path().join("challenge.json");
        std::fs::write(&challenge, r#"[{"I":0,"V":"3"}]"#).expect("write");

        let tag = dir.path().join("tag.json");
        std::fs::write(
            &tag,
            r#"{"T":{"Name":"f","U":"1","Phi":["4"]},"PhiHash":"","Attest":""}"#,
        )
        .expect("write");
        let present = dir.path().join("present");
        std::fs::write(&present, [2u8]).expect("write");
        let absent = dir.path().join("absent");

        let manifest = dir.path().join("manifest.json");
        std::fs::write(
            &manifest,
            serde_json::json!({
                "challenge": challenge,
                "jobs": [
                    {"tag": tag, "fragment": present},
                    {"tag": tag, "fragment": absent},
                ],
            })
            .to_string(),
        )
        .expect("write");

        let report = batch(&config15(4), &manifest, false)
            .await
            .expect("batch survives one bad fragment");
        assert_eq!(report.proofs.len(), 2);
        assert!(report.proofs[0].is_success());
        assert_eq!(report.proofs[0].sigma, "4");
        assert_eq!(report.proofs[0].mu, "6");
        assert_eq!(report.proofs[1].status.code, StatusCode::Internal);
        assert!(report.proofs[1].sigma.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_requires_tags() {
        let dir = tempfile::tempdir().expect("tempdir");
        let challenge = dir.path().join("challenge.json");
        std::fs::write(&challenge, "[]").expect("write");
        assert!(aggregate(&config15(4), &challenge, &[]).await.is_err());
    }
}
