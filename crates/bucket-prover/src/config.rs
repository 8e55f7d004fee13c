//! Configuration file management.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use bucket_pdp::split::DEFAULT_BLOCK_SIZE;
use bucket_pdp::{HashAlgorithm, Padding, Prover, PublicParams, RsaAttestationVerifier};
use serde::{Deserialize, Serialize};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "BUCKET_CONFIG";

/// Complete prover configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Proof engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Public key of the tag signer.
    #[serde(default)]
    pub key: KeyConfig,
    /// Worker settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Proof engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Block size in bytes; must match the size tags were generated with.
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    /// "tail_only" | "always".
    #[serde(default)]
    pub padding: Padding,
    /// Attestation digest: "sha256" | "sha512" | "blake3".
    #[serde(default)]
    pub hash: HashAlgorithm,
    /// Refuse tags whose attestation does not verify.
    #[serde(default)]
    pub verify_attestation: bool,
}

/// RSA public key, base-10.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyConfig {
    #[serde(default)]
    pub modulus: String,
    #[serde(default = "default_exponent")]
    pub exponent: String,
}

/// Worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Maximum proofs computed at once by `batch`.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_exponent() -> String {
    "65537".to_string()
}

fn default_workers() -> usize {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            padding: Padding::default(),
            hash: HashAlgorithm::default(),
            verify_attestation: false,
        }
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            modulus: String::new(),
            exponent: default_exponent(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ProverConfig {
    /// Load configuration from `path`, else from `$BUCKET_CONFIG`.
    ///
    /// Falls back to defaults when neither is set. An explicitly named file
    /// that does not exist is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        };
        match path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: ProverConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.engine.block_size == 0 {
            bail!("engine.block_size must be greater than zero");
        }
        if self.runtime.workers == 0 {
            bail!("runtime.workers must be greater than zero");
        }
        Ok(())
    }

    /// Public parameters from `[key]`.
    pub fn public_params(&self) -> anyhow::Result<PublicParams> {
        if self.key.modulus.is_empty() {
            bail!("key.modulus is not configured");
        }
        PublicParams::from_decimal(&self.key.modulus, &self.key.exponent)
            .context("loading [key] parameters")
    }

    /// Build the prover described by this configuration.
    pub fn prover(&self) -> anyhow::Result<Prover> {
        let params = Arc::new(self.public_params()?);
        let mut prover = Prover::new(params.clone()).with_hash(self.engine.hash);
        if self.engine.verify_attestation {
            let verifier = RsaAttestationVerifier::from_params(&params)
                .context("key cannot verify attestations")?;
            prover = prover.with_verifier(Arc::new(verifier));
        }
        Ok(prover)
    }
}
