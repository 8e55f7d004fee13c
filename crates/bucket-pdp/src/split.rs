//! Fixed-size block splitting.
//!
//! A fragment is cut into `sep`-byte blocks in file order. Only the final
//! block can be short, and it is zero-padded on the right up to `sep`. Content
//! that fits in a single block is returned as-is under [`Padding::TailOnly`],
//! which is how existing tags were generated; block `i` here must be the
//! block that `Phi[i]` was computed over.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{PdpError, Result};

/// Default block size: 8 KiB.
pub const DEFAULT_BLOCK_SIZE: usize = 8 * 1024;

/// Padding policy for content that fits in one block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// Only the tail of multi-block content is padded; single-block content
    /// is kept at its natural length.
    #[default]
    TailOnly,
    /// Every block, including a lone short block, is padded to the block size.
    Always,
}

/// Ordered blocks of one fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockMatrix {
    blocks: Vec<Vec<u8>>,
    block_size: usize,
}

impl BlockMatrix {
    /// Wrap blocks produced elsewhere (e.g. received from storage).
    pub fn from_blocks(blocks: Vec<Vec<u8>>, block_size: usize) -> Self {
        Self { blocks, block_size }
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.blocks.get(index).map(Vec::as_slice)
    }

    pub fn blocks(&self) -> &[Vec<u8>] {
        &self.blocks
    }

    /// Block size the matrix was split with.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn into_blocks(self) -> Vec<Vec<u8>> {
        self.blocks
    }
}

/// Split in-memory content into blocks of `sep` bytes.
///
/// Empty content yields a single empty block under [`Padding::TailOnly`] and a
/// single all-zero block under [`Padding::Always`].
///
/// # Errors
///
/// - [`PdpError::InvalidBlockSize`] if `sep` is zero
pub fn split_bytes(data: &[u8], sep: usize, padding: Padding) -> Result<BlockMatrix> {
    if sep == 0 {
        return Err(PdpError::InvalidBlockSize);
    }

    if data.len() <= sep {
        let mut block = data.to_vec();
        if padding == Padding::Always {
            block.resize(sep, 0);
        }
        return Ok(BlockMatrix::from_blocks(vec![block], sep));
    }

    let blocks = data
        .chunks(sep)
        .map(|chunk| {
            let mut block = chunk.to_vec();
            block.resize(sep, 0);
            block
        })
        .collect();

    Ok(BlockMatrix::from_blocks(blocks, sep))
}

/// Read a fragment file and split it into blocks of `sep` bytes.
///
/// # Errors
///
/// - [`PdpError::Io`] if the file cannot be read
/// - [`PdpError::InvalidBlockSize`] if `sep` is zero
pub fn split_file(path: impl AsRef<Path>, sep: usize, padding: Padding) -> Result<BlockMatrix> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| PdpError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let matrix = split_bytes(&data, sep, padding)?;
    tracing::debug!(
        path = %path.display(),
        file_size = data.len(),
        block_size = sep,
        blocks = matrix.len(),
        "fragment split"
    );
    Ok(matrix)
}
