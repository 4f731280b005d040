//! File fingerprinting.
//!
//! Files below [`HashingConsts::FULL_HASH_LIMIT`] are hashed in full. Larger files are hashed
//! from a fixed [`SamplePlan`]: the first and last MiB, ten evenly spaced middle samples, and the
//! exact size as 8 little-endian bytes. The sampled digest is deterministic for a given size and
//! the bytes at the sampled offsets; files differing only outside those offsets collide.

use anyhow::Result;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::utils::config::HashingConsts;

/// Which strategy [`fingerprint`] uses for a file of a given size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashStrategy {
    Full,
    Sampled,
}

impl HashStrategy {
    pub fn for_size(size: u64) -> Self {
        if size < HashingConsts::FULL_HASH_LIMIT {
            HashStrategy::Full
        } else {
            HashStrategy::Sampled
        }
    }
}

/// Byte ranges read for a sampled hash, in digest order: head, middle samples, tail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SamplePlan {
    pub size: u64,
    pub head_len: u64,
    /// Start offsets of the middle samples (empty when there is no middle budget).
    pub sample_offsets: Vec<u64>,
    pub sample_len: u64,
    /// Start offset of the tail segment, `None` when the file is no larger than the head.
    pub tail_offset: Option<u64>,
    pub tail_len: u64,
}

impl SamplePlan {
    pub fn for_size(size: u64) -> Self {
        let head = HashingConsts::HEAD_SIZE;
        let tail = HashingConsts::TAIL_SIZE;
        let budget = middle_budget(size);

        let (sample_offsets, sample_len) = if budget > 0 && size > head + tail {
            let range = size - tail - head;
            let n = HashingConsts::SAMPLE_COUNT;
            let offsets = (0..n).map(|i| head + range * i / n).collect();
            (offsets, budget / n)
        } else {
            (Vec::new(), 0)
        };

        let (tail_offset, tail_len) = if size > head && tail > 0 {
            (Some(size.saturating_sub(tail)), tail.min(size))
        } else {
            (None, 0)
        };

        SamplePlan {
            size,
            head_len: head.min(size),
            sample_offsets,
            sample_len,
            tail_offset,
            tail_len,
        }
    }

    /// Content bytes the plan feeds to the digest (excluding the 8-byte size suffix).
    pub fn content_bytes(&self) -> u64 {
        self.head_len + self.sample_len * self.sample_offsets.len() as u64 + self.tail_len
    }
}

/// Middle sampling budget: 10% of the size in (10 MiB, 100 MiB], a flat 10 MiB above, none otherwise.
pub fn middle_budget(size: u64) -> u64 {
    if size > HashingConsts::PROPORTIONAL_LIMIT {
        HashingConsts::MAX_MIDDLE_BUDGET
    } else if size > HashingConsts::FULL_HASH_LIMIT {
        size / HashingConsts::MIDDLE_BUDGET_DIVISOR
    } else {
        0
    }
}

/// Fingerprint `path` of `size` bytes with the size-appropriate strategy.
pub fn fingerprint(path: &Path, size: u64) -> Result<String> {
    let mut file = File::open(path)?;
    let hex = match HashStrategy::for_size(size) {
        HashStrategy::Full => hash_full(&mut file)?,
        HashStrategy::Sampled => hash_sampled(&mut file, size)?.0,
    };
    Ok(hex)
}

/// Stream every byte of `reader` through SHA-256; returns lowercase hex.
pub fn hash_full<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HashingConsts::READ_BUFFER_SIZE];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Sampled hash of a `size`-byte stream per [`SamplePlan::for_size`].
/// Returns `(hex, content_bytes_hashed)`; short reads at a segment end are tolerated.
pub fn hash_sampled<R: Read + Seek>(reader: &mut R, size: u64) -> io::Result<(String, u64)> {
    let plan = SamplePlan::for_size(size);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HashingConsts::READ_BUFFER_SIZE];
    let mut hashed = 0_u64;

    reader.seek(SeekFrom::Start(0))?;
    hashed += copy_segment(reader, &mut hasher, plan.head_len, &mut buffer)?;

    for &offset in &plan.sample_offsets {
        reader.seek(SeekFrom::Start(offset))?;
        hashed += copy_segment(reader, &mut hasher, plan.sample_len, &mut buffer)?;
    }

    if let Some(offset) = plan.tail_offset {
        reader.seek(SeekFrom::Start(offset))?;
        hashed += copy_segment(reader, &mut hasher, plan.tail_len, &mut buffer)?;
    }

    hasher.update(size.to_le_bytes());
    Ok((format!("{:x}", hasher.finalize()), hashed))
}

/// Feed up to `len` bytes from the current position into `hasher`. Stops early at EOF.
fn copy_segment<R: Read>(
    reader: &mut R,
    hasher: &mut Sha256,
    len: u64,
    buffer: &mut [u8],
) -> io::Result<u64> {
    let mut remaining = len;
    while remaining > 0 {
        let want = remaining.min(buffer.len() as u64) as usize;
        let n = match reader.read(&mut buffer[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
        remaining -= n as u64;
    }
    Ok(len - remaining)
}
