//! Fingerprinting: full hash below 10 MiB, sampled plan above it.

mod common;

use common::{MIB, sparse_file, write_file};
use filededup::engine::hashing::middle_budget;
use filededup::engine::{HashStrategy, SamplePlan, fingerprint, hash_full, hash_sampled};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Cursor;

// --- full hash ---

#[test]
fn test_hash_full_known_vectors() {
    assert_eq!(
        hash_full(&mut Cursor::new(b"")).unwrap(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(
        hash_full(&mut Cursor::new(b"abc")).unwrap(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_hash_full_spans_many_buffers() {
    // Larger than the 64 KiB read buffer, not a multiple of it.
    let data: Vec<u8> = (0..200_003_u32).map(|i| (i % 251) as u8).collect();
    let expected = format!("{:x}", Sha256::digest(&data));
    assert_eq!(hash_full(&mut Cursor::new(&data)).unwrap(), expected);
}

#[test]
fn test_small_file_fingerprint_is_full_content_hash() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.bin");
    let data = vec![7u8; 4096];
    write_file(&path, &data);

    let fp = fingerprint(&path, data.len() as u64).unwrap();
    assert_eq!(fp, format!("{:x}", Sha256::digest(&data)));
    assert_eq!(fp, hash_full(&mut File::open(&path).unwrap()).unwrap());
    assert_eq!(fp.len(), 64);
    assert!(fp.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

// --- strategy selection / plan ---

#[test]
fn test_strategy_threshold() {
    assert_eq!(HashStrategy::for_size(0), HashStrategy::Full);
    assert_eq!(HashStrategy::for_size(10 * MIB - 1), HashStrategy::Full);
    assert_eq!(HashStrategy::for_size(10 * MIB), HashStrategy::Sampled);
    assert_eq!(HashStrategy::for_size(5 * 1024 * MIB), HashStrategy::Sampled);
}

#[test]
fn test_middle_budget_bands() {
    assert_eq!(middle_budget(10 * MIB), 0);
    assert_eq!(middle_budget(10 * MIB + 10), (10 * MIB + 10) / 10);
    assert_eq!(middle_budget(50 * MIB), 5 * MIB);
    assert_eq!(middle_budget(100 * MIB), 10 * MIB);
    assert_eq!(middle_budget(100 * MIB + 1), 10 * MIB);
    assert_eq!(middle_budget(64 * 1024 * MIB), 10 * MIB);
}

#[test]
fn test_plan_at_exact_threshold_has_no_middle() {
    let plan = SamplePlan::for_size(10 * MIB);
    assert!(plan.sample_offsets.is_empty());
    assert_eq!(plan.head_len, MIB);
    assert_eq!(plan.tail_offset, Some(9 * MIB));
    assert_eq!(plan.content_bytes(), 2 * MIB);
}

#[test]
fn test_plan_proportional_band() {
    let plan = SamplePlan::for_size(50 * MIB);
    assert_eq!(plan.sample_len, MIB / 2);
    assert_eq!(plan.sample_offsets.len(), 10);
    // Evenly spaced across [1 MiB, 49 MiB).
    assert_eq!(plan.sample_offsets[0], MIB);
    assert_eq!(plan.sample_offsets[5], MIB + 48 * MIB * 5 / 10);
    assert_eq!(plan.content_bytes(), 2 * MIB + 5 * MIB);
}

#[test]
fn test_plan_is_bounded_for_huge_files() {
    for size in [150 * MIB, 1024 * MIB, 1024 * 1024 * MIB] {
        let plan = SamplePlan::for_size(size);
        assert_eq!(plan.sample_offsets.len(), 10);
        assert_eq!(plan.sample_len, MIB);
        assert_eq!(plan.tail_offset, Some(size - MIB));
        assert_eq!(plan.content_bytes(), 12 * MIB);
        assert!(plan.sample_offsets.windows(2).all(|w| w[0] < w[1]));
        assert!(plan.sample_offsets.iter().all(|&o| o >= MIB && o + MIB <= size - MIB));
    }
}

// --- sampled hash composition ---

#[test]
fn test_sampled_hash_composition() {
    let size = 12 * MIB;
    let data: Vec<u8> = (0..size).map(|i| (i * 31 % 251) as u8).collect();

    let budget = size / 10;
    let sample = budget / 10;
    let mut h = Sha256::new();
    h.update(&data[..MIB as usize]);
    for i in 0..10 {
        let off = (MIB + (size - 2 * MIB) * i / 10) as usize;
        h.update(&data[off..off + sample as usize]);
    }
    h.update(&data[(size - MIB) as usize..]);
    h.update(size.to_le_bytes());
    let expected = format!("{:x}", h.finalize());

    let (hex, hashed) = hash_sampled(&mut Cursor::new(&data), size).unwrap();
    assert_eq!(hex, expected);
    assert_eq!(hashed, 2 * MIB + sample * 10);
    assert_eq!(hashed, SamplePlan::for_size(size).content_bytes());
}

#[test]
fn test_sampled_hash_tolerates_short_stream() {
    // Stream shorter than the declared size: segments stop at EOF instead of failing.
    let data = vec![1u8; (3 * MIB) as usize];
    let (hex, hashed) = hash_sampled(&mut Cursor::new(&data), 20 * MIB).unwrap();
    assert_eq!(hex.len(), 64);
    assert!(hashed < SamplePlan::for_size(20 * MIB).content_bytes());
}

// --- large-file scenarios on sparse files ---

#[test]
fn test_large_file_hash_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.bin");
    let size = 150 * MIB;
    sparse_file(&path, size, &[(5, 1), (20 * MIB, 2), (size - 3, 3)]);

    let a = fingerprint(&path, size).unwrap();
    let b = fingerprint(&path, size).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_unsampled_byte_difference_collides() {
    let dir = tempfile::tempdir().unwrap();
    let size = 150 * MIB;
    // Sample 0 covers [1 MiB, 2 MiB); sample 1 starts at 1 MiB + 14.8 MiB.
    let unsampled = 2 * MIB + 100;
    let plan = SamplePlan::for_size(size);
    assert!(
        plan.sample_offsets
            .iter()
            .all(|&o| unsampled < o || unsampled >= o + plan.sample_len)
    );

    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    sparse_file(&a, size, &[]);
    sparse_file(&b, size, &[(unsampled, 0xFF)]);

    assert_eq!(fingerprint(&a, size).unwrap(), fingerprint(&b, size).unwrap());
}

#[test]
fn test_sampled_byte_difference_changes_hash() {
    let dir = tempfile::tempdir().unwrap();
    let size = 150 * MIB;
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    let c = dir.path().join("c.bin");
    sparse_file(&a, size, &[]);
    sparse_file(&b, size, &[(MIB + 10, 0xFF)]);
    sparse_file(&c, size, &[(size - 1, 0xFF)]);

    let ha = fingerprint(&a, size).unwrap();
    assert_ne!(ha, fingerprint(&b, size).unwrap());
    assert_ne!(ha, fingerprint(&c, size).unwrap());
}

#[test]
fn test_same_samples_different_size_differ() {
    let dir = tempfile::tempdir().unwrap();
    // Both above 100 MiB and all zeros: every sampled byte is identical, only the size differs.
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    sparse_file(&a, 150 * MIB, &[]);
    sparse_file(&b, 160 * MIB, &[]);

    assert_ne!(
        fingerprint(&a, 150 * MIB).unwrap(),
        fingerprint(&b, 160 * MIB).unwrap()
    );
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(fingerprint(&dir.path().join("nope"), 10).is_err());
}
