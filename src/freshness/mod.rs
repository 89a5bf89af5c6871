//! Freshness detection: content-hash (blake3) staleness checks backed by a
//! persistent, mode-partitioned cache file.

mod cache;
mod hash;

pub use cache::BuildCache;
pub use hash::{ContentHash, compute_bytes_hash, compute_file_hash};
