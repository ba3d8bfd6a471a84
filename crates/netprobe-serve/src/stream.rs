//! Bounded random-byte stream generator for the download probe.
//!
//! The generator is an explicit pull-based iterator: a chunk of random bytes
//! exists only once the consumer asks for it, so a slow client bounds memory
//! use to a single chunk. The last chunk is truncated so the stream ends at
//! exactly the requested total.

use bytes::Bytes;
use rand::RngCore;

/// One streamed unit: 128 KiB.
pub const CHUNK_SIZE: usize = 128 * 1024;

/// Bytes per megabyte of requested payload.
pub const MIB: u64 = 1024 * 1024;

/// Download probe size bounds, in megabytes.
pub const DOWNLOAD_DEFAULT_MB: i64 = 50;
pub const DOWNLOAD_MIN_MB: i64 = 1;
pub const DOWNLOAD_MAX_MB: i64 = 200;

/// Upload probe advisory hint bounds, in megabytes. The hint is never
/// enforced against bytes actually received.
pub const UPLOAD_DEFAULT_MB: i64 = 10;
pub const UPLOAD_MIN_MB: i64 = 1;
pub const UPLOAD_MAX_MB: i64 = 100;

/// Resolve the requested download size to megabytes within bounds.
pub fn clamp_download_mb(requested: Option<i64>) -> u64 {
    requested
        .unwrap_or(DOWNLOAD_DEFAULT_MB)
        .clamp(DOWNLOAD_MIN_MB, DOWNLOAD_MAX_MB) as u64
}

/// Resolve the advisory upload size hint to megabytes within bounds.
pub fn clamp_upload_hint_mb(requested: Option<i64>) -> u64 {
    requested
        .unwrap_or(UPLOAD_DEFAULT_MB)
        .clamp(UPLOAD_MIN_MB, UPLOAD_MAX_MB) as u64
}

/// Pull-based generator of random byte chunks totalling an exact length.
///
/// Each `next()` yields `min(CHUNK_SIZE, remaining)` freshly generated
/// bytes; the iterator ends once the running total reaches the requested
/// size. Content is pseudo-random and intentionally non-reproducible; only
/// the length contract matters for the probe.
pub struct RandomChunks {
    remaining: usize,
}

impl RandomChunks {
    pub fn new(total_bytes: usize) -> Self {
        Self {
            remaining: total_bytes,
        }
    }

    /// Bytes not yet produced.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl Iterator for RandomChunks {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.remaining == 0 {
            return None;
        }
        let len = CHUNK_SIZE.min(self.remaining);
        let mut buf = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut buf);
        self.remaining -= len;
        Some(Bytes::from(buf))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let chunks = self.remaining.div_ceil(CHUNK_SIZE);
        (chunks, Some(chunks))
    }
}
