//! Segment files: `seg-<rotation-ts-ms>-<id>.log`, compacted to `.log.zst`.
//!
//! A segment is a sequence of frames `[u32 LE body length][body]`, where the
//! body is the encrypted entry. Offsets always refer to the uncompressed
//! stream, so compaction never invalidates the index.

mod active;
mod frames;

use std::path::{Path, PathBuf};

pub use active::ActiveSegment;
pub use frames::{read_body, FrameSource};

pub const SEGMENT_PREFIX: &str = "seg-";
pub const RAW_EXT: &str = ".log";
pub const COMPRESSED_EXT: &str = ".log.zst";
/// Length prefix of each frame.
pub const LEN_PREFIX: usize = 4;

/// Base name shared by the raw and the compressed file.
pub fn base_name(created_at_ms: i64, segment_id: i64) -> String {
    format!("{SEGMENT_PREFIX}{created_at_ms:013}-{segment_id:08}")
}

pub fn raw_path(dir: &Path, base: &str) -> PathBuf {
    dir.join(format!("{base}{RAW_EXT}"))
}

pub fn compressed_path(dir: &Path, base: &str) -> PathBuf {
    dir.join(format!("{base}{COMPRESSED_EXT}"))
}

/// Parse `(created_at_ms, segment_id)` from a segment file name.
pub fn parse_name(file_name: &str) -> Option<(i64, i64)> {
    let stem = file_name
        .strip_suffix(COMPRESSED_EXT)
        .or_else(|| file_name.strip_suffix(RAW_EXT))?;
    let rest = stem.strip_prefix(SEGMENT_PREFIX)?;
    let (ts, id) = rest.split_once('-')?;
    Some((ts.parse().ok()?, id.parse().ok()?))
}

/// Total bytes of every segment file in `dir`.
pub fn disk_usage(dir: &Path) -> std::io::Result<u64> {
    let mut total = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if parse_name(&name.to_string_lossy()).is_some() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        let base = base_name(1_700_000_000_123, 42);
        assert_eq!(base, "seg-1700000000123-00000042");
        assert_eq!(parse_name(&format!("{base}.log")), Some((1_700_000_000_123, 42)));
        assert_eq!(parse_name(&format!("{base}.log.zst")), Some((1_700_000_000_123, 42)));
        assert_eq!(parse_name("index.db"), None);
    }
}
