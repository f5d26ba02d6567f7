use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use vigil_core::errors::StorageError;

use super::{compressed_path, raw_path, LEN_PREFIX};

/// Readable bytes of one segment: a seekable raw file or a decompressed
/// buffer of a compacted one.
#[derive(Debug)]
pub enum FrameSource {
    Raw(File),
    Decompressed(Vec<u8>),
}

impl FrameSource {
    /// Open a segment, preferring the raw file and falling back to the
    /// compacted one. `Ok(None)` if neither exists (already purged).
    pub fn open(dir: &Path, base: &str) -> Result<Option<Self>, StorageError> {
        match File::open(raw_path(dir, base)) {
            Ok(file) => return Ok(Some(Self::Raw(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::io("open segment", e)),
        }
        match File::open(compressed_path(dir, base)) {
            Ok(file) => {
                let bytes = zstd::decode_all(file).map_err(|e| StorageError::Corruption {
                    segment: base.to_string(),
                    details: format!("zstd: {e}"),
                })?;
                Ok(Some(Self::Decompressed(bytes)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io("open compacted segment", e)),
        }
    }
}

/// Read the body of the frame at `offset`, checking its length prefix.
pub fn read_body(
    source: &mut FrameSource,
    base: &str,
    offset: u64,
    expected_len: u64,
) -> Result<Vec<u8>, StorageError> {
    let corrupt = |details: String| StorageError::Corruption {
        segment: base.to_string(),
        details,
    };

    let (prefix, body) = match source {
        FrameSource::Raw(file) => {
            file.seek(SeekFrom::Start(offset))
                .map_err(|e| StorageError::io("seek frame", e))?;
            let mut prefix = [0u8; LEN_PREFIX];
            file.read_exact(&mut prefix)
                .map_err(|e| corrupt(format!("frame header at {offset}: {e}")))?;
            let mut body = vec![0u8; expected_len as usize];
            file.read_exact(&mut body)
                .map_err(|e| corrupt(format!("frame body at {offset}: {e}")))?;
            (prefix, body)
        }
        FrameSource::Decompressed(bytes) => {
            let start = offset as usize;
            let body_start = start + LEN_PREFIX;
            let end = body_start + expected_len as usize;
            if end > bytes.len() {
                return Err(corrupt(format!("frame at {offset} runs past end of segment")));
            }
            let mut prefix = [0u8; LEN_PREFIX];
            prefix.copy_from_slice(&bytes[start..body_start]);
            (prefix, bytes[body_start..end].to_vec())
        }
    };

    let declared = u32::from_le_bytes(prefix) as u64;
    if declared != expected_len {
        return Err(corrupt(format!(
            "frame at {offset} declares {declared} bytes, index says {expected_len}"
        )));
    }
    Ok(body)
}
