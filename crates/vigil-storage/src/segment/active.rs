use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use vigil_core::errors::StorageError;

use super::{raw_path, LEN_PREFIX};

/// What an appender needs from the file underneath it.
pub(crate) trait SegmentFile: Write {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl SegmentFile for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Frame writer that keeps `bytes` equal to the file length. A failed write
/// is cut back to the last whole frame; if that cut fails too, the appender
/// is poisoned and refuses further frames.
#[derive(Debug)]
pub(crate) struct FrameAppender<F> {
    file: F,
    bytes: u64,
    poisoned: bool,
}

impl<F: SegmentFile> FrameAppender<F> {
    pub(crate) fn new(file: F) -> Self {
        Self {
            file,
            bytes: 0,
            poisoned: false,
        }
    }

    /// Append one frame; returns its offset.
    pub(crate) fn append(&mut self, body: &[u8]) -> Result<u64, StorageError> {
        if self.poisoned {
            return Err(StorageError::io(
                "append frame",
                "segment holds a partial frame and takes no more writes",
            ));
        }
        let len = u32::try_from(body.len()).map_err(|_| StorageError::Serialization {
            reason: format!("frame of {} bytes exceeds u32", body.len()),
        })?;
        let mut frame = Vec::with_capacity(LEN_PREFIX + body.len());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(body);

        let offset = self.bytes;
        if let Err(write_err) = self.file.write_all(&frame) {
            if let Err(cut_err) = self.file.truncate_to(offset) {
                self.poisoned = true;
                tracing::error!(
                    event = "segment_poisoned",
                    offset = offset,
                    write_error = %write_err,
                    truncate_error = %cut_err,
                    "partial frame could not be removed"
                );
            }
            return Err(StorageError::io("append frame", write_err));
        }
        self.bytes += frame.len() as u64;
        Ok(offset)
    }

    pub(crate) fn sync(&mut self) -> Result<(), StorageError> {
        self.file
            .sync()
            .map_err(|e| StorageError::io("sync segment", e))
    }

    pub(crate) fn bytes(&self) -> u64 {
        self.bytes
    }

    pub(crate) fn is_poisoned(&self) -> bool {
        self.poisoned
    }
}

/// The single writable segment.
#[derive(Debug)]
pub struct ActiveSegment {
    pub segment_id: i64,
    pub base: String,
    pub created_at_ms: i64,
    path: PathBuf,
    out: FrameAppender<File>,
    entries: u64,
    opened: Instant,
}

impl ActiveSegment {
    pub fn create(dir: &Path, segment_id: i64, created_at_ms: i64) -> Result<Self, StorageError> {
        let base = super::base_name(created_at_ms, segment_id);
        let path = raw_path(dir, &base);
        let file = OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(&path)
            .map_err(|e| StorageError::io("create segment", e))?;
        Ok(Self {
            segment_id,
            base,
            created_at_ms,
            path,
            out: FrameAppender::new(file),
            entries: 0,
            opened: Instant::now(),
        })
    }

    /// Append one frame; returns its offset.
    pub fn write_frame(&mut self, body: &[u8]) -> Result<u64, StorageError> {
        let offset = self.out.append(body)?;
        self.entries += 1;
        Ok(offset)
    }

    pub fn sync(&mut self) -> Result<(), StorageError> {
        self.out.sync()
    }

    pub fn bytes(&self) -> u64 {
        self.out.bytes()
    }

    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// True once a partial frame is stuck in the file. The store must stop
    /// appending here and open a new segment.
    pub fn is_poisoned(&self) -> bool {
        self.out.is_poisoned()
    }

    pub fn age_secs(&self) -> u64 {
        self.opened.elapsed().as_secs()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::super::frames::{read_body, FrameSource};
    use super::*;

    /// In-memory file that accepts `budget` more bytes, then fails mid-write.
    #[derive(Debug, Default)]
    struct FlakyFile {
        data: Vec<u8>,
        budget: Option<usize>,
        truncate_fails: bool,
    }

    impl Write for FlakyFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = match self.budget {
                Some(0) => return Err(io::Error::new(io::ErrorKind::Other, "no space left")),
                Some(left) => buf.len().min(left),
                None => buf.len(),
            };
            if let Some(left) = self.budget.as_mut() {
                *left -= n;
            }
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SegmentFile for FlakyFile {
        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            if self.truncate_fails {
                return Err(io::Error::new(io::ErrorKind::Other, "read-only"));
            }
            self.data.truncate(len as usize);
            Ok(())
        }

        fn sync(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn read_at(data: &[u8], offset: u64, len: usize) -> Vec<u8> {
        let mut source = FrameSource::Decompressed(data.to_vec());
        read_body(&mut source, "seg-test", offset, len as u64).unwrap()
    }

    #[test]
    fn failed_write_is_cut_back_and_next_frame_lands_at_its_offset() {
        let mut out = FrameAppender::new(FlakyFile::default());
        let a = out.append(&[0xA1; 100]).unwrap();

        out.file.budget = Some(40);
        assert!(out.append(&[0xB2; 100]).is_err());
        assert_eq!(out.file.data.len() as u64, out.bytes());
        assert!(!out.is_poisoned());

        out.file.budget = None;
        let c = out.append(&[0xC3; 60]).unwrap();
        assert_eq!(c, out.bytes() - (LEN_PREFIX + 60) as u64);
        assert_eq!(out.file.data.len() as u64, out.bytes());

        assert_eq!(read_at(&out.file.data, a, 100), vec![0xA1; 100]);
        assert_eq!(read_at(&out.file.data, c, 60), vec![0xC3; 60]);
    }

    #[test]
    fn failed_cut_poisons_the_appender() {
        let mut out = FrameAppender::new(FlakyFile::default());
        out.append(b"first").unwrap();

        out.file.budget = Some(3);
        out.file.truncate_fails = true;
        assert!(out.append(b"second").is_err());
        assert!(out.is_poisoned());

        out.file.budget = None;
        let before = out.file.data.len();
        assert!(out.append(b"third").is_err());
        assert_eq!(out.file.data.len(), before);
    }
}
