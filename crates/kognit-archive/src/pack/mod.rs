//! Archive writers.
//!
//! [`pack`] drains a [`Walk`] into an [`EntrySink`]; each container format only
//! has to know how to frame one directory or one file.

use std::fs::File;
use std::io::{self, Read};

use tracing::{debug, warn};

use crate::entry::{Entry, EntryKind};
use crate::error::{Error, Result};
use crate::walk::Walk;

mod tar;
mod zip;

pub use self::tar::TarGzSink;
pub use self::zip::ZipSink;

/// Destination of a pack operation.
pub trait EntrySink {
    /// What the sink hands back once the archive is complete.
    type Output;

    fn append_directory(&mut self, entry: &Entry) -> Result<()>;

    /// Append a regular file. `data` yields exactly `size` bytes.
    fn append_file(&mut self, entry: &Entry, data: &mut dyn Read, size: u64) -> Result<()>;

    /// Write trailing structures and flush every framing layer.
    fn finish(self) -> Result<Self::Output>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackSummary {
    pub entry_count: usize,
    pub skipped: usize,
    pub total_bytes: u64,
}

/// Write every entry of `walk` into `sink` and finish it.
pub fn pack<S: EntrySink>(walk: Walk, mut sink: S) -> Result<(S::Output, PackSummary)> {
    let mut summary = PackSummary::default();

    for entry in walk {
        let entry = entry?;
        match entry.kind {
            EntryKind::Directory => sink.append_directory(&entry)?,
            EntryKind::File => summary.total_bytes += append_file(&mut sink, &entry)?,
            EntryKind::Other => {
                warn!(
                    entry = %entry.name,
                    path = %entry.source.display(),
                    "skipping entry that is neither a regular file nor a directory"
                );
                summary.skipped += 1;
                continue;
            }
        }
        debug!(entry = %entry.name, kind = entry.kind.as_str(), "packed");
        summary.entry_count += 1;
    }

    let output = sink.finish()?;
    Ok((output, summary))
}

fn append_file<S: EntrySink>(sink: &mut S, entry: &Entry) -> Result<u64> {
    let input_error = |source| Error::Input {
        path: entry.source.clone(),
        source,
    };

    let file = File::open(&entry.source).map_err(input_error)?;
    // the size of the opened file wins over the one seen during the walk
    let size = file.metadata().map_err(input_error)?.len();
    let mut reader = SourceReader::new(file, size);

    match sink.append_file(entry, &mut reader, size) {
        Ok(()) => Ok(size),
        Err(err) => Err(reader.take_error().map_or(err, input_error)),
    }
}

/// Reads at most `remaining` bytes and remembers the first failure, so a sink
/// error caused by the source file can be reported against that file.
struct SourceReader<R> {
    inner: R,
    remaining: u64,
    error: Option<io::Error>,
}

impl<R: Read> SourceReader<R> {
    fn new(inner: R, remaining: u64) -> Self {
        Self {
            inner,
            remaining,
            error: None,
        }
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn fail(&mut self, err: io::Error) -> io::Error {
        let reported = io::Error::new(err.kind(), err.to_string());
        self.error.get_or_insert(err);
        reported
    }
}

impl<R: Read> Read for SourceReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let max = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        match self.inner.read(&mut buf[..max]) {
            Ok(0) => Err(self.fail(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "file shrank while it was being archived",
            ))),
            Ok(n) => {
                self.remaining -= n as u64;
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(e),
            Err(e) => Err(self.fail(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::walk;
    use std::io::Cursor;
    use tempfile::tempdir;

    /// Records what it is asked to write.
    #[derive(Default)]
    struct RecordingSink {
        entries: Vec<(String, Vec<u8>)>,
        finished: bool,
    }

    impl EntrySink for RecordingSink {
        type Output = Self;

        fn append_directory(&mut self, entry: &Entry) -> Result<()> {
            self.entries.push((format!("{}/", entry.name), Vec::new()));
            Ok(())
        }

        fn append_file(&mut self, entry: &Entry, data: &mut dyn Read, size: u64) -> Result<()> {
            let mut buf = Vec::new();
            data.read_to_end(&mut buf).unwrap();
            assert_eq!(buf.len() as u64, size);
            self.entries.push((entry.name.clone(), buf));
            Ok(())
        }

        fn finish(mut self) -> Result<Self> {
            self.finished = true;
            Ok(self)
        }
    }

    #[test]
    fn pack_visits_entries_in_walk_order() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/readme"), "hello").unwrap();
        std::fs::write(dir.path().join("empty"), "").unwrap();

        let (sink, summary) = pack(walk(dir.path()).unwrap(), RecordingSink::default()).unwrap();

        assert!(sink.finished);
        assert_eq!(
            sink.entries,
            vec![
                ("docs/".to_string(), Vec::new()),
                ("docs/readme".to_string(), b"hello".to_vec()),
                ("empty".to_string(), Vec::new()),
            ]
        );
        assert_eq!(summary.entry_count, 3);
        assert_eq!(summary.total_bytes, 5);
        assert_eq!(summary.skipped, 0);
    }

    #[cfg(unix)]
    #[test]
    fn pack_skips_symlinks() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("target"), "data").unwrap();
        std::os::unix::fs::symlink("target", dir.path().join("link")).unwrap();

        let (sink, summary) = pack(walk(dir.path()).unwrap(), RecordingSink::default()).unwrap();
        assert_eq!(sink.entries.len(), 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn source_reader_stops_at_limit() {
        let mut reader = SourceReader::new(Cursor::new(b"0123456789"), 4);
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"0123");
        assert!(reader.take_error().is_none());
    }

    #[test]
    fn source_reader_reports_short_source() {
        let mut reader = SourceReader::new(Cursor::new(b"012"), 10);
        let mut buf = Vec::new();
        let err = reader.read_to_end(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        let recorded = reader.take_error().unwrap();
        assert_eq!(recorded.kind(), io::ErrorKind::UnexpectedEof);
    }
}
