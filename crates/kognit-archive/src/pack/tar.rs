use std::io::{self, Read, Write};
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, EntryType, Header};

use super::EntrySink;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::options::EncodeOptions;

/// Writes a tar stream through a single gzip encoder.
pub struct TarGzSink<W: Write> {
    builder: Builder<GzEncoder<W>>,
    path: PathBuf,
}

impl<W: Write> TarGzSink<W> {
    /// `path` is only used to name the archive in errors.
    pub fn new(inner: W, path: impl Into<PathBuf>, options: &EncodeOptions) -> Self {
        let encoder = GzEncoder::new(inner, Compression::new(options.effective_level()));
        Self {
            builder: Builder::new(encoder),
            path: path.into(),
        }
    }

    fn append(&mut self, entry: &Entry, mut header: Header, data: impl Read) -> Result<()> {
        header.set_mode(entry.mode & 0o7777);
        header.set_mtime(entry.mtime_secs());
        // also emits a GNU long-name record when the name exceeds 100 bytes
        self.builder
            .append_data(&mut header, &entry.name, data)
            .map_err(|e| write_error(&self.path, e))
    }
}

impl<W: Write> EntrySink for TarGzSink<W> {
    type Output = W;

    fn append_directory(&mut self, entry: &Entry) -> Result<()> {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Directory);
        header.set_size(0);
        self.append(entry, header, io::empty())
    }

    fn append_file(&mut self, entry: &Entry, data: &mut dyn Read, size: u64) -> Result<()> {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(size);
        self.append(entry, header, data)
    }

    /// End-of-archive blocks first, then the gzip trailer.
    fn finish(self) -> Result<W> {
        let path = self.path;
        let encoder = self
            .builder
            .into_inner()
            .map_err(|e| write_error(&path, e))?;
        encoder.finish().map_err(|e| write_error(&path, e))
    }
}

fn write_error(path: &std::path::Path, source: io::Error) -> Error {
    Error::ArchiveWrite {
        path: path.to_path_buf(),
        source,
    }
}
