use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::EntryType;
use tracing::debug;

use super::{EntrySource, PendingEntry};
use crate::entry::EntryKind;
use crate::error::{Error, Result};
use crate::format::ArchiveFormat;

/// Reads a gzip-compressed tar stream front to back.
pub struct TarGzSource<R: Read> {
    decoder: GzDecoder<R>,
    path: PathBuf,
}

impl TarGzSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::Input {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: Read> TarGzSource<R> {
    /// Nothing is read until [`visit`](EntrySource::visit); a bad gzip header
    /// surfaces there. `path` names the archive in errors.
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            decoder: GzDecoder::new(reader),
            path: path.into(),
        }
    }
}

impl<R: Read> EntrySource for TarGzSource<R> {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::TarGzip
    }

    fn archive_path(&self) -> &Path {
        &self.path
    }

    fn visit(&mut self, visitor: &mut dyn FnMut(PendingEntry<'_>) -> Result<()>) -> Result<()> {
        let path = &self.path;
        let stream_error = |e| Error::stream(path, e);

        {
            let mut archive = tar::Archive::new(&mut self.decoder);
            for entry in archive.entries().map_err(stream_error)? {
                let mut entry = entry.map_err(stream_error)?;

                let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
                let entry_type = entry.header().entry_type();
                let kind = match entry_type {
                    // archive-wide pax metadata such as the commit id `git archive` records
                    EntryType::XGlobalHeader => {
                        debug!(entry = %name, "skipping pax global header");
                        continue;
                    }
                    EntryType::Directory => EntryKind::Directory,
                    EntryType::Regular | EntryType::Continuous => EntryKind::File,
                    other => {
                        return Err(Error::UnsupportedEntry {
                            entry: name,
                            kind: format!("type flag '{}'", char::from(other.as_byte())),
                        });
                    }
                };
                let mode = entry.header().mode().ok();
                let size = entry.size();

                visitor(PendingEntry {
                    name,
                    kind,
                    size,
                    mode,
                    data: &mut entry,
                })?;
            }
        }

        // tar stops at the end-of-archive blocks; drain the rest so a damaged
        // gzip trailer is noticed
        io::copy(&mut self.decoder, &mut io::sink()).map_err(stream_error)?;
        Ok(())
    }
}
