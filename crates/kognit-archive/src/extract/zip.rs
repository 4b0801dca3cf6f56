use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use super::{EntrySource, PendingEntry};
use crate::entry::EntryKind;
use crate::error::{Error, Result};
use crate::format::ArchiveFormat;

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Reads a ZIP archive in central-directory order.
pub struct ZipSource<R: Read + Seek> {
    archive: ZipArchive<R>,
    path: PathBuf,
}

impl ZipSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::Input {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::new(BufReader::new(file), path)
    }
}

impl<R: Read + Seek> ZipSource<R> {
    /// Parse the central directory of `reader`. `path` names the archive in errors.
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let archive = ZipArchive::new(reader).map_err(|e| Error::zip(&path, e))?;
        Ok(Self { archive, path })
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn archive_path(&self) -> &Path {
        &self.path
    }

    fn visit(&mut self, visitor: &mut dyn FnMut(PendingEntry<'_>) -> Result<()>) -> Result<()> {
        for index in 0..self.archive.len() {
            let mut file = self
                .archive
                .by_index(index)
                .map_err(|e| Error::zip(&self.path, e))?;

            // the raw name; sanitizing is the extractor's job
            let name = file.name().to_string();
            let mode = file.unix_mode();
            if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
                return Err(Error::UnsupportedEntry {
                    entry: name,
                    kind: "symlink".to_string(),
                });
            }

            let kind = if file.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let size = if kind == EntryKind::File { file.size() } else { 0 };

            visitor(PendingEntry {
                name,
                kind,
                size,
                mode,
                data: &mut file,
            })?;
        }
        Ok(())
    }
}
