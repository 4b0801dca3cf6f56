use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use kognit_codec::Codec;
use kognit_fs::{AtomicFile, AtomicWriteOptions};
use tracing::info;

use crate::error::{Error, Result};
use crate::extract::{TarGzSource, ZipSource, extract};
use crate::format::{ArchiveFormat, detect_from_reader};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::pack::{TarGzSink, ZipSink, pack};
use crate::report::{ArchiveReport, EncodeReport};
use crate::walk::walk;

/// Directory archiver for one [`ArchiveFormat`].
///
/// `encode` turns a directory into `<dir><suffix>` next to it; `decode`
/// restores such an archive into a destination directory.
#[derive(Clone, Debug)]
pub struct Archiver {
    format: ArchiveFormat,
    encode: EncodeOptions,
    decode: DecodeOptions,
}

impl Archiver {
    pub fn new(format: ArchiveFormat) -> Self {
        Self {
            format,
            encode: EncodeOptions::default(),
            decode: DecodeOptions::default(),
        }
    }

    pub fn zip() -> Self {
        Self::new(ArchiveFormat::Zip)
    }

    pub fn tar_gz() -> Self {
        Self::new(ArchiveFormat::TarGzip)
    }

    pub fn encode_options(mut self, options: EncodeOptions) -> Self {
        self.encode = options;
        self
    }

    pub fn decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode = options;
        self
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    /// Archive `root` into `root` + suffix.
    ///
    /// The archive is assembled in a temporary file beside the destination and
    /// renamed into place once complete, so a failure never leaves a partial
    /// archive behind and never clobbers an existing one.
    pub fn encode(&self, root: impl AsRef<Path>) -> Result<EncodeReport> {
        let named = root.as_ref();
        let root = std::fs::canonicalize(named).map_err(|e| Error::Input {
            path: named.to_path_buf(),
            source: e,
        })?;
        let entries = walk(&root)?;
        let archive_path = self.format.archive_path(&archive_base(named)?);

        info!(
            root = %root.display(),
            archive = %archive_path.display(),
            format = %self.format,
            "encoding directory"
        );

        let mut file = AtomicFile::create(&archive_path)?;
        let summary = {
            let mut out = BufWriter::new(file.as_file_mut());
            let summary = match self.format {
                ArchiveFormat::Zip => {
                    pack(entries, ZipSink::new(&mut out, &archive_path, &self.encode))?.1
                }
                ArchiveFormat::TarGzip => {
                    pack(entries, TarGzSink::new(&mut out, &archive_path, &self.encode))?.1
                }
            };
            out.flush().map_err(|e| Error::ArchiveWrite {
                path: archive_path.clone(),
                source: e,
            })?;
            summary
        };
        let archive_path = file.commit(AtomicWriteOptions::new())?;

        info!(
            archive = %archive_path.display(),
            entries = summary.entry_count,
            skipped = summary.skipped,
            bytes = summary.total_bytes,
            "archive written"
        );

        Ok(EncodeReport {
            archive_path,
            format: self.format,
            entry_count: summary.entry_count,
            skipped: summary.skipped,
            total_bytes: summary.total_bytes,
        })
    }

    /// Extract `archive` below `destination`, creating it if needed.
    pub fn decode(
        &self,
        archive: impl AsRef<Path>,
        destination: impl AsRef<Path>,
    ) -> Result<ArchiveReport> {
        let archive = archive.as_ref();
        let destination = destination.as_ref();

        info!(
            archive = %archive.display(),
            destination = %destination.display(),
            format = %self.format,
            "decoding archive"
        );

        let report = match self.format {
            ArchiveFormat::Zip => {
                extract(&mut ZipSource::open(archive)?, destination, &self.decode)?
            }
            ArchiveFormat::TarGzip => {
                extract(&mut TarGzSource::open(archive)?, destination, &self.decode)?
            }
        };

        info!(
            entries = report.entry_count,
            bytes = report.total_bytes,
            "archive extracted"
        );
        Ok(report)
    }

    /// Where [`Codec::decode`] extracts `archive`: its path without the format suffix.
    pub fn default_destination(&self, archive: &Path) -> Result<PathBuf> {
        self.format
            .strip_suffix(archive)
            .ok_or_else(|| Error::Input {
                path: archive.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("file name does not end with '{}'", self.format.suffix()),
                ),
            })
    }
}

impl Codec for Archiver {
    type Error = Error;

    fn encode(&self, path: &Path) -> Result<()> {
        Archiver::encode(self, path).map(|_| ())
    }

    fn decode(&self, path: &Path) -> Result<()> {
        let destination = self.default_destination(path)?;
        Archiver::decode(self, path, destination).map(|_| ())
    }
}

/// The path an archive of `root` is named after.
///
/// `.`, `..` and trailing separators are removed lexically and only the parent
/// is canonicalized, so a symlinked root keeps the name the caller used.
fn archive_base(root: &Path) -> Result<PathBuf> {
    let input_error = |source: io::Error| Error::Input {
        path: root.to_path_buf(),
        source,
    };

    let mut normalized = PathBuf::new();
    for component in std::path::absolute(root).map_err(input_error)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }

    let (Some(parent), Some(name)) = (normalized.parent(), normalized.file_name()) else {
        return Err(input_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "directory has no name to derive the archive name from",
        )));
    };
    let parent = std::fs::canonicalize(parent).map_err(input_error)?;
    Ok(parent.join(name))
}

/// Archive `root` into `root` + `format.suffix()` with default options.
pub fn encode(root: impl AsRef<Path>, format: ArchiveFormat) -> Result<EncodeReport> {
    Archiver::new(format).encode(root)
}

/// Extract an archive of a known format with default options.
pub fn decode(
    archive: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    format: ArchiveFormat,
) -> Result<ArchiveReport> {
    Archiver::new(format).decode(archive, destination)
}

/// Extract an archive whose format is sniffed from its leading bytes.
pub fn decode_detect(
    archive: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Result<ArchiveReport> {
    let archive = archive.as_ref();
    let format = detect_archive(archive)?;
    Archiver::new(format).decode(archive, destination)
}

/// Identify an archive on disk by its magic bytes.
pub fn detect_archive(path: impl AsRef<Path>) -> Result<ArchiveFormat> {
    let path = path.as_ref();
    let input_error = |source| Error::Input {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(input_error)?;
    detect_from_reader(&mut file)
        .map_err(input_error)?
        .ok_or(Error::UnsupportedFormat)
}
