use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read '{path}': {source}")]
    Input { path: PathBuf, source: io::Error },

    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("path is not valid UTF-8 and cannot be stored in an archive: '{path}'")]
    NonUtf8Name { path: PathBuf },

    #[error("unsupported archive format")]
    UnsupportedFormat,

    #[error("archive '{archive}' is corrupted: {reason}")]
    Corrupted { archive: PathBuf, reason: String },

    #[error("entry '{entry}' has unsupported type '{kind}'")]
    UnsupportedEntry { entry: String, kind: String },

    #[error("zip-slip attack detected: entry '{entry}' resolves to '{resolved}'")]
    ZipSlip { entry: String, resolved: PathBuf },

    #[error("invalid entry name '{entry}'")]
    InvalidPath { entry: String },

    #[error("strip_components({count}) removed all path components from '{original}'")]
    NoComponentsRemaining { original: String, count: usize },

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error("failed to write archive '{path}': {source}")]
    ArchiveWrite { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Fs(#[from] kognit_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`], stable across variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The directory to archive or the archive to read is missing or unreadable.
    Input,
    /// The archive does not parse as the declared format.
    Format,
    /// An entry would be written outside the destination root.
    Security,
    /// Creating, reading or writing a file failed.
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input { .. } | Self::NotADirectory { .. } | Self::NonUtf8Name { .. } => {
                ErrorKind::Input
            }
            Self::UnsupportedFormat
            | Self::Corrupted { .. }
            | Self::UnsupportedEntry { .. }
            | Self::InvalidPath { .. }
            | Self::NoComponentsRemaining { .. } => ErrorKind::Format,
            Self::ZipSlip { .. } => ErrorKind::Security,
            Self::ExtractionFailed { .. }
            | Self::DirectoryCreationFailed { .. }
            | Self::ArchiveWrite { .. }
            | Self::Fs(_) => ErrorKind::Io,
        }
    }

    /// Classify an error raised while reading the archive stream itself.
    ///
    /// Decoder and container parsers report damaged input as
    /// `UnexpectedEof`/`InvalidData`/`InvalidInput`/`Other`; those become
    /// [`Error::Corrupted`]. Everything else is a plain read failure.
    pub(crate) fn stream(archive: impl Into<PathBuf>, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::InvalidData
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::Other => Self::Corrupted {
                archive: archive.into(),
                reason: err.to_string(),
            },
            _ => Self::Input {
                path: archive.into(),
                source: err,
            },
        }
    }

    pub(crate) fn zip(archive: impl Into<PathBuf>, err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Self::stream(archive, e),
            other => Self::Corrupted {
                archive: archive.into(),
                reason: other.to_string(),
            },
        }
    }
}
