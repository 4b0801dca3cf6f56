//! The encode/decode contract shared by every kognit codec.
//!
//! Directory archivers implement [`Codec`] in `kognit-archive`. The single-file
//! and image codecs selectable here have no algorithm behind them yet; they
//! report [`Error::NotImplemented`] instead of pretending to succeed.

use std::path::Path;

mod error;
mod file;
mod image;

pub use error::{Error, Operation, Result};
pub use file::{FileCodec, OUTPUT_EXTENSION};
pub use image::ImageCodec;

/// Encode or decode the filesystem object at `path`.
///
/// Implementations decide where the output goes; callers only learn whether
/// the operation succeeded.
pub trait Codec {
    type Error: std::error::Error + Send + Sync + 'static;

    fn encode(&self, path: &Path) -> std::result::Result<(), Self::Error>;

    fn decode(&self, path: &Path) -> std::result::Result<(), Self::Error>;
}

pub(crate) fn not_implemented(codec: &'static str, operation: Operation, path: &Path) -> Error {
    tracing::warn!(codec, %operation, path = %path.display(), "codec has no implementation");
    Error::NotImplemented {
        codec,
        operation,
        path: path.to_path_buf(),
    }
}
