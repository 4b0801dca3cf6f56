use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to move '{temp}' into place at '{path}': {source}")]
    Persist {
        temp: PathBuf,
        path: PathBuf,
        source: io::Error,
    },

    #[error("path has no file name: '{path}'")]
    NoFileName { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
