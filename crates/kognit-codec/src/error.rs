use std::fmt;
use std::path::PathBuf;

/// Which half of the codec contract was invoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Encode,
    Decode,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => f.write_str("encode"),
            Self::Decode => f.write_str("decode"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{codec} {operation} is not implemented (input: '{path}')")]
    NotImplemented {
        codec: &'static str,
        operation: Operation,
        path: PathBuf,
    },

    #[error("unknown codec '{name}'")]
    UnknownCodec { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
