use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{Codec, Error, Operation, Result, not_implemented};

/// Extension of files produced by the single-file codecs.
pub const OUTPUT_EXTENSION: &str = "kgi";

/// Single-file compression codecs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FileCodec {
    Flate,
    Gzip,
    #[default]
    Huffman,
    Lz77,
    Lzw,
    Rle,
}

impl FileCodec {
    pub const ALL: [FileCodec; 6] = [
        Self::Flate,
        Self::Gzip,
        Self::Huffman,
        Self::Lz77,
        Self::Lzw,
        Self::Rle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Flate => "Flate",
            Self::Gzip => "Gzip",
            Self::Huffman => "Huffman",
            Self::Lz77 => "LZ77",
            Self::Lzw => "LZW",
            Self::Rle => "RLE",
        }
    }

    /// Sibling file the encoded output is written to: `<dir>/<stem>.kgi`.
    ///
    /// The stem is everything before the first `.` of the file name, so
    /// `notes.tar.txt` becomes `notes.kgi`.
    pub fn output_path(path: &Path) -> PathBuf {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name.split('.').next().unwrap_or_default();
        let name = format!("{stem}.{OUTPUT_EXTENSION}");
        match path.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }
}

impl fmt::Display for FileCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FileCodec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|codec| codec.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownCodec { name: s.to_string() })
    }
}

impl Codec for FileCodec {
    type Error = Error;

    fn encode(&self, path: &Path) -> Result<()> {
        Err(not_implemented(self.name(), Operation::Encode, path))
    }

    fn decode(&self, path: &Path) -> Result<()> {
        Err(not_implemented(self.name(), Operation::Decode, path))
    }
}
