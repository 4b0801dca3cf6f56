use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::{Codec, Error, Operation, Result, not_implemented};

/// Image codecs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageCodec {
    Jpeg,
    Jpeg2000,
    Png,
    Gif,
}

impl ImageCodec {
    pub const ALL: [ImageCodec; 4] = [Self::Jpeg, Self::Jpeg2000, Self::Png, Self::Gif];

    pub fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Jpeg2000 => "JPEG2000",
            Self::Png => "PNG",
            Self::Gif => "GIF",
        }
    }
}

impl fmt::Display for ImageCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ImageCodec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|codec| codec.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownCodec { name: s.to_string() })
    }
}

impl Codec for ImageCodec {
    type Error = Error;

    fn encode(&self, path: &Path) -> Result<()> {
        Err(not_implemented(self.name(), Operation::Encode, path))
    }

    fn decode(&self, path: &Path) -> Result<()> {
        Err(not_implemented(self.name(), Operation::Decode, path))
    }
}
