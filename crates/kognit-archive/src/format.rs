use std::fmt;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

/// Container/compression pairing of an archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// ZIP container, each entry deflated on its own.
    Zip,
    /// tar stream compressed as a whole with gzip.
    TarGzip,
}

impl ArchiveFormat {
    pub const ALL: [ArchiveFormat; 2] = [Self::Zip, Self::TarGzip];

    /// Canonical file name suffix, including the leading dot.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::TarGzip => ".tar.gz",
        }
    }

    /// Archive path produced when encoding `root`: the root path plus [`suffix`](Self::suffix).
    pub fn archive_path(self, root: &Path) -> PathBuf {
        let mut name = root.as_os_str().to_owned();
        name.push(self.suffix());
        PathBuf::from(name)
    }

    /// Guess the format from a file name suffix.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGzip)
        } else {
            None
        }
    }

    /// Strip this format's suffix from an archive path.
    ///
    /// Returns `None` when the file name doesn't carry the suffix or nothing
    /// would be left of it.
    pub fn strip_suffix(self, archive: &Path) -> Option<PathBuf> {
        let name = archive.file_name()?.to_str()?;
        let stem = name.strip_suffix(self.suffix())?;
        if stem.is_empty() {
            return None;
        }
        Some(archive.with_file_name(stem))
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zip => f.write_str("zip"),
            Self::TarGzip => f.write_str("tar.gz"),
        }
    }
}

pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    match data {
        // local file header, or the end-of-central-directory record of an empty archive
        [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Some(ArchiveFormat::Zip),
        [0x1F, 0x8B, ..] => Some(ArchiveFormat::TarGzip),
        _ => None,
    }
}

/// Sniff the format from the first bytes of `reader` and rewind it.
pub fn detect_from_reader<R: Read + Seek>(reader: &mut R) -> io::Result<Option<ArchiveFormat>> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    reader.rewind()?;
    Ok(detect_format(&header[..filled]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn suffixes() {
        assert_eq!(ArchiveFormat::Zip.suffix(), ".zip");
        assert_eq!(ArchiveFormat::TarGzip.suffix(), ".tar.gz");
    }

    #[test]
    fn archive_path_appends_suffix() {
        assert_eq!(
            ArchiveFormat::Zip.archive_path(Path::new("/data/photos")),
            PathBuf::from("/data/photos.zip")
        );
        assert_eq!(
            ArchiveFormat::TarGzip.archive_path(Path::new("project.v2")),
            PathBuf::from("project.v2.tar.gz")
        );
    }

    #[test]
    fn from_path_by_suffix() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("a/b.ZIP")),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("b.tar.gz")),
            Some(ArchiveFormat::TarGzip)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("b.tgz")),
            Some(ArchiveFormat::TarGzip)
        );
        assert_eq!(ArchiveFormat::from_path(Path::new("b.tar")), None);
    }

    #[test]
    fn strip_suffix_inverts_archive_path() {
        for format in ArchiveFormat::ALL {
            let root = Path::new("/srv/site");
            let archive = format.archive_path(root);
            assert_eq!(format.strip_suffix(&archive), Some(root.to_path_buf()));
        }
        assert_eq!(ArchiveFormat::Zip.strip_suffix(Path::new("x.tar.gz")), None);
        assert_eq!(ArchiveFormat::Zip.strip_suffix(Path::new(".zip")), None);
    }

    #[test]
    fn detect_zip_format() {
        let zip_header = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00, 0x00, 0x00];
        assert_eq!(detect_format(&zip_header), Some(ArchiveFormat::Zip));
    }

    #[test]
    fn detect_empty_zip_format() {
        let eocd = [0x50, 0x4B, 0x05, 0x06, 0x00, 0x00];
        assert_eq!(detect_format(&eocd), Some(ArchiveFormat::Zip));
    }

    #[test]
    fn detect_tar_gz_format() {
        let gz_header = [0x1F, 0x8B, 0x08, 0x00];
        assert_eq!(detect_format(&gz_header), Some(ArchiveFormat::TarGzip));
    }

    #[test]
    fn detect_unknown_format() {
        let random_data = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(detect_format(&random_data), None);
        assert_eq!(detect_format(&[]), None);
    }

    #[test]
    fn detect_from_reader_rewinds() {
        let data = vec![0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(data);
        let format = detect_from_reader(&mut cursor).unwrap();
        assert_eq!(format, Some(ArchiveFormat::TarGzip));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn detect_from_short_reader() {
        let mut cursor = Cursor::new(vec![0x50]);
        assert_eq!(detect_from_reader(&mut cursor).unwrap(), None);
    }
}
