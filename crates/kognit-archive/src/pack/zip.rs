use std::io::{self, Read, Seek, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, Timelike};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::EntrySink;
use crate::copy::{CopyError, copy_payload};
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::options::EncodeOptions;

/// Entries at or above this size need ZIP64 headers.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Writes a ZIP archive, deflating every file separately.
pub struct ZipSink<W: Write + Seek> {
    writer: ZipWriter<W>,
    path: PathBuf,
    level: u32,
}

impl<W: Write + Seek> ZipSink<W> {
    /// `path` is only used to name the archive in errors.
    pub fn new(inner: W, path: impl Into<PathBuf>, options: &EncodeOptions) -> Self {
        Self {
            writer: ZipWriter::new(inner),
            path: path.into(),
            level: options.effective_level(),
        }
    }

    fn directory_options(&self, entry: &Entry) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .unix_permissions(entry.mode & 0o7777)
            .last_modified_time(dos_time(entry.modified).unwrap_or_default())
    }

    fn file_options(&self, entry: &Entry, size: u64) -> SimpleFileOptions {
        let options = if self.level == 0 {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(self.level)))
        };

        options
            .unix_permissions(entry.mode & 0o7777)
            .last_modified_time(dos_time(entry.modified).unwrap_or_default())
            .large_file(size >= ZIP64_THRESHOLD)
    }

    fn write_error(&self, err: impl Into<io::Error>) -> Error {
        Error::ArchiveWrite {
            path: self.path.clone(),
            source: err.into(),
        }
    }
}

impl<W: Write + Seek> EntrySink for ZipSink<W> {
    type Output = W;

    fn append_directory(&mut self, entry: &Entry) -> Result<()> {
        let options = self.directory_options(entry);
        self.writer
            .add_directory(entry.name.as_str(), options)
            .map_err(|e: ZipError| self.write_error(e))
    }

    fn append_file(&mut self, entry: &Entry, data: &mut dyn Read, size: u64) -> Result<()> {
        let options = self.file_options(entry, size);
        self.writer
            .start_file(entry.name.as_str(), options)
            .map_err(|e: ZipError| self.write_error(e))?;

        copy_payload(data, &mut self.writer).map_err(|e| match e {
            CopyError::Read(e) | CopyError::Write(e) => self.write_error(e),
        })?;
        Ok(())
    }

    fn finish(self) -> Result<W> {
        let path = self.path;
        self.writer.finish().map_err(|e| Error::ArchiveWrite {
            path,
            source: e.into(),
        })
    }
}

/// Local wall-clock time in the DOS date range (1980..=2107), or `None`
/// when `time` falls outside it.
fn dos_time(time: Option<SystemTime>) -> Option<zip::DateTime> {
    let local: DateTime<Local> = time?.into();
    let year = u16::try_from(local.year()).ok()?;
    zip::DateTime::from_date_and_time(
        year,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second().min(59) as u8,
    )
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;
    use zip::ZipArchive;

    fn entry(name: &str, mode: u32, size: u64) -> Entry {
        Entry::new(PathBuf::new(), name.to_string(), crate::EntryKind::File, mode, size)
    }

    #[test]
    fn writes_directories_and_files() {
        let mut sink = ZipSink::new(Cursor::new(Vec::new()), "t.zip", &EncodeOptions::default());
        sink.append_directory(&Entry::new(
            PathBuf::new(),
            "dir".into(),
            crate::EntryKind::Directory,
            0o755,
            0,
        ))
        .unwrap();
        sink.append_file(&entry("dir/a.txt", 0o640, 5), &mut Cursor::new(b"hello"), 5)
            .unwrap();
        let cursor = sink.finish().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), 2);

        let dir = archive.by_index(0).unwrap();
        assert_eq!(dir.name(), "dir/");
        assert!(dir.is_dir());
        drop(dir);

        let mut file = archive.by_index(1).unwrap();
        assert_eq!(file.name(), "dir/a.txt");
        assert_eq!(file.size(), 5);
        assert_eq!(file.unix_mode().map(|m| m & 0o777), Some(0o640));
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn level_zero_stores() {
        let mut sink = ZipSink::new(
            Cursor::new(Vec::new()),
            "t.zip",
            &EncodeOptions::default().level(0),
        );
        sink.append_file(&entry("a", 0o644, 3), &mut Cursor::new(b"abc"), 3)
            .unwrap();
        let cursor = sink.finish().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        let file = archive.by_index(0).unwrap();
        assert_eq!(file.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn dos_time_range() {
        assert!(dos_time(None).is_none());
        assert!(dos_time(Some(SystemTime::UNIX_EPOCH)).is_none());

        let recent = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let dt = dos_time(Some(recent)).unwrap();
        assert_eq!(dt.year(), 2023);
    }
}
