//! Archive readers.
//!
//! Every [`EntrySource`] yields raw entries; [`extract`] resolves each name
//! against the destination, rejects anything that would land outside it and
//! writes the tree. Directory permissions are applied last, deepest first, so
//! a read-only directory never blocks its own contents.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use kognit_fs::PermissionMode;
use tracing::debug;

use crate::copy::{CopyError, copy_payload};
use crate::entry::EntryKind;
use crate::error::{Error, Result};
use crate::format::ArchiveFormat;
use crate::options::DecodeOptions;
use crate::report::{ArchiveReport, ExtractedEntry};
use crate::sanitize::{SanitizedPath, sanitize_path_with_options};

mod tar;
mod zip;

pub use self::tar::TarGzSource;
pub use self::zip::ZipSource;

/// One entry as read from the archive, before anything touches the disk.
pub struct PendingEntry<'a> {
    /// Raw entry name, untrusted.
    pub name: String,
    pub kind: EntryKind,
    /// Payload size declared by the archive.
    pub size: u64,
    pub mode: Option<u32>,
    pub data: &'a mut dyn Read,
}

/// An opened archive that can be walked once, in stored order.
pub trait EntrySource {
    fn format(&self) -> ArchiveFormat;

    /// Archive location, used in error messages.
    fn archive_path(&self) -> &Path;

    /// Feed every entry to `visitor`, stopping at the first error.
    fn visit(&mut self, visitor: &mut dyn FnMut(PendingEntry<'_>) -> Result<()>) -> Result<()>;
}

/// Materialize every entry of `source` below `destination`.
///
/// The destination is created if missing. On error, entries already written
/// stay on disk.
pub fn extract<S: EntrySource + ?Sized>(
    source: &mut S,
    destination: &Path,
    options: &DecodeOptions,
) -> Result<ArchiveReport> {
    create_dir_all(destination)?;

    let archive = source.archive_path().to_path_buf();
    let mut report = ArchiveReport::new(source.format());
    let mut directories: Vec<(PathBuf, PermissionMode)> = Vec::new();
    let mut bytes_processed = 0u64;

    source.visit(&mut |entry| {
        let sanitized = sanitize_path_with_options(&entry.name, destination, options)?;
        let size = match entry.kind {
            EntryKind::Directory => {
                if !sanitized.is_root() {
                    create_dir_all(&sanitized.resolved)?;
                    directories.push((
                        sanitized.resolved.clone(),
                        options.perm_strategy.resolve_directory(entry.mode),
                    ));
                }
                0
            }
            EntryKind::File => {
                let written = write_file(&archive, &sanitized, entry.data, options)?;
                if written != entry.size {
                    return Err(Error::Corrupted {
                        archive: archive.clone(),
                        reason: format!(
                            "entry '{}' holds {written} bytes but declares {}",
                            entry.name, entry.size
                        ),
                    });
                }
                options
                    .perm_strategy
                    .apply_to_path(&sanitized.resolved, entry.mode)?;
                written
            }
            EntryKind::Other => {
                return Err(Error::UnsupportedEntry {
                    entry: entry.name,
                    kind: EntryKind::Other.as_str().to_string(),
                });
            }
        };

        debug!(
            entry = %entry.name,
            target = %sanitized.resolved.display(),
            kind = entry.kind.as_str(),
            size,
            "extracted"
        );

        bytes_processed += size;
        options.report_progress(bytes_processed, &sanitized.resolved);

        report.push(ExtractedEntry {
            original_name: sanitized.original,
            target_path: sanitized.resolved,
            size,
            mode: entry.mode.map(|m| m & 0o7777),
            kind: entry.kind,
        });
        Ok(())
    })?;

    for (path, mode) in directories.iter().rev() {
        mode.apply_to_path(path)?;
    }

    Ok(report)
}

fn write_file(
    archive: &Path,
    sanitized: &SanitizedPath,
    data: &mut dyn Read,
    options: &DecodeOptions,
) -> Result<u64> {
    if sanitized.is_root() {
        return Err(if options.strip_components > 0 {
            Error::NoComponentsRemaining {
                original: sanitized.original.clone(),
                count: options.strip_components,
            }
        } else {
            Error::InvalidPath {
                entry: sanitized.original.clone(),
            }
        });
    }

    let target = &sanitized.resolved;
    if let Some(parent) = target.parent() {
        create_dir_all(parent)?;
    }

    let mut out = File::create(target).map_err(|e| Error::ExtractionFailed {
        path: target.clone(),
        source: e,
    })?;

    copy_payload(data, &mut out).map_err(|e| match e {
        CopyError::Read(e) => Error::stream(archive, e),
        CopyError::Write(e) => Error::ExtractionFailed {
            path: target.clone(),
            source: e,
        },
    })
}

fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;
    use tempfile::tempdir;

    /// In-memory source for driving `extract` without a real archive.
    struct VecSource(Vec<(&'static str, EntryKind, Option<u32>, &'static str)>);

    impl EntrySource for VecSource {
        fn format(&self) -> ArchiveFormat {
            ArchiveFormat::Zip
        }

        fn archive_path(&self) -> &Path {
            Path::new("memory.zip")
        }

        fn visit(
            &mut self,
            visitor: &mut dyn FnMut(PendingEntry<'_>) -> Result<()>,
        ) -> Result<()> {
            for (name, kind, mode, data) in &self.0 {
                let mut reader = Cursor::new(data.as_bytes());
                visitor(PendingEntry {
                    name: name.to_string(),
                    kind: *kind,
                    size: data.len() as u64,
                    mode: *mode,
                    data: &mut reader,
                })?;
            }
            Ok(())
        }
    }

    #[test]
    fn extracts_files_and_directories() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out");
        let mut source = VecSource(vec![
            ("docs/", EntryKind::Directory, None, ""),
            ("docs/readme.md", EntryKind::File, None, "# hi"),
            ("deep/nested/file", EntryKind::File, None, "x"),
        ]);

        let report = extract(&mut source, &dest, &DecodeOptions::default()).unwrap();

        assert_eq!(report.entry_count, 3);
        assert_eq!(report.total_bytes, 5);
        assert_eq!(fs::read(dest.join("docs/readme.md")).unwrap(), b"# hi");
        assert_eq!(fs::read(dest.join("deep/nested/file")).unwrap(), b"x");
        assert_eq!(report.entries[1].original_name, "docs/readme.md");
        assert_eq!(report.entries[1].target_path, dest.join("docs/readme.md"));
    }

    #[test]
    fn traversal_aborts_before_writing() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out");
        let mut source = VecSource(vec![
            ("ok.txt", EntryKind::File, None, "ok"),
            ("../escaped.txt", EntryKind::File, None, "pwned"),
            ("after.txt", EntryKind::File, None, "never"),
        ]);

        let err = extract(&mut source, &dest, &DecodeOptions::default()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Security);
        assert!(dest.join("ok.txt").exists());
        assert!(!dir.path().join("escaped.txt").exists());
        assert!(!dest.join("after.txt").exists());
    }

    #[test]
    fn existing_files_are_truncated() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "much longer original content").unwrap();
        let mut source = VecSource(vec![("a.txt", EntryKind::File, None, "new")]);

        extract(&mut source, dir.path(), &DecodeOptions::default()).unwrap();
        assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"new");
    }

    #[test]
    fn stripped_file_with_nothing_left_is_rejected() {
        let dir = tempdir().unwrap();
        let mut source = VecSource(vec![
            ("pkg/", EntryKind::Directory, None, ""),
            ("README", EntryKind::File, None, "top level"),
        ]);

        let options = DecodeOptions::default().strip_components(1);
        let err = extract(&mut source, dir.path(), &options).unwrap_err();
        assert!(matches!(err, Error::NoComponentsRemaining { count: 1, .. }));
    }

    #[test]
    fn progress_is_reported_per_entry() {
        use std::sync::{Arc, Mutex};

        let dir = tempdir().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let options = DecodeOptions::default()
            .expected_total_bytes(6)
            .on_progress(Arc::new(move |p| sink.lock().unwrap().push(p.bytes_processed)));

        let mut source = VecSource(vec![
            ("a", EntryKind::File, None, "abc"),
            ("b", EntryKind::File, None, "def"),
        ]);
        extract(&mut source, dir.path(), &options).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![3, 6]);
    }

    #[cfg(unix)]
    #[test]
    fn directory_modes_are_applied_after_contents() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let mut source = VecSource(vec![
            ("locked/", EntryKind::Directory, Some(0o555), ""),
            ("locked/inner.txt", EntryKind::File, Some(0o644), "data"),
        ]);

        let options =
            DecodeOptions::default().permission_strategy(crate::PermissionStrategy::Preserve);
        extract(&mut source, dir.path(), &options).unwrap();

        let mode = fs::metadata(dir.path().join("locked"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
        assert_eq!(fs::read(dir.path().join("locked/inner.txt")).unwrap(), b"data");
    }
}
