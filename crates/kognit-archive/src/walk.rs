//! Directory traversal feeding the archive writers.
//!
//! The walk is depth-first, visits every directory before its contents and
//! sorts siblings by file name, so an unmodified tree always produces the same
//! entry sequence. Symlinks are reported as [`EntryKind::Other`] and never
//! followed.

use std::io;
use std::path::{Component, Path, PathBuf};

use kognit_fs::unix_mode;
use walkdir::{DirEntry, WalkDir};

use crate::entry::{Entry, EntryKind};
use crate::error::{Error, Result};

/// Lazy iterator over the entries below a root directory.
pub struct Walk {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

/// Start walking `root`. The root itself is not yielded.
pub fn walk(root: impl AsRef<Path>) -> Result<Walk> {
    let root = root.as_ref();
    let metadata = std::fs::metadata(root).map_err(|e| Error::Input {
        path: root.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(Error::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let inner = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    Ok(Walk {
        root: root.to_path_buf(),
        inner,
    })
}

impl Walk {
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry(&self, dent: DirEntry) -> Result<Entry> {
        let metadata = dent.metadata().map_err(|e| walk_error(&self.root, e))?;
        let file_type = dent.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        let name = archive_name(&self.root, dent.path())?;
        let size = if kind == EntryKind::File {
            metadata.len()
        } else {
            0
        };

        let entry = Entry::new(
            dent.path().to_path_buf(),
            name,
            kind,
            unix_mode(&metadata),
            size,
        );
        Ok(match metadata.modified() {
            Ok(modified) => entry.with_modified(modified),
            Err(_) => entry,
        })
    }
}

impl Iterator for Walk {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        let dent = match self.inner.next()? {
            Ok(dent) => dent,
            Err(e) => return Some(Err(walk_error(&self.root, e))),
        };
        Some(self.entry(dent))
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
    Error::Input { path, source }
}

/// `path` relative to `root`, joined with `/` whatever the host separator is.
fn archive_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| Error::Input {
        path: path.to_path_buf(),
        source: io::Error::other("entry is outside the walked root"),
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| Error::NonUtf8Name {
                path: path.to_path_buf(),
            })?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}
