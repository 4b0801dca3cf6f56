use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One filesystem object captured during a directory walk.
#[derive(Clone, Debug)]
pub struct Entry {
    /// Location on disk.
    pub source: PathBuf,
    /// Name inside the archive: relative to the walked root, `/`-separated.
    pub name: String,
    pub kind: EntryKind,
    pub mode: u32,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, sockets, FIFOs and device nodes.
    Other,
}

impl Entry {
    pub fn new(source: PathBuf, name: String, kind: EntryKind, mode: u32, size: u64) -> Self {
        Self {
            source,
            name,
            kind,
            mode,
            size,
            modified: None,
        }
    }

    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    pub fn is_executable(&self) -> bool {
        self.mode & 0o111 != 0
    }

    /// Seconds since the Unix epoch, clamped to zero for pre-epoch times.
    pub fn mtime_secs(&self) -> u64 {
        self.modified
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs())
    }
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Other => "other",
        }
    }
}
