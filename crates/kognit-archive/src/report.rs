use std::path::PathBuf;

use crate::entry::EntryKind;
use crate::format::ArchiveFormat;

/// Outcome of a successful decode.
#[derive(Clone, Debug)]
pub struct ArchiveReport {
    pub format: ArchiveFormat,
    pub entry_count: usize,
    pub total_bytes: u64,
    pub entries: Vec<ExtractedEntry>,
}

#[derive(Clone, Debug)]
pub struct ExtractedEntry {
    /// Name as stored in the archive.
    pub original_name: String,
    pub target_path: PathBuf,
    pub size: u64,
    /// Mode bits recorded in the archive, if any.
    pub mode: Option<u32>,
    pub kind: EntryKind,
}

impl ExtractedEntry {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

impl ArchiveReport {
    pub(crate) fn new(format: ArchiveFormat) -> Self {
        Self {
            format,
            entry_count: 0,
            total_bytes: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, entry: ExtractedEntry) {
        self.entry_count += 1;
        self.total_bytes += entry.size;
        self.entries.push(entry);
    }

    pub fn files(&self) -> impl Iterator<Item = &ExtractedEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::File)
    }
}

/// Outcome of a successful encode.
#[derive(Clone, Debug)]
pub struct EncodeReport {
    pub archive_path: PathBuf,
    pub format: ArchiveFormat,
    /// Files and directories written to the archive.
    pub entry_count: usize,
    /// Symlinks and special files left out.
    pub skipped: usize,
    /// Uncompressed payload bytes.
    pub total_bytes: u64,
}
