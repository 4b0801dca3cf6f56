//! Directory archiving to ZIP and tar.gz, with extraction that refuses to
//! write outside its destination.
//!
//! # Architecture
//!
//! - `walk.rs` - Deterministic directory traversal producing [`Entry`] values
//! - `pack/` - Archive writers ([`ZipSink`], [`TarGzSink`]) behind [`EntrySink`]
//! - `extract/` - Archive readers ([`ZipSource`], [`TarGzSource`]) behind [`EntrySource`]
//! - `sanitize.rs` - Entry name resolution (zip-slip prevention)
//! - `archiver.rs` - [`Archiver`] facade, the only place a format is chosen
//! - `format.rs` - Format tag, suffixes and magic-byte detection
//!
//! ```no_run
//! use kognit_archive::{ArchiveFormat, decode, encode};
//!
//! let report = encode("photos", ArchiveFormat::TarGzip)?;
//! decode(&report.archive_path, "restored", ArchiveFormat::TarGzip)?;
//! # Ok::<(), kognit_archive::Error>(())
//! ```

pub use archiver::{Archiver, decode, decode_detect, detect_archive, encode};
pub use entry::{Entry, EntryKind};
pub use error::{Error, ErrorKind, Result};
pub use extract::{EntrySource, PendingEntry, TarGzSource, ZipSource, extract};
pub use format::{ArchiveFormat, detect_format, detect_from_reader};
pub use options::{DecodeOptions, EncodeOptions, PermissionStrategy, Progress};
pub use pack::{EntrySink, PackSummary, TarGzSink, ZipSink, pack};
pub use report::{ArchiveReport, EncodeReport, ExtractedEntry};
pub use sanitize::{SanitizedPath, sanitize_path_with_options};
pub use walk::{Walk, walk};

mod archiver;
mod copy;
pub mod entry;
mod error;
pub mod extract;
mod format;
pub mod options;
pub mod pack;
pub mod report;
mod sanitize;
pub mod walk;
