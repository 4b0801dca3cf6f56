use kognit_fs::PermissionMode;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Result;
use crate::error::Error;

/// Default deflate level, matching `flate2::Compression::default()`.
pub const DEFAULT_LEVEL: u32 = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Deflate level `0..=9`. `None` uses [`DEFAULT_LEVEL`].
    pub level: Option<u32>,
}

impl EncodeOptions {
    pub fn level(mut self, level: u32) -> Self {
        self.level = Some(level.min(9));
        self
    }

    pub fn effective_level(&self) -> u32 {
        self.level.unwrap_or(DEFAULT_LEVEL).min(9)
    }
}

#[derive(Clone, Default)]
pub struct DecodeOptions {
    pub perm_strategy: PermissionStrategy,
    pub strip_components: usize,
    pub expected_total_bytes: Option<u64>,
    pub on_progress: Option<Arc<dyn Fn(Progress) + Send + Sync>>,
}

#[derive(Clone, Debug)]
pub struct Progress {
    pub bytes_processed: u64,
    pub total_bytes: Option<u64>,
    pub percentage: Option<f32>,
    pub current_file: Option<PathBuf>,
}

impl DecodeOptions {
    pub fn permission_strategy(mut self, strategy: PermissionStrategy) -> Self {
        self.perm_strategy = strategy;
        self
    }

    pub fn strip_components(mut self, n: usize) -> Self {
        self.strip_components = n;
        self
    }

    pub fn expected_total_bytes(mut self, bytes: u64) -> Self {
        self.expected_total_bytes = Some(bytes);
        self
    }

    pub fn on_progress(mut self, callback: Arc<dyn Fn(Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub(crate) fn report_progress(&self, bytes_processed: u64, current_file: &Path) {
        let Some(callback) = &self.on_progress else {
            return;
        };
        let mut progress = Progress {
            bytes_processed,
            total_bytes: self.expected_total_bytes,
            percentage: None,
            current_file: Some(current_file.to_path_buf()),
        };
        progress.percentage = progress.percentage();
        callback(progress);
    }
}

impl std::fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("perm_strategy", &self.perm_strategy)
            .field("strip_components", &self.strip_components)
            .field("expected_total_bytes", &self.expected_total_bytes)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl Progress {
    pub fn percentage(&self) -> Option<f32> {
        self.total_bytes.map(|total| {
            if total == 0 {
                0.0
            } else {
                (self.bytes_processed as f32 / total as f32) * 100.0
            }
        })
    }
}

/// How extracted files get their permission bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PermissionStrategy {
    /// Keep the stored mode, adding owner read/write so the file stays editable.
    #[default]
    Standard,
    ReadOnly,
    /// Apply the stored mode verbatim; leave the platform default when none is stored.
    Preserve,
    /// Ignore the archive and use `0o644`.
    Owned,
}

impl PermissionStrategy {
    /// Mode to apply to an extracted file whose archive entry recorded `mode`.
    pub fn resolve(self, mode: Option<u32>) -> PermissionMode {
        let mode = mode.map(|m| m & 0o7777);
        match self {
            Self::Standard => mode.map_or(PermissionMode::ReadWrite, |m| {
                PermissionMode::custom(m | 0o600)
            }),
            Self::ReadOnly => PermissionMode::ReadOnly,
            Self::Preserve => mode.map_or(PermissionMode::Inherit, PermissionMode::custom),
            Self::Owned => PermissionMode::ReadWrite,
        }
    }

    /// Resolve a directory mode. Directories always stay traversable and
    /// writable by the owner, or later entries could not be created in them.
    pub fn resolve_directory(self, mode: Option<u32>) -> PermissionMode {
        let mode = mode.map(|m| m & 0o7777);
        match self {
            Self::Standard | Self::Preserve => match mode {
                Some(m) => PermissionMode::custom(m | 0o700),
                None => PermissionMode::Inherit,
            },
            Self::ReadOnly | Self::Owned => PermissionMode::Directory,
        }
    }

    pub fn apply_to_path(&self, path: &Path, mode: Option<u32>) -> Result<()> {
        self.resolve(mode).apply_to_path(path).map_err(Error::from)
    }
}
