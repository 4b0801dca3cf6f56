use crate::{Error, Result};
use std::fs::Metadata;
use std::path::Path;

/// Cross-platform file permission modes.
///
/// Unix applies the mode bits directly. Windows only has a read-only flag,
/// so every mode maps onto that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PermissionMode {
    /// Leave whatever the platform chose when the file was created.
    #[default]
    Inherit,

    /// `0o444` on Unix, read-only attribute on Windows.
    ReadOnly,

    /// `0o644` on Unix.
    ReadWrite,

    /// `0o755` on Unix.
    Directory,

    /// Explicit Unix mode bits. On Windows only the write bits matter.
    Custom(CustomPermissions),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CustomPermissions {
    pub unix_mode: u32,
}

impl CustomPermissions {
    pub fn from_unix_mode(mode: u32) -> Self {
        Self { unix_mode: mode }
    }

    pub fn is_writable(self) -> bool {
        (self.unix_mode & 0o222) != 0
    }
}

impl PermissionMode {
    pub fn custom(unix_mode: u32) -> Self {
        Self::Custom(CustomPermissions::from_unix_mode(unix_mode))
    }

    /// Unix mode bits, or `None` for [`PermissionMode::Inherit`].
    pub fn to_unix_mode(self) -> Option<u32> {
        match self {
            Self::Inherit => None,
            Self::ReadOnly => Some(0o444),
            Self::Directory => Some(0o755),
            Self::ReadWrite => Some(0o644),
            Self::Custom(custom) => Some(custom.unix_mode),
        }
    }

    /// Apply the mode to an existing file or directory.
    pub fn apply_to_path(self, path: &Path) -> Result<()> {
        let Some(mode) = self.to_unix_mode() else {
            return Ok(());
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
                Error::Write {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }

        #[cfg(not(unix))]
        {
            let readonly = !CustomPermissions::from_unix_mode(mode).is_writable();
            let mut perms = std::fs::metadata(path)
                .map_err(|e| Error::Read {
                    path: path.to_path_buf(),
                    source: e,
                })?
                .permissions();
            perms.set_readonly(readonly);
            std::fs::set_permissions(path, perms).map_err(|e| Error::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        Ok(())
    }
}

/// Permission bits (`0o7777` mask) recorded for a filesystem object.
///
/// Non-Unix platforms synthesize `0o755` for directories and `0o644`/`0o444`
/// for files depending on the read-only flag.
pub fn unix_mode(metadata: &Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o7777
    }

    #[cfg(not(unix))]
    {
        if metadata.is_dir() {
            0o755
        } else if metadata.permissions().readonly() {
            0o444
        } else {
            0o644
        }
    }
}
