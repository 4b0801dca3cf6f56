use crate::permissions::PermissionMode;
use crate::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug)]
pub struct AtomicWriteOptions {
    pub permissions: Option<PermissionMode>,
    pub sync: bool,
}

impl Default for AtomicWriteOptions {
    fn default() -> Self {
        Self {
            permissions: Some(PermissionMode::ReadWrite),
            sync: true,
        }
    }
}

impl AtomicWriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permissions(mut self, mode: PermissionMode) -> Self {
        self.permissions = Some(mode);
        self
    }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// A file that only appears at its destination once [`AtomicFile::commit`] succeeds.
///
/// Content is written to a hidden temporary file in the destination's directory,
/// so the final rename never crosses a filesystem boundary. Dropping an
/// uncommitted `AtomicFile` deletes the temporary file and leaves the
/// destination untouched.
#[derive(Debug)]
pub struct AtomicFile {
    temp: tempfile::NamedTempFile,
    destination: PathBuf,
}

impl AtomicFile {
    pub fn create(destination: impl AsRef<Path>) -> Result<Self> {
        let destination = destination.as_ref().to_path_buf();
        let file_name = destination
            .file_name()
            .ok_or_else(|| Error::NoFileName {
                path: destination.clone(),
            })?
            .to_string_lossy()
            .into_owned();

        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let temp = tempfile::Builder::new()
            .prefix(&format!(".{file_name}."))
            .suffix(".tmp")
            .tempfile_in(&parent)
            .map_err(|e| Error::Write {
                path: destination.clone(),
                source: e,
            })?;

        Ok(Self { temp, destination })
    }

    /// Final location of the file.
    pub fn path(&self) -> &Path {
        &self.destination
    }

    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn as_file_mut(&mut self) -> &mut File {
        self.temp.as_file_mut()
    }

    /// Apply permissions, optionally fsync, then rename over the destination.
    pub fn commit(self, options: AtomicWriteOptions) -> Result<PathBuf> {
        if let Some(mode) = options.permissions {
            mode.apply_to_path(self.temp.path())?;
        }

        if options.sync {
            self.temp.as_file().sync_all().map_err(|e| Error::Write {
                path: self.temp.path().to_path_buf(),
                source: e,
            })?;
        }

        let temp_path = self.temp.path().to_path_buf();
        let destination = self.destination;
        self.temp.persist(&destination).map_err(|e| Error::Persist {
            temp: temp_path,
            path: destination.clone(),
            source: e.error,
        })?;

        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn commit_moves_content_into_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let mut file = AtomicFile::create(&path).unwrap();
        file.as_file_mut().write_all(b"hello world").unwrap();
        assert!(!path.exists());

        let committed = file.commit(AtomicWriteOptions::new()).unwrap();
        assert_eq!(committed, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"hello world");
    }

    #[test]
    fn drop_without_commit_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let temp_path = {
            let mut file = AtomicFile::create(&path).unwrap();
            file.as_file_mut().write_all(b"partial").unwrap();
            file.temp_path().to_path_buf()
        };

        assert!(!temp_path.exists());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn commit_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");
        std::fs::write(&path, "original").unwrap();

        let mut file = AtomicFile::create(&path).unwrap();
        file.as_file_mut().write_all(b"replacement").unwrap();
        file.commit(AtomicWriteOptions::new().sync(false)).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"replacement");
    }

    #[test]
    fn temp_file_lives_next_to_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        let file = AtomicFile::create(&path).unwrap();
        assert_eq!(file.temp_path().parent(), Some(dir.path()));
        assert_eq!(file.path(), path);
    }

    #[test]
    fn missing_parent_directory_is_a_write_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.bin");
        let result = AtomicFile::create(&path);
        assert!(matches!(result, Err(Error::Write { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn commit_applies_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("script.sh");
        let file = AtomicFile::create(&path).unwrap();
        file.commit(AtomicWriteOptions::new().permissions(PermissionMode::custom(0o755)))
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
