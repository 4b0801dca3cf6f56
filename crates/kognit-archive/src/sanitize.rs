use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::options::DecodeOptions;

/// Result of sanitizing an archive entry name.
#[derive(Clone, Debug)]
pub struct SanitizedPath {
    /// Entry name exactly as stored in the archive.
    pub original: String,
    /// Normalized path below the destination. Empty when the entry names the
    /// destination itself (`./`, or everything stripped by `strip_components`).
    pub relative: PathBuf,
    /// Destination joined with `relative`.
    pub resolved: PathBuf,
}

impl SanitizedPath {
    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }
}

/// Resolve an archive entry name against the extraction root.
///
/// The name is split on `/` (and `\` on Windows) and normalized lexically.
/// Absolute names, drive prefixes and `..` segments that climb above the
/// root are rejected with [`Error::ZipSlip`]; nothing on disk is consulted.
pub fn sanitize_path_with_options<B: AsRef<Path>>(
    name: &str,
    base: B,
    options: &DecodeOptions,
) -> Result<SanitizedPath> {
    if name.is_empty() || name.contains('\0') {
        return Err(Error::InvalidPath {
            entry: name.to_string(),
        });
    }

    let base = normalize_path(base.as_ref());
    let escape = || Error::ZipSlip {
        entry: name.to_string(),
        resolved: normalize_path(&base.join(name)),
    };

    if is_absolute_name(name) {
        return Err(Error::ZipSlip {
            entry: name.to_string(),
            resolved: PathBuf::from(name),
        });
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in name.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(escape());
                }
            }
            part => {
                // a segment must stay a single plain component (no `C:` prefixes)
                let mut components = Path::new(part).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => segments.push(part),
                    _ => return Err(escape()),
                }
            }
        }
    }

    let kept = segments.get(options.strip_components..).unwrap_or_default();
    let relative: PathBuf = kept.iter().collect();
    let resolved = base.join(&relative);

    // unreachable by construction; kept as the last line of defence
    if !resolved.starts_with(&base) {
        return Err(escape());
    }

    Ok(SanitizedPath {
        original: name.to_string(),
        relative,
        resolved,
    })
}

fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

fn is_absolute_name(name: &str) -> bool {
    let path = Path::new(name);
    name.starts_with('/')
        || path.has_root()
        || matches!(path.components().next(), Some(Component::Prefix(_)))
}

/// Resolve `.` and `..` lexically.
fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(part) => result.push(part),
            Component::RootDir => result.push(component.as_os_str()),
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::CurDir => {}
        }
    }

    result
}
