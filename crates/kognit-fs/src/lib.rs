//! Filesystem primitives shared by the kognit crates.
//!
//! - `primitives/` - atomic file creation (temp file + rename)
//! - `permissions.rs` - portable permission modes

mod error;
pub mod permissions;
pub mod primitives;

pub use error::{Error, Result};
pub use permissions::{CustomPermissions, PermissionMode, unix_mode};
pub use primitives::{AtomicFile, AtomicWriteOptions};
