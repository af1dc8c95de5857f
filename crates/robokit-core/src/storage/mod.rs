//! Scoped file writes with atomic finalize.
//!
//! Every file robokit produces (setup jar, properties, robot archives) is
//! written to `<name>.part` first and renamed into place only after a
//! successful flush and sync. A `PartFile` dropped without `finalize` removes
//! its temp file, so an interrupted write never looks like a valid output.

mod part;

pub use part::PartFile;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, Result};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `file.jar` → `file.jar.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Where a write to `path` should land: the link target if `path` is a symlink.
fn write_target(path: &Path) -> Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {}
        _ => return Ok(path.to_path_buf()),
    }
    match fs::canonicalize(path) {
        Ok(target) => Ok(target),
        // Dangling link: create the file it names.
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let link = fs::read_link(path).map_err(|e| ProvisionError::io(path, e))?;
            Ok(match path.parent() {
                Some(parent) => parent.join(link),
                None => link,
            })
        }
        Err(e) => Err(ProvisionError::io(path, e)),
    }
}

/// Writes `contents` to `path` through a `PartFile`.
///
/// A symlinked `path` stays a symlink and its target is replaced. An existing
/// file keeps its permissions.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let target = write_target(path)?;
    let permissions = fs::metadata(&target).ok().map(|m| m.permissions());

    let mut part = PartFile::create(&target)?;
    part.write_all(contents)
        .map_err(|e| ProvisionError::io(part.temp_path(), e))?;
    if let Some(permissions) = permissions {
        fs::set_permissions(part.temp_path(), permissions)
            .map_err(|e| ProvisionError::io(part.temp_path(), e))?;
    }
    part.finalize()?;
    Ok(())
}
