//! Archive unpacker.
//!
//! `unpack_archive` copies entries into the destination and never deletes
//! anything: robot jars fetched by Robocode and user-edited preferences live
//! next to the managed files and must survive re-runs. Files shipped by an
//! older installer but dropped by a newer one are left behind as well.
//!
//! `mirror_archives` is the destructive variant, used only for directories
//! robokit owns outright (the robot development dir).

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

use crate::error::{ProvisionError, Result};
use crate::storage::PartFile;

/// Counts of what was written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackReport {
    pub files: usize,
    pub dirs: usize,
}

/// Extracts every entry of `archive` under `dest`, overwriting same-named files only.
pub fn unpack_archive(archive: &Path, dest: &Path) -> Result<UnpackReport> {
    let file = File::open(archive).map_err(|e| ProvisionError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|source| {
        ProvisionError::Extraction {
            path: archive.to_path_buf(),
            source,
        }
    })?;
    fs::create_dir_all(dest).map_err(|e| ProvisionError::io(dest, e))?;

    let mut report = UnpackReport::default();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|source| ProvisionError::Extraction {
            path: archive.to_path_buf(),
            source,
        })?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ProvisionError::UnsafeEntry {
                path: archive.to_path_buf(),
                entry: entry.name().to_string(),
            })?;
        let out = dest.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(|e| ProvisionError::io(&out, e))?;
            report.dirs += 1;
            continue;
        }

        let mut part = PartFile::create(&out)?;
        io::copy(&mut entry, &mut part).map_err(|e| ProvisionError::io(&out, e))?;
        part.finalize()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                // Keep the owner able to overwrite on the next run.
                let mode = (mode & 0o777) | 0o600;
                fs::set_permissions(&out, fs::Permissions::from_mode(mode))
                    .map_err(|e| ProvisionError::io(&out, e))?;
            }
        }
        report.files += 1;
    }

    tracing::info!(
        archive = %archive.display(),
        dest = %dest.display(),
        files = report.files,
        "unpacked archive"
    );
    Ok(report)
}

/// Replaces `dest` with exactly the contents of `archives`, later archives
/// overwriting earlier ones. No archives leaves `dest` absent.
pub fn mirror_archives<P: AsRef<Path>>(archives: &[P], dest: &Path) -> Result<UnpackReport> {
    clear_dir(dest)?;
    let mut total = UnpackReport::default();
    for archive in archives {
        let report = unpack_archive(archive.as_ref(), dest)?;
        total.files += report.files;
        total.dirs += report.dirs;
    }
    Ok(total)
}

fn clear_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => tracing::debug!(dir = %dir.display(), "cleared directory"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(ProvisionError::io(dir, e)),
    }
    Ok(())
}
