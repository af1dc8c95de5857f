//! Robot packaging.
//!
//! Each robot becomes `<class_name>_<version>.jar`: every file under the
//! class roots (and source roots when the robot asks for them), that robot's
//! own metadata and the contents of every dependency jar, minus anything
//! matching the exclusion rules.
//! Entries are sorted and stamped with a fixed time, so the same inputs
//! always produce byte-identical archives.

mod exclude;
mod metadata;

pub use exclude::{ExclusionRules, DEFAULT_EXCLUDES};
pub use metadata::{render_properties, write_unit_metadata, RobotUnit};

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ProvisionError, Result};
use crate::storage::PartFile;

/// Shared inputs for every robot in a project.
#[derive(Debug, Clone)]
pub struct PackagingManifest {
    pub class_roots: Vec<PathBuf>,
    pub source_roots: Vec<PathBuf>,
    /// Runtime libraries merged after every root, e.g. the Kotlin stdlib.
    pub dependency_jars: Vec<PathBuf>,
    pub rules: ExclusionRules,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub robot: String,
    pub path: PathBuf,
    pub entries: usize,
    pub excluded: usize,
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644)
}

/// `/`-separated path of `path` relative to `root`.
fn entry_name(root: &Path, path: &Path) -> Option<String> {
    relative_name(path.strip_prefix(root).ok()?)
}

fn relative_name(relative: &Path) -> Option<String> {
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Builds one robot archive in `out_dir`. Inputs are only read.
pub fn package_unit(
    manifest: &PackagingManifest,
    unit: &RobotUnit,
    metadata_dir: Option<&Path>,
    out_dir: &Path,
) -> Result<PackageReport> {
    unit.validate()?;
    let dest = out_dir.join(unit.archive_name());

    let mut roots: Vec<&Path> = manifest.class_roots.iter().map(PathBuf::as_path).collect();
    if unit.include_source {
        roots.extend(manifest.source_roots.iter().map(PathBuf::as_path));
    }
    roots.extend(metadata_dir);

    let archive_err = |source: zip::result::ZipError| ProvisionError::Archive {
        path: dest.clone(),
        source,
    };
    let mut zip = ZipWriter::new(PartFile::create(&dest)?);
    let options = entry_options();
    let mut seen = HashSet::new();
    let mut report = PackageReport {
        robot: unit.name.clone(),
        path: dest.clone(),
        entries: 0,
        excluded: 0,
    };

    for root in roots {
        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "skipping missing packaging root");
            continue;
        }
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                ProvisionError::io(path, io::Error::from(e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry_name(root, entry.path()) else {
                continue;
            };
            if manifest.rules.is_excluded(&name) {
                report.excluded += 1;
                continue;
            }
            if !seen.insert(name.clone()) {
                tracing::debug!(entry = %name, root = %root.display(), "duplicate entry, keeping first");
                continue;
            }

            zip.start_file(name.as_str(), options).map_err(archive_err)?;
            let mut input =
                File::open(entry.path()).map_err(|e| ProvisionError::io(entry.path(), e))?;
            io::copy(&mut input, &mut zip).map_err(|e| ProvisionError::io(&dest, e))?;
            report.entries += 1;
        }
    }

    for jar in &manifest.dependency_jars {
        let file = File::open(jar).map_err(|e| ProvisionError::io(jar, e))?;
        let extraction_err = |source| ProvisionError::Extraction {
            path: jar.clone(),
            source,
        };
        let mut input = zip::ZipArchive::new(file).map_err(extraction_err)?;
        for i in 0..input.len() {
            let mut entry = input.by_index(i).map_err(extraction_err)?;
            if entry.is_dir() {
                continue;
            }
            let Some(relative) = entry.enclosed_name() else {
                return Err(ProvisionError::UnsafeEntry {
                    path: jar.clone(),
                    entry: entry.name().to_string(),
                });
            };
            let Some(name) = relative_name(&relative) else {
                continue;
            };
            if manifest.rules.is_excluded(&name) {
                report.excluded += 1;
                continue;
            }
            if !seen.insert(name.clone()) {
                tracing::debug!(entry = %name, jar = %jar.display(), "duplicate entry, keeping first");
                continue;
            }

            zip.start_file(name.as_str(), options).map_err(archive_err)?;
            io::copy(&mut entry, &mut zip).map_err(|e| ProvisionError::io(jar, e))?;
            report.entries += 1;
        }
    }

    let part = zip.finish().map_err(archive_err)?;
    part.finalize()?;

    tracing::info!(
        robot = %unit.name,
        path = %dest.display(),
        entries = report.entries,
        excluded = report.excluded,
        "packaged robot"
    );
    Ok(report)
}

/// Metadata plus archive for every unit, in order. Each archive only sees its own metadata.
pub fn package_units(
    manifest: &PackagingManifest,
    units: &[RobotUnit],
    generated_dir: &Path,
    out_dir: &Path,
    robocode_version: &str,
) -> Result<Vec<PackageReport>> {
    let mut names = HashSet::new();
    for unit in units {
        unit.validate()?;
        if !names.insert(unit.name.as_str()) {
            return Err(ProvisionError::InvalidUnit {
                name: unit.name.clone(),
                reason: "declared more than once".to_string(),
            });
        }
    }

    units
        .iter()
        .map(|unit| {
            let metadata_dir = write_unit_metadata(unit, generated_dir, robocode_version)?;
            package_unit(manifest, unit, Some(&metadata_dir), out_dir)
        })
        .collect()
}
