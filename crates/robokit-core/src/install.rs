//! Provisioning pipeline: resolve a version, download the setup jar, unpack
//! it into the Robocode directory, then register the robot development dir.
//!
//! Steps run strictly in order and the first error aborts the rest. All
//! parameters come from an explicit `RobokitConfig` and `ProjectLayout`.

use std::path::{Path, PathBuf};

use crate::config::{ProjectLayout, RobokitConfig};
use crate::downloader::{self, DownloadReport, DownloadTarget};
use crate::error::{ProvisionError, Result};
use crate::package::{self, ExclusionRules, PackageReport, PackagingManifest};
use crate::properties::{self, Directive, ReconcileOutcome};
use crate::resolver::{FeedVersionSource, VersionPattern, VersionSource};
use crate::unpack::{self, UnpackReport};
use crate::version::Version;

/// A Robocode installation directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDir {
    root: PathBuf,
}

impl InstallDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        InstallDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn libs_dir(&self) -> PathBuf {
        self.root.join("libs")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    pub fn properties_file(&self) -> PathBuf {
        self.config_dir().join("robocode.properties")
    }

    /// `libs/<artifact>.jar`, present once the installer has been unpacked.
    pub fn runtime_jar(&self, artifact: &str) -> PathBuf {
        self.libs_dir().join(format!("{artifact}.jar"))
    }

    /// Where the setup jar for `target` is kept.
    pub fn setup_jar(&self, target: &DownloadTarget) -> PathBuf {
        self.root.join(target.file_name())
    }

    /// Warns about missing `libs/` or `config/`; returns the missing names.
    pub fn check_layout(&self) -> Vec<&'static str> {
        let missing: Vec<&'static str> = [("libs", self.libs_dir()), ("config", self.config_dir())]
            .into_iter()
            .filter(|(_, dir)| !dir.is_dir())
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            tracing::warn!(
                root = %self.root.display(),
                ?missing,
                "installation is missing expected directories"
            );
        }
        missing
    }
}

/// Feed-backed source for the configured channel and artifact.
pub fn feed_source(cfg: &RobokitConfig) -> Result<FeedVersionSource> {
    Ok(FeedVersionSource {
        feed_url: cfg.feed.url.clone(),
        channel: cfg.feed.channel.clone(),
        pattern: VersionPattern::for_artifact(&cfg.feed.artifact)?,
        http: cfg.http.options(),
    })
}

/// `explicit`, else the configured pin, else the latest release from the feed.
pub fn version_source(
    cfg: &RobokitConfig,
    explicit: Option<&Version>,
) -> Result<Box<dyn VersionSource>> {
    match explicit.or(cfg.download_version.as_ref()) {
        Some(v) => Ok(Box::new(v.clone())),
        None => Ok(Box::new(feed_source(cfg)?)),
    }
}

/// Download target for `version` from the configured template.
pub fn download_target(cfg: &RobokitConfig, version: Version) -> Result<DownloadTarget> {
    DownloadTarget::new(
        &cfg.feed.download_url_template,
        &cfg.feed.artifact,
        version,
    )
}

#[derive(Debug, Clone, Default)]
pub struct ProvisionOptions {
    pub version: Option<Version>,
    /// Download and unpack even when the installation looks current.
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub version: Version,
    pub install_dir: PathBuf,
    pub setup_jar: PathBuf,
    /// `None` when the existing installation was kept.
    pub download: Option<DownloadReport>,
    pub unpack: Option<UnpackReport>,
    pub reconcile: ReconcileOutcome,
}

#[derive(Debug, Clone)]
pub enum ProvisionOutcome {
    /// Downloading is disabled; the existing installation is used as is.
    Skipped { install_dir: PathBuf },
    Provisioned(ProvisionReport),
}

pub fn provision(
    cfg: &RobokitConfig,
    layout: &ProjectLayout,
    opts: &ProvisionOptions,
) -> Result<ProvisionOutcome> {
    if !cfg.download {
        tracing::info!(
            install_dir = %layout.robocode_dir.display(),
            "download disabled, using existing installation"
        );
        return Ok(ProvisionOutcome::Skipped {
            install_dir: layout.robocode_dir.clone(),
        });
    }

    let version = version_source(cfg, opts.version.as_ref())?.resolve()?;
    let target = download_target(cfg, version.clone())?;
    let install = InstallDir::new(&layout.robocode_dir);
    let setup_jar = install.setup_jar(&target);

    let current = setup_jar.is_file() && install.runtime_jar(&cfg.feed.artifact).is_file();
    let (download, unpack) = if current && !opts.force {
        tracing::info!(%version, setup_jar = %setup_jar.display(), "installation up to date");
        (None, None)
    } else {
        let report = downloader::download_artifact(&target, &setup_jar, &cfg.http.options())?;
        let unpacked = unpack::unpack_archive(&setup_jar, install.root())?;
        (Some(report), Some(unpacked))
    };
    install.check_layout();

    let directive = Directive::development_path(&layout.robot_bin_dir());
    let reconcile = properties::reconcile_file(&install.properties_file(), &directive)?;

    tracing::info!(%version, install_dir = %install.root().display(), "provisioning complete");
    Ok(ProvisionOutcome::Provisioned(ProvisionReport {
        version,
        install_dir: install.root().to_path_buf(),
        setup_jar,
        download,
        unpack,
        reconcile,
    }))
}

/// Packaging inputs with paths resolved against the project root.
pub fn packaging_manifest(cfg: &RobokitConfig, layout: &ProjectLayout) -> Result<PackagingManifest> {
    let resolve_all =
        |dirs: &[PathBuf]| dirs.iter().map(|d| layout.resolve(d)).collect::<Vec<_>>();
    Ok(PackagingManifest {
        class_roots: resolve_all(&cfg.packaging.class_dirs),
        source_roots: resolve_all(&cfg.packaging.source_dirs),
        dependency_jars: resolve_all(&cfg.packaging.dependency_jars),
        rules: ExclusionRules::from_config(
            cfg.packaging.exclude.as_deref(),
            &cfg.packaging.extra_exclude,
        )?,
    })
}

/// Packages the configured robots, or only those named in `only`.
pub fn package_robots(
    cfg: &RobokitConfig,
    layout: &ProjectLayout,
    only: &[String],
) -> Result<Vec<PackageReport>> {
    let units: Vec<_> = if only.is_empty() {
        cfg.robots.clone()
    } else {
        only.iter()
            .map(|name| {
                cfg.robots
                    .iter()
                    .find(|r| &r.name == name)
                    .cloned()
                    .ok_or_else(|| ProvisionError::NotFound(format!("no robot named {name:?}")))
            })
            .collect::<Result<Vec<_>>>()?
    };
    if units.is_empty() {
        tracing::warn!("no robots configured, nothing to package");
    }
    let manifest = packaging_manifest(cfg, layout)?;
    package::package_units(
        &manifest,
        &units,
        &layout.generated_dir(),
        &layout.package_dir(),
        &cfg.packaging.robocode_version,
    )
}

/// Packages every robot and replaces the development dir with their contents.
///
/// The dir is emptied even when no robot is configured.
pub fn deploy_robots(cfg: &RobokitConfig, layout: &ProjectLayout) -> Result<Vec<PackageReport>> {
    let reports = package_robots(cfg, layout, &[])?;
    let bin = layout.robot_bin_dir();
    let archives: Vec<&Path> = reports.iter().map(|r| r.path.as_path()).collect();
    unpack::mirror_archives(&archives, &bin)?;
    tracing::info!(robots = reports.len(), dir = %bin.display(), "deployed robots");
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::RobotUnit;
    use std::fs;

    fn offline_config() -> RobokitConfig {
        let mut cfg = RobokitConfig::default();
        cfg.feed.url = "http://127.0.0.1:1/unused".to_string();
        cfg
    }

    #[test]
    fn install_dir_paths() {
        let install = InstallDir::new("/opt/robocode");
        assert_eq!(install.libs_dir(), PathBuf::from("/opt/robocode/libs"));
        assert_eq!(
            install.properties_file(),
            PathBuf::from("/opt/robocode/config/robocode.properties")
        );
        assert_eq!(
            install.runtime_jar("robocode"),
            PathBuf::from("/opt/robocode/libs/robocode.jar")
        );
    }

    #[test]
    fn check_layout_reports_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let install = InstallDir::new(dir.path());
        assert_eq!(install.check_layout(), ["libs", "config"]);
        fs::create_dir_all(install.libs_dir()).unwrap();
        fs::create_dir_all(install.config_dir()).unwrap();
        assert!(install.check_layout().is_empty());
    }

    #[test]
    fn explicit_version_wins_over_pin_and_feed() {
        let mut cfg = offline_config();
        cfg.download_version = Some(Version::parse("1.9.4.2").unwrap());
        let explicit = Version::parse("1.9.5.0").unwrap();

        let v = version_source(&cfg, Some(&explicit)).unwrap().resolve().unwrap();
        assert_eq!(v, explicit);
        let v = version_source(&cfg, None).unwrap().resolve().unwrap();
        assert_eq!(v.as_str(), "1.9.4.2");
    }

    #[test]
    fn disabled_download_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = RobokitConfig {
            download: false,
            install_dir: Some(dir.path().join("robocode")),
            ..offline_config()
        };
        let layout = ProjectLayout::new(&cfg, dir.path());

        let outcome = provision(&cfg, &layout, &ProvisionOptions::default()).unwrap();
        assert!(matches!(outcome, ProvisionOutcome::Skipped { .. }));
        assert!(!dir.path().join("robocode").exists());
    }

    #[test]
    fn current_installation_only_reconciles() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = RobokitConfig {
            download_version: Some(Version::parse("1.9.5.0").unwrap()),
            ..offline_config()
        };
        let layout = ProjectLayout::new(&cfg, dir.path());
        let install = InstallDir::new(&layout.robocode_dir);
        fs::create_dir_all(install.libs_dir()).unwrap();
        fs::write(install.root().join("robocode-1.9.5.0-setup.jar"), b"jar").unwrap();
        fs::write(install.runtime_jar("robocode"), b"runtime").unwrap();

        let outcome = provision(&cfg, &layout, &ProvisionOptions::default()).unwrap();
        let ProvisionOutcome::Provisioned(report) = outcome else {
            panic!("expected provisioned outcome");
        };
        assert!(report.download.is_none());
        assert_eq!(report.reconcile, ReconcileOutcome::Inserted);
        let props = fs::read_to_string(install.properties_file()).unwrap();
        assert!(props.contains(&layout.robot_bin_dir().to_string_lossy().into_owned()));
    }

    #[test]
    fn unknown_robot_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = offline_config();
        let layout = ProjectLayout::new(&cfg, dir.path());
        let err = package_robots(&cfg, &layout, &["Ghost".to_string()]).unwrap_err();
        assert!(matches!(err, ProvisionError::NotFound(_)));
    }

    #[test]
    fn deploy_without_robots_empties_the_development_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = offline_config();
        let layout = ProjectLayout::new(&cfg, dir.path());
        let stale = layout.robot_bin_dir().join("com/example/Old.class");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, b"old").unwrap();

        let reports = deploy_robots(&cfg, &layout).unwrap();
        assert!(reports.is_empty());
        assert!(!stale.exists());
    }

    #[test]
    fn deploy_replaces_previous_robots() {
        let dir = tempfile::tempdir().unwrap();
        let classes = dir.path().join("build/classes/java/main/com/example");
        fs::create_dir_all(&classes).unwrap();
        fs::write(classes.join("Alpha.class"), b"alpha").unwrap();
        let cfg = RobokitConfig {
            robots: vec![RobotUnit {
                name: "Alpha".to_string(),
                class_name: "com.example.Alpha".to_string(),
                version: "1.0".to_string(),
                description: None,
                author: None,
                include_source: false,
            }],
            ..offline_config()
        };
        let layout = ProjectLayout::new(&cfg, dir.path());
        let bin = layout.robot_bin_dir();
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("Stale.class"), b"old").unwrap();

        let reports = deploy_robots(&cfg, &layout).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(!bin.join("Stale.class").exists());
        assert_eq!(fs::read(bin.join("com/example/Alpha.class")).unwrap(), b"alpha");
        assert!(bin.join("com/example/Alpha.properties").is_file());
    }
}
