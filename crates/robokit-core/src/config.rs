use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::downloader::DEFAULT_URL_TEMPLATE;
use crate::feed::{DEFAULT_CHANNEL, DEFAULT_FEED_URL};
use crate::http::HttpOptions;
use crate::package::RobotUnit;
use crate::version::Version;

/// Project-local config file name, looked up in the project directory.
pub const PROJECT_CONFIG_FILE: &str = "robokit.toml";

/// Where releases are discovered and fetched from (`[feed]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// RSS feed listing recent releases.
    pub url: String,
    /// Channel title selected inside the feed (exact match).
    pub channel: String,
    /// Artifact name used in item titles and the setup jar name.
    pub artifact: String,
    /// Download link with `{artifact}` and `{version}` placeholders.
    pub download_url_template: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
            artifact: "robocode".to_string(),
            download_url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

/// Optional `[http]` section. No timeout unless set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl HttpConfig {
    pub fn options(&self) -> HttpOptions {
        HttpOptions {
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Inputs for robot archives (`[packaging]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagingConfig {
    /// Compiled output roots (classes and processed resources). Missing dirs are skipped.
    pub class_dirs: Vec<PathBuf>,
    /// Source roots embedded when a robot sets `include_source`.
    pub source_dirs: Vec<PathBuf>,
    /// Jars whose contents are merged into every robot archive.
    pub dependency_jars: Vec<PathBuf>,
    /// Replaces the default exclusion globs when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    /// Added on top of the default (or replaced) exclusion globs.
    pub extra_exclude: Vec<String>,
    /// Value written as `robocode.version` in robot metadata.
    pub robocode_version: String,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            class_dirs: vec![
                PathBuf::from("build/classes/java/main"),
                PathBuf::from("build/classes/kotlin/main"),
                PathBuf::from("build/resources/main"),
            ],
            source_dirs: vec![
                PathBuf::from("src/main/java"),
                PathBuf::from("src/main/kotlin"),
            ],
            dependency_jars: Vec::new(),
            exclude: None,
            extra_exclude: Vec::new(),
            robocode_version: "1.9".to_string(),
        }
    }
}

/// Project configuration. Built once and passed by reference to every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobokitConfig {
    /// Download Robocode into `download_dir` (true) or use an existing `install_dir` (false).
    pub download: bool,
    /// Pin a version instead of resolving the latest from the feed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_version: Option<Version>,
    /// Kept outside `build_dir` so a clean does not wipe downloaded robots.
    pub download_dir: PathBuf,
    /// Existing installation; defaults to `C:\robocode` on Windows and `~/robocode` elsewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,
    pub build_dir: PathBuf,
    pub feed: FeedConfig,
    pub http: HttpConfig,
    pub packaging: PackagingConfig,
    pub robots: Vec<RobotUnit>,
}

impl Default for RobokitConfig {
    fn default() -> Self {
        Self {
            download: true,
            download_version: None,
            download_dir: PathBuf::from(".robocode"),
            install_dir: None,
            build_dir: PathBuf::from("build"),
            feed: FeedConfig::default(),
            http: HttpConfig::default(),
            packaging: PackagingConfig::default(),
            robots: Vec::new(),
        }
    }
}

/// Default location of a manual Robocode installation.
pub fn default_install_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:\\robocode")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("robocode")
    }
}

/// Absolute paths derived from a config and the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    /// Download dir or install dir, depending on `download`.
    pub robocode_dir: PathBuf,
    pub build_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(cfg: &RobokitConfig, root: &Path) -> Self {
        let resolve = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { root.join(p) };
        let robocode_dir = if cfg.download {
            resolve(&cfg.download_dir)
        } else {
            resolve(&cfg.install_dir.clone().unwrap_or_else(default_install_dir))
        };
        Self {
            root: root.to_path_buf(),
            robocode_dir,
            build_dir: resolve(&cfg.build_dir),
        }
    }

    /// Resolves a config-relative path against the project root.
    pub fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    /// Generated robot metadata, one subdirectory per robot.
    pub fn generated_dir(&self) -> PathBuf {
        self.build_dir.join("robocode").join("generated")
    }

    /// Unpacked robot classes; added to Robocode's development path.
    pub fn robot_bin_dir(&self) -> PathBuf {
        self.build_dir.join("robocode").join("robots").join("bin")
    }

    /// Packaged robot archives.
    pub fn package_dir(&self) -> PathBuf {
        self.build_dir.join("robocode").join("libs")
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("robokit")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the XDG config dir, creating a default file if none exists.
pub fn load_or_init() -> Result<RobokitConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RobokitConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<RobokitConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: RobokitConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

/// Explicit path, else `robokit.toml` in the project dir, else the XDG config.
pub fn discover(explicit: Option<&Path>, project_dir: &Path) -> Result<RobokitConfig> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }
    let local = project_dir.join(PROJECT_CONFIG_FILE);
    if local.is_file() {
        tracing::debug!("using project config {}", local.display());
        return load_from_path(&local);
    }
    load_or_init()
}
