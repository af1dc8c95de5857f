//! Glob rules that keep runtime and build-tool files out of robot archives.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{ProvisionError, Result};

/// Entries never shipped inside a robot archive.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    // Robocode runtime namespaces, already on the engine classpath.
    "net/sf/robocode/**",
    "robocode/**",
    "gl4java/**",
    "META-INF/services/**",
    "META-INF/maven/**",
    "META-INF/*.kotlin_module",
    "**/module-info.class",
    // Signatures of repackaged jars no longer match.
    "META-INF/*.SF",
    "META-INF/*.DSA",
    "META-INF/*.RSA",
];

/// Compiled set of exclusion globs matched against `/`-separated archive paths.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    patterns: Vec<String>,
    set: GlobSet,
}

impl ExclusionRules {
    /// `*` stays within one path segment; `**` spans segments. A leading `/` is ignored.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim_start_matches('/');
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| ProvisionError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
            builder.add(glob);
            kept.push(pattern.to_string());
        }
        let set = builder.build().map_err(|e| ProvisionError::InvalidPattern {
            pattern: kept.join(", "),
            reason: e.to_string(),
        })?;
        Ok(ExclusionRules { patterns: kept, set })
    }

    pub fn defaults() -> Result<Self> {
        Self::new(DEFAULT_EXCLUDES)
    }

    /// `base` (or the defaults when `None`) followed by `extra`.
    pub fn from_config(base: Option<&[String]>, extra: &[String]) -> Result<Self> {
        let base: Vec<&str> = match base {
            Some(patterns) => patterns.iter().map(String::as_str).collect(),
            None => DEFAULT_EXCLUDES.to_vec(),
        };
        Self::new(base.into_iter().chain(extra.iter().map(String::as_str)))
    }

    pub fn is_excluded(&self, entry: &str) -> bool {
        self.set.is_match(entry.trim_start_matches('/'))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_drop_runtime_and_build_metadata() {
        let rules = ExclusionRules::defaults().unwrap();
        for excluded in [
            "net/sf/robocode/core/Engine.class",
            "robocode/Robot.class",
            "robocode/robotinterfaces/IBasicRobot.class",
            "gl4java/GLContext.class",
            "META-INF/services/robocode.control.RobotSetup",
            "META-INF/maven/com.example/bots/pom.xml",
            "META-INF/bots.kotlin_module",
            "module-info.class",
            "com/example/module-info.class",
            "META-INF/SIGNER.SF",
            "META-INF/SIGNER.RSA",
        ] {
            assert!(rules.is_excluded(excluded), "{excluded} should be excluded");
        }
    }

    #[test]
    fn defaults_keep_robot_files() {
        let rules = ExclusionRules::defaults().unwrap();
        for kept in [
            "com/example/Alpha.class",
            "com/example/Alpha$1.class",
            "com/example/Alpha.properties",
            "com/example/robocode/Helper.class",
            "kotlin/Unit.class",
            "META-INF/MANIFEST.MF",
            "META-INF/sub/x.SF",
        ] {
            assert!(!rules.is_excluded(kept), "{kept} should be kept");
        }
    }

    #[test]
    fn leading_slash_is_ignored() {
        let rules = ExclusionRules::new(["/docs/**"]).unwrap();
        assert!(rules.is_excluded("docs/readme.txt"));
        assert!(rules.is_excluded("/docs/readme.txt"));
        assert_eq!(rules.patterns(), ["docs/**"]);
    }

    #[test]
    fn single_star_stays_in_segment() {
        let rules = ExclusionRules::new(["META-INF/*.txt"]).unwrap();
        assert!(rules.is_excluded("META-INF/a.txt"));
        assert!(!rules.is_excluded("META-INF/nested/a.txt"));
    }

    #[test]
    fn config_can_replace_or_extend() {
        let extra = vec!["**/*.txt".to_string()];
        let extended = ExclusionRules::from_config(None, &extra).unwrap();
        assert!(extended.is_excluded("robocode/Robot.class"));
        assert!(extended.is_excluded("com/example/notes.txt"));

        let base = vec!["tmp/**".to_string()];
        let replaced = ExclusionRules::from_config(Some(&base), &[]).unwrap();
        assert!(!replaced.is_excluded("robocode/Robot.class"));
        assert!(replaced.is_excluded("tmp/x"));
    }

    #[test]
    fn invalid_glob_is_reported() {
        let err = ExclusionRules::new(["a/[b"]).unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidPattern { ref pattern, .. } if pattern == "a/[b"));
    }
}
