use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, Result};
use crate::storage;

/// One robot: a class plus the metadata Robocode shows in its selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotUnit {
    /// Display name; also names the unit's generated metadata dir.
    pub name: String,
    /// Fully qualified main class, e.g. `com.example.Alpha`.
    pub class_name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub include_source: bool,
}

impl RobotUnit {
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| ProvisionError::InvalidUnit {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        let plain_name = !self.name.trim().is_empty()
            && !self.name.contains(['/', '\\'])
            && self.name != "."
            && self.name != "..";
        if !plain_name {
            return Err(invalid("name must be a plain, non-empty file name"));
        }
        let valid_class = !self.class_name.is_empty()
            && self.class_name.split('.').all(|part| {
                !part.is_empty()
                    && part
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            });
        if !valid_class {
            return Err(invalid("class_name must be a dotted Java class name"));
        }
        if self.version.trim().is_empty() || self.version.contains(['/', '\\']) {
            return Err(invalid("version must be non-empty and contain no path separators"));
        }
        Ok(())
    }

    /// `<class_name>_<version>.jar`, the name Robocode expects for robot archives.
    pub fn archive_name(&self) -> String {
        format!("{}_{}.jar", self.class_name, self.version)
    }

    /// Path of the metadata file inside the archive: `com/example/Alpha.properties`.
    pub fn metadata_entry(&self) -> PathBuf {
        let mut path: PathBuf = self.class_name.split('.').collect();
        path.set_extension("properties");
        path
    }

    /// Ordered metadata keys and values.
    pub fn properties(&self, robocode_version: &str) -> Vec<(&'static str, String)> {
        let mut props = vec![
            ("robocode.version", robocode_version.to_string()),
            ("robot.name", self.name.clone()),
            ("robot.classname", self.class_name.clone()),
            ("robot.version", self.version.clone()),
        ];
        if let Some(description) = &self.description {
            props.push(("robot.description", description.clone()));
        }
        if let Some(author) = &self.author {
            props.push(("robot.author.name", author.clone()));
        }
        props.push(("robot.java.source.included", self.include_source.to_string()));
        props
    }
}

/// Escapes a value for a Java properties file.
///
/// Robocode loads these files as ISO-8859-1, so everything outside printable
/// ASCII becomes `\uXXXX` (a surrogate pair above the BMP).
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' ' if i == 0 => out.push_str("\\ "),
            c if c < ' ' || c > '~' => {
                for unit in c.encode_utf16(&mut [0u16; 2]) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            c => out.push(c),
        }
    }
    out
}

pub fn render_properties(props: &[(&str, String)]) -> String {
    props
        .iter()
        .map(|(k, v)| format!("{}={}\n", k, escape_value(v)))
        .collect()
}

/// Writes the unit's metadata under `<generated_dir>/<name>/` and returns that directory.
///
/// The directory is recreated, so a descriptor left by an earlier class name is gone.
pub fn write_unit_metadata(
    unit: &RobotUnit,
    generated_dir: &Path,
    robocode_version: &str,
) -> Result<PathBuf> {
    unit.validate()?;
    let unit_dir = generated_dir.join(&unit.name);
    match fs::remove_dir_all(&unit_dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(ProvisionError::io(&unit_dir, e)),
    }
    let file = unit_dir.join(unit.metadata_entry());
    let body = render_properties(&unit.properties(robocode_version));
    storage::write_atomic(&file, body.as_bytes())?;
    tracing::debug!(robot = %unit.name, path = %file.display(), "wrote robot metadata");
    Ok(unit_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha() -> RobotUnit {
        RobotUnit {
            name: "Alpha".to_string(),
            class_name: "com.example.Alpha".to_string(),
            version: "1.0".to_string(),
            description: None,
            author: None,
            include_source: false,
        }
    }

    #[test]
    fn archive_name_uses_class_and_version() {
        assert_eq!(alpha().archive_name(), "com.example.Alpha_1.0.jar");
    }

    #[test]
    fn metadata_entry_follows_package() {
        assert_eq!(
            alpha().metadata_entry(),
            PathBuf::from("com/example/Alpha.properties")
        );
    }

    #[test]
    fn optional_keys_only_when_present() {
        let props = alpha().properties("1.9");
        let keys: Vec<_> = props.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            [
                "robocode.version",
                "robot.name",
                "robot.classname",
                "robot.version",
                "robot.java.source.included"
            ]
        );

        let unit = RobotUnit {
            description: Some("rams walls".to_string()),
            author: Some("Sam".to_string()),
            ..alpha()
        };
        let text = render_properties(&unit.properties("1.9"));
        assert!(text.contains("robot.description=rams walls\n"));
        assert!(text.contains("robot.author.name=Sam\n"));
    }

    #[test]
    fn values_are_escaped() {
        assert_eq!(escape_value("a\nb\\c"), "a\\nb\\\\c");
        assert_eq!(escape_value(" lead"), "\\ lead");
    }

    #[test]
    fn non_ascii_values_use_unicode_escapes() {
        assert_eq!(escape_value("José"), "Jos\\u00E9");
        assert_eq!(escape_value("bot 🤖"), "bot \\uD83E\\uDD16");
        assert_eq!(escape_value("bell\u{7}"), "bell\\u0007");

        let unit = RobotUnit {
            author: Some("José".to_string()),
            ..alpha()
        };
        let text = render_properties(&unit.properties("1.9"));
        assert!(text.is_ascii());
        assert!(text.contains("robot.author.name=Jos\\u00E9\n"));
    }

    #[test]
    fn rejects_bad_units() {
        for unit in [
            RobotUnit { name: String::new(), ..alpha() },
            RobotUnit { name: "a/b".to_string(), ..alpha() },
            RobotUnit { class_name: "com..Alpha".to_string(), ..alpha() },
            RobotUnit { class_name: "com/example/Alpha".to_string(), ..alpha() },
            RobotUnit { version: String::new(), ..alpha() },
        ] {
            assert!(
                matches!(unit.validate(), Err(ProvisionError::InvalidUnit { .. })),
                "{unit:?}"
            );
        }
        assert!(alpha().validate().is_ok());
    }

    #[test]
    fn writes_metadata_under_unit_dir() {
        let dir = tempfile::tempdir().unwrap();
        let unit_dir = write_unit_metadata(&alpha(), dir.path(), "1.9").unwrap();
        assert_eq!(unit_dir, dir.path().join("Alpha"));

        let text =
            std::fs::read_to_string(unit_dir.join("com/example/Alpha.properties")).unwrap();
        assert_eq!(
            text,
            "robocode.version=1.9\nrobot.name=Alpha\nrobot.classname=com.example.Alpha\nrobot.version=1.0\nrobot.java.source.included=false\n"
        );
    }

    #[test]
    fn rewriting_drops_metadata_of_a_previous_class_name() {
        let dir = tempfile::tempdir().unwrap();
        write_unit_metadata(&alpha(), dir.path(), "1.9").unwrap();
        let renamed = RobotUnit {
            class_name: "com.example.renamed.Alpha".to_string(),
            ..alpha()
        };
        let unit_dir = write_unit_metadata(&renamed, dir.path(), "1.9").unwrap();

        assert!(!unit_dir.join("com/example/Alpha.properties").exists());
        assert!(unit_dir.join("com/example/renamed/Alpha.properties").is_file());
    }
}
