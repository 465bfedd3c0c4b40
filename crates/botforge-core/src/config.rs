use crate::error::{CoreError, Result};
use crate::io;
use crate::paths;
use crate::validate::{Finding, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// GeneratorConfig
// ---------------------------------------------------------------------------

pub const CONFIG_VERSION: u32 = 1;

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_project_file() -> String {
    paths::DEFAULT_PROJECT_FILE.to_string()
}

fn default_output_dir() -> String {
    "generated".to_string()
}

/// Workspace settings, stored as `botforge.yaml` at the workspace root.
/// Unknown keys are carried through load and save so configs written by
/// newer tools survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Project model file, relative to the workspace root.
    #[serde(default = "default_project_file")]
    pub project_file: String,

    /// Directory generated fragments are written to, relative to the
    /// workspace root.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Extra component definitions file; the built-in catalog is used
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<String>,

    /// Treat overlapping subsystem requirements between parallel siblings
    /// as an error instead of a warning.
    #[serde(default)]
    pub strict_parallel_requirements: bool,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            project_file: default_project_file(),
            output_dir: default_output_dir(),
            catalog_file: None,
            strict_parallel_requirements: false,
            extra: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(CoreError::NotInitialized(root.display().to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let config: GeneratorConfig = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    /// Like `load`, but an uninitialized workspace yields the defaults.
    /// Generation and validation work against a bare project file; only
    /// commands that write config require `init` first.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Ok(config) => Ok(config),
            Err(CoreError::NotInitialized(_)) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&paths::config_path(root), data.as_bytes())
    }

    /// Sanity checks on the settings themselves. Model-level validation
    /// lives in `validate::validate`.
    pub fn validate(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut push = |severity: Severity, message: String| {
            findings.push(Finding {
                severity,
                location: paths::CONFIG_FILE.to_string(),
                message,
            });
        };

        // 1. Version must be one this tool can read.
        if self.version > CONFIG_VERSION {
            push(
                Severity::Warning,
                format!(
                    "config version {} is newer than this tool understands ({CONFIG_VERSION})",
                    self.version
                ),
            );
        }

        // 2. File settings must not be blank.
        if self.project_file.trim().is_empty() {
            push(Severity::Error, "project_file must not be empty".to_string());
        } else if !self.project_file.ends_with(".json") {
            push(
                Severity::Warning,
                format!("project_file '{}' is not a .json file", self.project_file),
            );
        }
        if self.output_dir.trim().is_empty() {
            push(Severity::Error, "output_dir must not be empty".to_string());
        } else if Path::new(&self.output_dir).is_absolute() {
            push(
                Severity::Warning,
                format!("output_dir '{}' is not workspace-relative", self.output_dir),
            );
        }
        if let Some(catalog) = &self.catalog_file {
            if !catalog.ends_with(".json") {
                push(
                    Severity::Warning,
                    format!("catalog_file '{catalog}' is not a .json file"),
                );
            }
        }

        // 3. Unknown keys are kept but called out.
        for key in self.extra.keys() {
            push(Severity::Warning, format!("unknown setting '{key}'"));
        }

        findings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.project_file, "robot.botforge.json");
        assert_eq!(config.output_dir, "generated");
        assert!(config.catalog_file.is_none());
        assert!(!config.strict_parallel_requirements);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig {
            output_dir: "src/main/java/frc/generated".to_string(),
            catalog_file: Some("components.json".to_string()),
            strict_parallel_requirements: true,
            ..GeneratorConfig::default()
        };
        config.save(dir.path()).unwrap();
        let loaded = GeneratorConfig::load(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_uninitialized_workspace() {
        let dir = TempDir::new().unwrap();
        let err = GeneratorConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::NotInitialized(_)));
        let config = GeneratorConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: GeneratorConfig = serde_yaml::from_str("output_dir: out\n").unwrap();
        assert_eq!(config.output_dir, "out");
        assert_eq!(config.project_file, "robot.botforge.json");
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn unknown_keys_survive_roundtrip_but_warn() {
        let yaml = "version: 1\nteam_number: 254\n";
        let config: GeneratorConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.extra.contains_key("team_number"));

        let findings = config.validate();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert!(findings[0].message.contains("team_number"));

        let out = serde_yaml::to_string(&config).unwrap();
        assert!(out.contains("team_number"));
    }

    #[test]
    fn blank_settings_are_errors() {
        let config = GeneratorConfig {
            project_file: String::new(),
            output_dir: "  ".to_string(),
            ..GeneratorConfig::default()
        };
        let findings = config.validate();
        let errors: Vec<_> = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn newer_version_warns() {
        let config = GeneratorConfig {
            version: 9,
            ..GeneratorConfig::default()
        };
        let findings = config.validate();
        assert!(findings
            .iter()
            .any(|f| f.message.contains("newer than this tool")));
    }
}
