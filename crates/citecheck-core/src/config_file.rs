use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Precedence;
use crate::database::DatabaseConfig;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub databases: Option<DatabasesConfig>,
    pub matching: Option<MatchingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabasesConfig {
    pub verified: Option<Vec<String>>,
    pub suspicious: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub case_sensitive: Option<bool>,
    pub precedence: Option<Precedence>,
}

/// Platform config directory path: `<config_dir>/citecheck/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citecheck").join("config.toml"))
}

/// Load config by cascading CWD `.citecheck.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".citecheck.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        databases: Some(DatabasesConfig {
            verified: overlay
                .databases
                .as_ref()
                .and_then(|d| d.verified.clone())
                .or_else(|| base.databases.as_ref().and_then(|d| d.verified.clone())),
            suspicious: overlay
                .databases
                .as_ref()
                .and_then(|d| d.suspicious.clone())
                .or_else(|| base.databases.as_ref().and_then(|d| d.suspicious.clone())),
        }),
        matching: Some(MatchingConfig {
            case_sensitive: overlay
                .matching
                .as_ref()
                .and_then(|m| m.case_sensitive)
                .or_else(|| base.matching.as_ref().and_then(|m| m.case_sensitive)),
            precedence: overlay
                .matching
                .as_ref()
                .and_then(|m| m.precedence)
                .or_else(|| base.matching.as_ref().and_then(|m| m.precedence)),
        }),
    }
}

impl ConfigFile {
    /// Layer these settings over `base`. Relative document paths resolve
    /// against `root`.
    pub fn apply(&self, root: &Path, mut base: DatabaseConfig) -> DatabaseConfig {
        let resolve = |paths: &[String]| -> Vec<PathBuf> {
            paths
                .iter()
                .map(|p| {
                    let p = PathBuf::from(p);
                    if p.is_absolute() { p } else { root.join(p) }
                })
                .collect()
        };

        if let Some(databases) = &self.databases {
            if let Some(verified) = &databases.verified {
                base.verified = resolve(verified);
            }
            if let Some(suspicious) = &databases.suspicious {
                base.suspicious = resolve(suspicious);
            }
        }
        if let Some(matching) = &self.matching {
            if let Some(case_sensitive) = matching.case_sensitive {
                base.policy.case_sensitive = case_sensitive;
            }
            if let Some(precedence) = matching.precedence {
                base.policy.precedence = precedence;
            }
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let toml_str = r#"
[databases]
verified = ["docs/refs.md", "/abs/extra.md"]
suspicious = ["docs/fakes.md"]

[matching]
case_sensitive = true
precedence = "suspicious"
"#;
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let matching = parsed.matching.unwrap();
        assert_eq!(matching.case_sensitive, Some(true));
        assert_eq!(matching.precedence, Some(Precedence::SuspiciousWins));
        assert_eq!(parsed.databases.unwrap().verified.unwrap().len(), 2);
    }

    #[test]
    fn unknown_precedence_is_rejected() {
        let toml_str = "[matching]\nprecedence = \"strict\"\n";
        assert!(toml::from_str::<ConfigFile>(toml_str).is_err());
    }

    #[test]
    fn unparseable_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[matching\ncase_sensitive = ").unwrap();
        assert!(load_from_path(&path).is_none());
        assert!(load_from_path(&dir.path().join("missing.toml")).is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            matching: Some(MatchingConfig {
                case_sensitive: Some(true),
                precedence: Some(Precedence::SuspiciousWins),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            matching: Some(MatchingConfig {
                precedence: Some(Precedence::VerifiedWins),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).matching.unwrap();
        assert_eq!(merged.precedence, Some(Precedence::VerifiedWins));
        assert_eq!(merged.case_sensitive, Some(true));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            databases: Some(DatabasesConfig {
                verified: Some(vec!["refs.md".to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(
            merged.databases.unwrap().verified.unwrap(),
            vec!["refs.md".to_string()]
        );
    }

    #[test]
    fn apply_resolves_relative_paths_against_root() {
        let config = ConfigFile {
            databases: Some(DatabasesConfig {
                verified: Some(vec!["docs/refs.md".to_string(), "/abs/extra.md".to_string()]),
                suspicious: None,
            }),
            matching: Some(MatchingConfig {
                case_sensitive: Some(true),
                precedence: None,
            }),
        };
        let root = Path::new("/repo");
        let applied = config.apply(root, DatabaseConfig::for_root(root));
        assert_eq!(
            applied.verified,
            vec![
                PathBuf::from("/repo/docs/refs.md"),
                PathBuf::from("/abs/extra.md"),
            ]
        );
        // Untouched categories keep the fallback locations
        assert_eq!(
            applied.suspicious,
            DatabaseConfig::for_root(root).suspicious
        );
        assert!(applied.policy.case_sensitive);
        assert_eq!(applied.policy.precedence, Precedence::VerifiedWins);
    }
}
