use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub enrich: EnrichConfig,
}

/// Where the file-backed directories live. Relative paths are resolved
/// against the project root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub phone_numbers: Option<PathBuf>,
    #[serde(default)]
    pub emails: Option<PathBuf>,
}

impl SourcesConfig {
    /// Apply CLI overrides on top of the configured paths.
    #[must_use]
    pub fn with_overrides(self, phone_numbers: Option<PathBuf>, emails: Option<PathBuf>) -> Self {
        Self {
            phone_numbers: phone_numbers.or(self.phone_numbers),
            emails: emails.or(self.emails),
        }
    }

    #[must_use]
    pub fn resolve(&self, project_root: &Path) -> Self {
        let anchor = |path: &PathBuf| {
            if path.is_absolute() {
                path.clone()
            } else {
                project_root.join(path)
            }
        };
        Self {
            phone_numbers: self.phone_numbers.as_ref().map(anchor),
            emails: self.emails.as_ref().map(anchor),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichConfig {
    #[serde(default)]
    pub timing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// Load `.homescreen/config.toml`, or defaults when it does not exist.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".homescreen/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// # Errors
///
/// Fails when the user config exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("homescreen/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// # Errors
///
/// Propagates failures from either config file.
pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.clone(), env_format);

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

fn resolve_output(cli_json: bool, user_output: Option<String>, env_format: Option<String>) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = TempDir::new().expect("temp dir");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert_eq!(cfg.sources, SourcesConfig::default());
        assert!(!cfg.enrich.timing);
    }

    #[test]
    fn project_config_parses_sources() {
        let root = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(root.path().join(".homescreen")).expect("create config dir");
        std::fs::write(
            root.path().join(".homescreen/config.toml"),
            r#"
[sources]
phone_numbers = "directory/phones.json"
emails = "/srv/directory/emails.json"

[enrich]
timing = true
"#,
        )
        .expect("write config");

        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert!(cfg.enrich.timing);

        let resolved = cfg.sources.resolve(root.path());
        assert_eq!(
            resolved.phone_numbers,
            Some(root.path().join("directory/phones.json"))
        );
        assert_eq!(
            resolved.emails,
            Some(PathBuf::from("/srv/directory/emails.json"))
        );
    }

    #[test]
    fn malformed_project_config_is_reported() {
        let root = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(root.path().join(".homescreen")).expect("create config dir");
        std::fs::write(root.path().join(".homescreen/config.toml"), "[sources\n")
            .expect("write config");

        let err = load_project_config(root.path()).expect_err("parse should fail");
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn cli_overrides_replace_configured_paths() {
        let configured = SourcesConfig {
            phone_numbers: Some(PathBuf::from("a.json")),
            emails: Some(PathBuf::from("b.json")),
        };
        let merged = configured.with_overrides(Some(PathBuf::from("c.json")), None);
        assert_eq!(merged.phone_numbers, Some(PathBuf::from("c.json")));
        assert_eq!(merged.emails, Some(PathBuf::from("b.json")));
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        let output = resolve_output(true, Some("pretty".to_string()), Some("text".to_string()));
        assert_eq!(output, "json");
    }

    #[test]
    fn legacy_aliases_are_normalized() {
        let pretty = resolve_output(false, Some("table".to_string()), Some("human".to_string()));
        assert_eq!(pretty, "pretty");

        let text = resolve_output(false, Some("human".to_string()), Some("table".to_string()));
        assert_eq!(text, "text");
    }

    #[test]
    fn user_config_parses_output() {
        let cfg: UserConfig = toml::from_str("output = \"json\"\n").expect("parse");
        assert_eq!(cfg.output, Some("json".to_string()));
    }
}
