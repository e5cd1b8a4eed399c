use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::errors::{CodeLinkError, Result};

/// Name of the configuration file stored inside the `.codelink` directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Name of the hidden directory used to store codelink metadata.
pub const CODELINK_DIR: &str = ".codelink";

/// Order in which other projects are searched when a name is not visible
/// through scopes or imports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Current project, then transitive references, then every project in
    /// repository order, but only when the repository declares no project
    /// references at all.
    #[default]
    ReferencesThenGlobal,
    /// Current project and transitive references only.
    ReferencesOnly,
    /// Current project, transitive references, then every project.
    AlwaysGlobal,
}

/// Configuration for a link run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Separator between namespace segments and type names.
    pub separator: String,
    /// Cross-project search order for names not found in scope.
    pub fallback: FallbackPolicy,
    /// Resolve independent projects concurrently.
    pub parallel: bool,
    /// Glob patterns for compilation units to link.
    pub include: Vec<String>,
    /// Glob patterns for compilation units to skip.
    pub exclude: Vec<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            version: 1,
            separator: ".".to_string(),
            fallback: FallbackPolicy::default(),
            parallel: true,
            include: vec!["**/*".to_string()],
            exclude: vec!["**/obj/**".to_string(), "**/bin/**".to_string()],
        }
    }
}

/// Returns the path to the `.codelink` directory within the given project root.
pub fn get_codelink_dir(project_root: &Path) -> PathBuf {
    project_root.join(CODELINK_DIR)
}

/// Returns the path to the configuration file within the `.codelink` directory.
pub fn get_config_path(project_root: &Path) -> PathBuf {
    get_codelink_dir(project_root).join(CONFIG_FILENAME)
}

/// Loads the configuration from disk.
///
/// If the configuration file does not exist, returns the default configuration.
pub fn load_config(project_root: &Path) -> Result<LinkConfig> {
    let config_path = get_config_path(project_root);

    if !config_path.exists() {
        return Ok(LinkConfig::default());
    }

    let contents = fs::read_to_string(&config_path).map_err(|e| CodeLinkError::Config {
        message: format!(
            "failed to read config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    let config: LinkConfig =
        serde_json::from_str(&contents).map_err(|e| CodeLinkError::Config {
            message: format!(
                "failed to parse config file '{}': {}",
                config_path.display(),
                e
            ),
        })?;

    if config.separator.is_empty() {
        return Err(CodeLinkError::Config {
            message: format!(
                "config file '{}' has an empty namespace separator",
                config_path.display()
            ),
        });
    }

    Ok(config)
}

/// Saves the configuration to disk using an atomic write.
///
/// Writes to a temporary file first and then renames it into place.
pub fn save_config(project_root: &Path, config: &LinkConfig) -> Result<()> {
    let codelink_dir = get_codelink_dir(project_root);
    fs::create_dir_all(&codelink_dir).map_err(|e| CodeLinkError::Config {
        message: format!(
            "failed to create codelink directory '{}': {}",
            codelink_dir.display(),
            e
        ),
    })?;

    let config_path = get_config_path(project_root);
    let tmp_path = config_path.with_extension("tmp");

    let json = serde_json::to_string_pretty(config).map_err(|e| CodeLinkError::Config {
        message: format!("failed to serialize config: {}", e),
    })?;

    fs::write(&tmp_path, &json).map_err(|e| CodeLinkError::Config {
        message: format!(
            "failed to write temporary config file '{}': {}",
            tmp_path.display(),
            e
        ),
    })?;

    fs::rename(&tmp_path, &config_path)?;

    Ok(())
}

/// Determines whether a compilation unit takes part in linking, based on the
/// configuration's include and exclude glob patterns.
///
/// Exclude patterns take precedence over include patterns.
pub fn should_include_unit(unit_path: &str, config: &LinkConfig) -> bool {
    let match_opts = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    let normalized = unit_path.replace('\\', "/");

    for pattern_str in &config.exclude {
        if let Ok(pattern) = Pattern::new(pattern_str) {
            if pattern.matches_with(&normalized, match_opts) {
                return false;
            }
        }
    }

    for pattern_str in &config.include {
        if let Ok(pattern) = Pattern::new(pattern_str) {
            if pattern.matches_with(&normalized, match_opts) {
                return true;
            }
        }
    }

    false
}
