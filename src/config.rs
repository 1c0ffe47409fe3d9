use crate::domain::SemVer;
use crate::error::{ResolverError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "gitsemver.toml";

/// Upper bound for `versioning.max_collision_retries`
pub const MAX_COLLISION_RETRIES: u32 = 1000;

/// Represents the complete configuration for git-semver.
///
/// Contains versioning policy, conventional commit rules and publication settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub versioning: VersioningConfig,

    #[serde(default)]
    pub conventional_commits: ConventionalCommitsConfig,

    #[serde(default)]
    pub publish: PublishConfig,
}

fn default_main_branches() -> Vec<String> {
    vec!["main".to_string(), "master".to_string()]
}

fn default_base_version() -> String {
    "0.1.0".to_string()
}

fn default_max_collision_retries() -> u32 {
    10
}

fn default_main_prerelease_label() -> String {
    "alpha".to_string()
}

fn default_collision_prerelease_label() -> String {
    "release".to_string()
}

fn default_short_hash_len() -> usize {
    7
}

/// Versioning policy: baseline, branch roles and label grammar.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersioningConfig {
    #[serde(default = "default_main_branches")]
    pub main_branches: Vec<String>,

    /// Version used when no release tag is reachable
    #[serde(default = "default_base_version")]
    pub base_version: String,

    #[serde(default = "default_max_collision_retries")]
    pub max_collision_retries: u32,

    #[serde(default = "default_main_prerelease_label")]
    pub main_prerelease_label: String,

    #[serde(default = "default_collision_prerelease_label")]
    pub collision_prerelease_label: String,

    #[serde(default = "default_short_hash_len")]
    pub short_hash_len: usize,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        VersioningConfig {
            main_branches: default_main_branches(),
            base_version: default_base_version(),
            max_collision_retries: default_max_collision_retries(),
            main_prerelease_label: default_main_prerelease_label(),
            collision_prerelease_label: default_collision_prerelease_label(),
            short_hash_len: default_short_hash_len(),
        }
    }
}

impl VersioningConfig {
    /// Baseline version as a parsed release version
    pub fn base(&self) -> Result<SemVer> {
        SemVer::parse_tag(&self.base_version).ok_or_else(|| {
            ResolverError::config(format!(
                "base_version '{}' must be MAJOR.MINOR.PATCH",
                self.base_version
            ))
        })
    }
}

fn default_release_prefix() -> String {
    "release:".to_string()
}

fn default_breaking_change_indicators() -> Vec<String> {
    vec![
        "BREAKING CHANGE:".to_string(),
        "BREAKING-CHANGE:".to_string(),
    ]
}

fn default_feature_types() -> Vec<String> {
    vec!["feat".to_string()]
}

fn default_patch_types() -> Vec<String> {
    vec![
        "fix".to_string(),
        "docs".to_string(),
        "style".to_string(),
        "refactor".to_string(),
        "perf".to_string(),
        "test".to_string(),
        "chore".to_string(),
        "ci".to_string(),
        "build".to_string(),
    ]
}

/// Configuration for conventional commit analysis.
///
/// Defines which subject lines mark releases, breaking changes, features and fixes.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConventionalCommitsConfig {
    /// Subject prefix that finalizes a release
    #[serde(default = "default_release_prefix")]
    pub release_prefix: String,

    /// Whether a release commit also forces a major bump
    #[serde(default)]
    pub release_is_breaking: bool,

    /// Subject prefixes that force a major bump
    #[serde(default = "default_breaking_change_indicators")]
    pub breaking_change_indicators: Vec<String>,

    #[serde(default = "default_feature_types")]
    pub feature_types: Vec<String>,

    #[serde(default = "default_patch_types")]
    pub patch_types: Vec<String>,
}

impl Default for ConventionalCommitsConfig {
    fn default() -> Self {
        ConventionalCommitsConfig {
            release_prefix: default_release_prefix(),
            release_is_breaking: false,
            breaking_change_indicators: default_breaking_change_indicators(),
            feature_types: default_feature_types(),
            patch_types: default_patch_types(),
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_token_username() -> String {
    "x-access-token".to_string()
}

fn default_token_env() -> String {
    "GIT_TOKEN".to_string()
}

/// The single credential channel used when pushing tags.
///
/// Secrets are never stored here; only the names of the environment
/// variables that hold them.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum PushAuth {
    /// Whatever the transport offers by default (credential helpers, none)
    #[default]
    Default,
    SshAgent,
    SshKey {
        path: String,
        #[serde(default)]
        passphrase_env: Option<String>,
    },
    Token {
        #[serde(default = "default_token_username")]
        username: String,
        #[serde(default = "default_token_env")]
        token_env: String,
    },
}

impl PushAuth {
    pub fn name(&self) -> &'static str {
        match self {
            PushAuth::Default => "default",
            PushAuth::SshAgent => "ssh-agent",
            PushAuth::SshKey { .. } => "ssh-key",
            PushAuth::Token { .. } => "token",
        }
    }
}

/// Configuration for tag publication.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PublishConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub auth: PushAuth,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            remote: default_remote(),
            auth: PushAuth::default(),
        }
    }
}

impl Config {
    /// Check values that serde cannot validate on its own
    pub fn validate(&self) -> Result<()> {
        self.versioning.base()?;

        if self.versioning.short_hash_len < 4 || self.versioning.short_hash_len > 40 {
            return Err(ResolverError::config(format!(
                "short_hash_len must be between 4 and 40, got {}",
                self.versioning.short_hash_len
            )));
        }

        if self.versioning.max_collision_retries > MAX_COLLISION_RETRIES {
            return Err(ResolverError::config(format!(
                "max_collision_retries must be at most {}, got {}",
                MAX_COLLISION_RETRIES, self.versioning.max_collision_retries
            )));
        }

        for (field, label) in [
            ("main_prerelease_label", &self.versioning.main_prerelease_label),
            (
                "collision_prerelease_label",
                &self.versioning.collision_prerelease_label,
            ),
        ] {
            if !crate::domain::version::is_valid_label(label) {
                return Err(ResolverError::config(format!(
                    "{} '{}' may only contain [A-Za-z0-9.-]",
                    field, label
                )));
            }
        }

        if self.conventional_commits.release_prefix.is_empty() {
            return Err(ResolverError::config("release_prefix must not be empty"));
        }

        Ok(())
    }
}

/// Parse and validate configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitsemver.toml` in current directory
/// 3. `.gitsemver.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path).map_err(|e| {
            ResolverError::config(format!("Cannot read config file '{}': {}", path, e))
        })?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}
