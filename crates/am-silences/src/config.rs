//! Configuration loading and resolution.
//!
//! Settings come from three places, in decreasing precedence:
//!
//! 1. [`FlagValues`]: command-line flags (and their `AMTOOL_*` environment variables)
//! 2. [`ConfigFile`]: the TOML config file
//! 3. [`Defaults`]: built-in values
//!
//! [`EffectiveConfig::resolve`] merges them once per invocation. The result is passed
//! explicitly to every step of the workflow.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Result, SilenceError};
use crate::expiry::DEFAULT_EXPIRES;

/// Config file name looked up in `/etc` and the home directory.
pub const CONFIG_FILE_NAME: &str = ".amtool.toml";

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/.amtool.toml";

/// The `[alertmanager]` table of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertmanagerSection {
    /// Base URL of the Alertmanager to talk to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Values read from the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Default author for new silences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Default silence duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    /// Default comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Reject silences without a comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_required: Option<bool>,
    /// Verbose running information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    /// Default output format name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Alertmanager connection settings.
    pub alertmanager: AlertmanagerSection,
}

impl ConfigFile {
    /// Parse a config file from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `SilenceError::ConfigValidation` if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SilenceError::config(format!("invalid TOML: {e}")))
    }

    /// Load a config file from disk.
    ///
    /// # Errors
    ///
    /// Returns `SilenceError::ConfigValidation` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SilenceError::config(format!(
                "failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Locate and load the config file.
    ///
    /// An explicit path must exist. Without one, the first existing file among
    /// [`default_locations`] is used; if none exists an empty config is returned.
    ///
    /// # Errors
    ///
    /// Returns `SilenceError::ConfigValidation` if the chosen file cannot be read or parsed.
    pub fn discover(explicit: Option<&Path>) -> Result<LoadedConfig> {
        Self::discover_in(explicit, &default_locations())
    }

    fn discover_in(explicit: Option<&Path>, candidates: &[PathBuf]) -> Result<LoadedConfig> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => candidates.iter().find(|p| p.is_file()).cloned(),
        };

        match path {
            Some(path) => {
                let file = Self::from_file(&path)?;
                debug!(path = %path.display(), "Loaded config file");
                Ok(LoadedConfig {
                    path: Some(path),
                    file,
                })
            }
            None => {
                debug!("No config file found, using defaults");
                Ok(LoadedConfig::default())
            }
        }
    }
}

/// A config file together with where it was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedConfig {
    /// Path of the file used, if any.
    pub path: Option<PathBuf>,
    /// Parsed contents.
    pub file: ConfigFile,
}

/// Config file locations searched when `--config` is not given, in order.
///
/// The system file comes first; the first existing file wins.
pub fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(CONFIG_FILE_NAME));
    }
    locations
}

/// Values supplied on the command line for this invocation.
///
/// `None` means the flag was not given, so lower-precedence sources apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagValues {
    /// `--author`.
    pub author: Option<String>,
    /// `--comment`.
    pub comment: Option<String>,
    /// `--expires`.
    pub expires: Option<String>,
    /// `--expire-on`.
    pub expire_on: Option<String>,
    /// `--alertmanager.url`.
    pub alertmanager_url: Option<String>,
    /// `AMTOOL_COMMENT_REQUIRED`.
    pub comment_required: Option<bool>,
    /// `--verbose`.
    pub verbose: bool,
}

/// Built-in fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    /// Author used when none is configured.
    pub author: String,
    /// Duration used when none is configured.
    pub expires: String,
}

impl Defaults {
    /// Defaults for the current process: the OS user name and a one hour expiry.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            author: current_username(),
            expires: DEFAULT_EXPIRES.to_string(),
        }
    }
}

/// Name of the user running the process.
///
/// Looked up in the passwd database by uid; `USER`, `USERNAME` and `LOGNAME`
/// are only consulted when that lookup yields nothing.
pub fn current_username() -> String {
    username_with(|key| env::var(key).ok())
}

fn username_with(env_var: impl Fn(&str) -> Option<String>) -> String {
    os_username()
        .or_else(|| {
            ["USER", "USERNAME", "LOGNAME"]
                .iter()
                .find_map(|key| env_var(key).filter(|v| !v.is_empty()))
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(unix)]
fn os_username() -> Option<String> {
    let uid = nix::unistd::getuid();
    match nix::unistd::User::from_uid(uid) {
        Ok(Some(user)) => Some(user.name),
        Ok(None) => {
            debug!(uid = uid.as_raw(), "No passwd entry for current uid");
            None
        }
        Err(e) => {
            debug!(uid = uid.as_raw(), error = %e, "passwd lookup failed");
            None
        }
    }
}

#[cfg(not(unix))]
fn os_username() -> Option<String> {
    None
}

/// The merged, validated settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    /// Silence author.
    pub author: String,
    /// Silence comment.
    pub comment: String,
    /// Relative expiry.
    pub expires: String,
    /// Absolute expiry, overrides `expires` when set.
    pub expire_on: Option<String>,
    /// Whether an empty comment is an error.
    pub comment_required: bool,
    /// Verbose running information.
    pub verbose: bool,
    /// Base URL of the Alertmanager.
    pub alertmanager_url: Url,
}

impl EffectiveConfig {
    /// Merge flags, config file and defaults.
    ///
    /// # Errors
    ///
    /// Returns `SilenceError::ConfigValidation` if the Alertmanager URL is missing or
    /// invalid, or if a comment is required but empty.
    pub fn resolve(flags: &FlagValues, file: &ConfigFile, defaults: &Defaults) -> Result<Self> {
        let author = pick(flags.author.as_deref(), file.author.as_deref())
            .unwrap_or_else(|| defaults.author.clone());
        let comment = pick(flags.comment.as_deref(), file.comment.as_deref()).unwrap_or_default();
        let expires = pick(flags.expires.as_deref(), file.expires.as_deref())
            .unwrap_or_else(|| defaults.expires.clone());
        let expire_on = flags.expire_on.clone().filter(|s| !s.trim().is_empty());
        let comment_required = flags
            .comment_required
            .or(file.comment_required)
            .unwrap_or(false);
        let verbose = flags.verbose || file.verbose.unwrap_or(false);

        let raw_url = pick(flags.alertmanager_url.as_deref(), file.alertmanager.url.as_deref())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                SilenceError::config(
                    "alertmanager.url is not set (use --alertmanager.url or the config file)",
                )
            })?;
        let alertmanager_url = parse_base_url(&raw_url)?;

        let config = Self {
            author,
            comment,
            expires,
            expire_on,
            comment_required,
            verbose,
            alertmanager_url,
        };
        config.validate()?;

        debug!(
            author = %config.author,
            expires = %config.expires,
            expire_on = ?config.expire_on,
            url = %config.alertmanager_url,
            "Resolved configuration"
        );
        Ok(config)
    }

    /// Check cross-field policies.
    ///
    /// # Errors
    ///
    /// Returns `SilenceError::ConfigValidation` if a comment is required but empty.
    pub fn validate(&self) -> Result<()> {
        if self.comment_required && self.comment.is_empty() {
            return Err(SilenceError::config("comment required by config"));
        }
        Ok(())
    }
}

fn pick(flag: Option<&str>, file: Option<&str>) -> Option<String> {
    flag.or(file).map(str::to_string)
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| SilenceError::config(format!("invalid alertmanager.url '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SilenceError::config(format!(
            "invalid alertmanager.url '{raw}': scheme must be http or https"
        )));
    }
    Ok(url)
}
