//! Configuration for toastguard

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::platform;
use crate::security::sniffer::{MAX_AUDIO_BYTES, MAX_IMAGE_BYTES};
use crate::security::{AssetKind, PathPolicy};

/// Longest accepted notification tag or group
const MAX_TAG_LENGTH: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Syntax(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration, read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToastConfig {
    pub paths: PathSettings,
    pub assets: AssetLimits,
    pub notification: NotificationSettings,
}

/// Deny-list sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathSettings {
    /// Add System32/SysWOW64/Sysnative under `SystemRoot` and `windir`
    pub discover_system_dirs: bool,

    /// Extra directories assets may never come from
    pub restricted_dirs: Vec<String>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            discover_system_dirs: true,
            restricted_dirs: Vec::new(),
        }
    }
}

/// Per-kind asset size ceilings in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetLimits {
    pub max_audio_bytes: u64,
    pub max_image_bytes: u64,
}

impl Default for AssetLimits {
    fn default() -> Self {
        Self {
            max_audio_bytes: MAX_AUDIO_BYTES,
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }
}

impl AssetLimits {
    pub fn ceiling(&self, kind: AssetKind) -> u64 {
        match kind {
            AssetKind::Audio => self.max_audio_bytes,
            AssetKind::Image => self.max_image_bytes,
        }
    }
}

/// Toast identity on the notification center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationSettings {
    pub tag: String,
    pub group: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            tag: "toastguard".into(),
            group: "toastguard".into(),
        }
    }
}

impl ToastConfig {
    /// Default location: `<config dir>/toastguard/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("toastguard").join("config.toml"))
    }

    /// Load config from TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::Syntax(source) => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit file if given, else the default location if it exists, else
    /// built-in defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.assets;
        if limits.max_audio_bytes == 0 || limits.max_audio_bytes > MAX_AUDIO_BYTES {
            return Err(ConfigError::Invalid(format!(
                "max_audio_bytes must be between 1 and {MAX_AUDIO_BYTES}"
            )));
        }
        if limits.max_image_bytes == 0 || limits.max_image_bytes > MAX_IMAGE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "max_image_bytes must be between 1 and {MAX_IMAGE_BYTES}"
            )));
        }

        for dir in &self.paths.restricted_dirs {
            if !platform::is_drive_rooted(dir.trim()) {
                return Err(ConfigError::Invalid(format!(
                    "restricted directory {dir:?} must be an absolute drive-rooted path"
                )));
            }
        }

        for (name, value) in [("tag", &self.notification.tag), ("group", &self.notification.group)] {
            if value.trim().is_empty() || value.chars().count() > MAX_TAG_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "notification {name} must be 1 to {MAX_TAG_LENGTH} characters"
                )));
            }
        }

        Ok(())
    }

    /// Deny-list described by this configuration
    pub fn path_policy(&self) -> PathPolicy {
        let mut policy = if self.paths.discover_system_dirs {
            PathPolicy::from_platform()
        } else {
            PathPolicy::builtin()
        };
        for dir in &self.paths.restricted_dirs {
            policy.restrict(dir);
        }
        policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ToastConfig::default();
        config.validate().unwrap();
        assert_eq!(config.assets.ceiling(AssetKind::Audio), 10 * 1024 * 1024);
        assert_eq!(config.assets.ceiling(AssetKind::Image), 1024 * 1024);
        assert_eq!(config.notification.tag, "toastguard");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ToastConfig::parse(
            r#"
            [assets]
            max_image_bytes = 4096
            "#,
        )
        .unwrap();
        assert_eq!(config.assets.max_image_bytes, 4096);
        assert_eq!(config.assets.max_audio_bytes, MAX_AUDIO_BYTES);
        assert!(config.paths.discover_system_dirs);
    }

    #[test]
    fn test_limits_cannot_be_raised() {
        let err = ToastConfig::parse("[assets]\nmax_audio_bytes = 99999999\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ToastConfig::parse("[assets]\nmax_image_bytes = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_restricted_dirs_must_be_rooted() {
        let err = ToastConfig::parse("[paths]\nrestricted_dirs = ['relative\\dir']\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = ToastConfig::parse("[assets]\nmax_video_bytes = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
    }

    #[test]
    fn test_blank_tag_rejected() {
        let err = ToastConfig::parse("[notification]\ntag = '  '\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_path_policy_includes_configured_dirs() {
        let config = ToastConfig::parse(
            r#"
            [paths]
            discover_system_dirs = false
            restricted_dirs = ['D:\Secrets\']
            "#,
        )
        .unwrap();
        let policy = config.path_policy();
        assert!(policy.is_restricted(r"D:\SECRETS\a.png"));
        assert!(policy.is_restricted(r"C:\Windows\System32\a.png"));
        assert!(!policy.is_restricted(r"D:\Public\a.png"));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = ToastConfig::default();
        config.paths.restricted_dirs.push(r"E:\Vault".into());
        let text = config.to_toml_string().unwrap();
        assert_eq!(ToastConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[notification]\ngroup = \"alerts\"").unwrap();
        let config = ToastConfig::load(file.path()).unwrap();
        assert_eq!(config.notification.group, "alerts");

        let err = ToastConfig::load(&file.path().with_extension("missing")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_discover_explicit_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ToastConfig::discover(Some(&dir.path().join("none.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
