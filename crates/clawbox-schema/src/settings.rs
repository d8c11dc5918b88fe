use crate::keys::EnvKey;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("cannot resolve default for {key}: HOME is not set")]
    HomeUnset { key: &'static str },
}

/// Immutable, fully resolved configuration for one invocation.
///
/// Built once at startup from the process environment plus built-in defaults
/// and passed down explicitly; no component reads environment variables after
/// this point. Empty or whitespace-only environment values count as unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub config_dir: PathBuf,
    pub workspace_dir: PathBuf,
    pub gateway_port: u16,
    pub bridge_port: u16,
    pub gateway_bind: String,
    pub gateway_token: Option<String>,
    pub image: String,
    pub extra_mounts: Option<String>,
    pub home_volume: Option<String>,
    pub apt_packages: Option<String>,
}

pub const DEFAULT_GATEWAY_PORT: u16 = 18789;
pub const DEFAULT_BRIDGE_PORT: u16 = 18790;
pub const DEFAULT_GATEWAY_BIND: &str = "lan";
pub const DEFAULT_IMAGE: &str = "openclaw:local";

impl Settings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    ///
    /// `lookup` is consulted for every recognized key name plus `HOME`, which
    /// anchors the default config and workspace directories.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: EnvKey| -> Option<String> {
            lookup(key.name())
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let config_dir = match get(EnvKey::ConfigDir) {
            Some(dir) => PathBuf::from(dir),
            None => home_dir(&lookup, EnvKey::ConfigDir)?.join(".openclaw"),
        };
        let workspace_dir = match get(EnvKey::WorkspaceDir) {
            Some(dir) => PathBuf::from(dir),
            None => config_dir.join("workspace"),
        };

        Ok(Self {
            config_dir,
            workspace_dir,
            gateway_port: parse_port(EnvKey::GatewayPort, get(EnvKey::GatewayPort))?,
            bridge_port: parse_port(EnvKey::BridgePort, get(EnvKey::BridgePort))?,
            gateway_bind: get(EnvKey::GatewayBind)
                .unwrap_or_else(|| DEFAULT_GATEWAY_BIND.to_owned()),
            gateway_token: get(EnvKey::GatewayToken),
            image: get(EnvKey::Image).unwrap_or_else(|| DEFAULT_IMAGE.to_owned()),
            extra_mounts: get(EnvKey::ExtraMounts),
            home_volume: get(EnvKey::HomeVolume),
            apt_packages: get(EnvKey::AptPackages),
        })
    }

    /// Copy of these settings with the gateway token filled in.
    pub fn with_gateway_token(mut self, token: impl Into<String>) -> Self {
        self.gateway_token = Some(token.into());
        self
    }

    /// Current value for one recognized key, if defined this run.
    ///
    /// Undefined values are skipped by reconciliation, never written.
    pub fn value_of(&self, key: EnvKey) -> Option<String> {
        match key {
            EnvKey::ConfigDir => Some(self.config_dir.display().to_string()),
            EnvKey::WorkspaceDir => Some(self.workspace_dir.display().to_string()),
            EnvKey::GatewayPort => Some(self.gateway_port.to_string()),
            EnvKey::BridgePort => Some(self.bridge_port.to_string()),
            EnvKey::GatewayBind => Some(self.gateway_bind.clone()),
            EnvKey::GatewayToken => self.gateway_token.clone(),
            EnvKey::Image => Some(self.image.clone()),
            EnvKey::ExtraMounts => self.extra_mounts.clone(),
            EnvKey::HomeVolume => self.home_volume.clone(),
            EnvKey::AptPackages => self.apt_packages.clone(),
        }
    }

    /// Every recognized key with its current value, in fixed key order.
    pub fn env_entries(&self) -> Vec<(EnvKey, Option<String>)> {
        EnvKey::ALL
            .into_iter()
            .map(|key| (key, self.value_of(key)))
            .collect()
    }
}

fn home_dir(
    lookup: &impl Fn(&str) -> Option<String>,
    key: EnvKey,
) -> Result<PathBuf, ConfigError> {
    lookup("HOME")
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::HomeUnset { key: key.name() })
}

fn parse_port(key: EnvKey, raw: Option<String>) -> Result<u16, ConfigError> {
    let default = match key {
        EnvKey::GatewayPort => DEFAULT_GATEWAY_PORT,
        _ => DEFAULT_BRIDGE_PORT,
    };
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                key: key.name(),
                value,
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_resolve_under_home() {
        let settings = Settings::from_lookup(lookup_from(&[("HOME", "/home/claw")])).unwrap();
        assert_eq!(settings.config_dir, PathBuf::from("/home/claw/.openclaw"));
        assert_eq!(
            settings.workspace_dir,
            PathBuf::from("/home/claw/.openclaw/workspace")
        );
        assert_eq!(settings.gateway_port, 18789);
        assert_eq!(settings.bridge_port, 18790);
        assert_eq!(settings.gateway_bind, "lan");
        assert_eq!(settings.image, "openclaw:local");
        assert_eq!(settings.gateway_token, None);
        assert_eq!(settings.extra_mounts, None);
        assert_eq!(settings.home_volume, None);
        assert_eq!(settings.apt_packages, None);
    }

    #[test]
    fn workspace_default_follows_overridden_config_dir() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("HOME", "/home/claw"),
            ("CLAWBOX_CONFIG_DIR", "/srv/claw"),
        ]))
        .unwrap();
        assert_eq!(settings.workspace_dir, PathBuf::from("/srv/claw/workspace"));
    }

    #[test]
    fn explicit_values_win_over_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("HOME", "/home/claw"),
            ("CLAWBOX_GATEWAY_PORT", "9000"),
            ("CLAWBOX_IMAGE", "openclaw:dev"),
            ("CLAWBOX_HOME_VOLUME", "claw-home"),
        ]))
        .unwrap();
        assert_eq!(settings.gateway_port, 9000);
        assert_eq!(settings.image, "openclaw:dev");
        assert_eq!(settings.home_volume.as_deref(), Some("claw-home"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("HOME", "/home/claw"),
            ("CLAWBOX_GATEWAY_TOKEN", "   "),
            ("CLAWBOX_EXTRA_MOUNTS", ""),
        ]))
        .unwrap();
        assert_eq!(settings.gateway_token, None);
        assert_eq!(settings.extra_mounts, None);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[
            ("HOME", "/home/claw"),
            ("CLAWBOX_BRIDGE_PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("CLAWBOX_BRIDGE_PORT"));
    }

    #[test]
    fn missing_home_without_config_dir_fails() {
        let err = Settings::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("HOME"));
    }

    #[test]
    fn env_entries_follow_fixed_key_order() {
        let settings = Settings::from_lookup(lookup_from(&[("HOME", "/home/claw")])).unwrap();
        let entries = settings.env_entries();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].0, EnvKey::ConfigDir);
        assert_eq!(entries[5], (EnvKey::GatewayToken, None));
        assert_eq!(
            entries[6],
            (EnvKey::Image, Some("openclaw:local".to_owned()))
        );
    }

    #[test]
    fn with_gateway_token_fills_only_the_token() {
        let settings = Settings::from_lookup(lookup_from(&[("HOME", "/home/claw")])).unwrap();
        let updated = settings.clone().with_gateway_token("abc123");
        assert_eq!(updated.gateway_token.as_deref(), Some("abc123"));
        assert_eq!(updated.image, settings.image);
    }
}
