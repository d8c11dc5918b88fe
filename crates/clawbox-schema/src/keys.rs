use serde::{Deserialize, Serialize};

/// One of the recognized `.env` keys.
///
/// The set is fixed and closed: reconciliation never writes a key outside this
/// enumeration, and `ALL` defines the order in which missing keys are appended
/// to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvKey {
    ConfigDir,
    WorkspaceDir,
    GatewayPort,
    BridgePort,
    GatewayBind,
    GatewayToken,
    Image,
    ExtraMounts,
    HomeVolume,
    AptPackages,
}

impl EnvKey {
    /// Every recognized key, in the fixed enumeration order.
    pub const ALL: [Self; 10] = [
        Self::ConfigDir,
        Self::WorkspaceDir,
        Self::GatewayPort,
        Self::BridgePort,
        Self::GatewayBind,
        Self::GatewayToken,
        Self::Image,
        Self::ExtraMounts,
        Self::HomeVolume,
        Self::AptPackages,
    ];

    /// Literal key as it appears in the `.env` file and process environment.
    pub fn name(self) -> &'static str {
        match self {
            Self::ConfigDir => "CLAWBOX_CONFIG_DIR",
            Self::WorkspaceDir => "CLAWBOX_WORKSPACE_DIR",
            Self::GatewayPort => "CLAWBOX_GATEWAY_PORT",
            Self::BridgePort => "CLAWBOX_BRIDGE_PORT",
            Self::GatewayBind => "CLAWBOX_GATEWAY_BIND",
            Self::GatewayToken => "CLAWBOX_GATEWAY_TOKEN",
            Self::Image => "CLAWBOX_IMAGE",
            Self::ExtraMounts => "CLAWBOX_EXTRA_MOUNTS",
            Self::HomeVolume => "CLAWBOX_HOME_VOLUME",
            Self::AptPackages => "CLAWBOX_APT_PACKAGES",
        }
    }

    /// Reverse lookup from the literal key name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_exhaustive_and_ordered() {
        assert_eq!(EnvKey::ALL.len(), 10);
        assert_eq!(EnvKey::ALL[0], EnvKey::ConfigDir);
        assert_eq!(EnvKey::ALL[9], EnvKey::AptPackages);
    }

    #[test]
    fn names_round_trip() {
        for key in EnvKey::ALL {
            assert_eq!(EnvKey::from_name(key.name()), Some(key));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(EnvKey::from_name("CLAWBOX_UNKNOWN"), None);
        assert_eq!(EnvKey::from_name(""), None);
    }
}
