//! Deterministic synthesis of the compose overlay document.
//!
//! The overlay adds volume configuration for the two fixed services without
//! touching the primary compose file. It is built as an explicit document
//! model and serialized once, so identical inputs always render byte-identical
//! YAML and callers can diff or re-run without spurious changes.

use serde::Serialize;
use std::collections::BTreeMap;

/// Container home directory the home volume binds to.
pub const CONTAINER_HOME: &str = "/home/node";
/// Fixed bind target for the host configuration directory.
pub const CONTAINER_CONFIG_DIR: &str = "/home/node/.openclaw";
/// Fixed bind target for the host workspace directory.
pub const CONTAINER_WORKSPACE_DIR: &str = "/home/node/workspace";

/// Inputs to overlay synthesis.
#[derive(Debug, Clone)]
pub struct OverlaySpec<'a> {
    /// Home volume source: a bare name for a docker-managed named volume, or
    /// a host path (anything containing `/`) for a bind mount. `None` or
    /// empty means no home volume.
    pub home_volume: Option<&'a str>,
    /// Ad-hoc mount clauses, already split and trimmed; order is preserved.
    pub mounts: &'a [String],
    /// Host configuration directory, bound under the container home.
    pub config_dir: &'a str,
    /// Host workspace directory, bound under the container home.
    pub workspace_dir: &'a str,
}

/// The synthesized overlay document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayDoc {
    services: Services,
    #[serde(skip_serializing_if = "Option::is_none")]
    volumes: Option<BTreeMap<String, NamedVolume>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Services {
    #[serde(rename = "openclaw-gateway")]
    gateway: ServiceVolumes,
    #[serde(rename = "openclaw-cli")]
    cli: ServiceVolumes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ServiceVolumes {
    volumes: Vec<String>,
}

/// Declared with no options; docker manages the volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct NamedVolume;

impl OverlayDoc {
    /// Serialize the document. Field and list order are fixed, so output is a
    /// pure function of the inputs.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Mount clauses applied to each service, in emission order.
    pub fn service_mounts(&self) -> &[String] {
        &self.services.gateway.volumes
    }

    /// Name of the declared named volume, when the document has one.
    pub fn named_volume(&self) -> Option<&str> {
        self.volumes
            .as_ref()
            .and_then(|v| v.keys().next())
            .map(String::as_str)
    }
}

/// Build the overlay document, or `None` when there is nothing to overlay.
///
/// When the home volume is set, each service gets the home bind followed by
/// the two fixed sub-binds for configuration and workspace, then every ad-hoc
/// mount in supplied order. A home volume without a `/` is a docker named
/// volume and also gets a top-level declaration; one with a `/` is a host
/// path bind and does not.
pub fn synthesize(spec: &OverlaySpec<'_>) -> Option<OverlayDoc> {
    let home_volume = spec.home_volume.map(str::trim).filter(|v| !v.is_empty());
    if home_volume.is_none() && spec.mounts.is_empty() {
        return None;
    }

    let mut mounts = Vec::new();
    if let Some(volume) = home_volume {
        mounts.push(format!("{volume}:{CONTAINER_HOME}"));
        mounts.push(format!("{}:{CONTAINER_CONFIG_DIR}", spec.config_dir));
        mounts.push(format!("{}:{CONTAINER_WORKSPACE_DIR}", spec.workspace_dir));
    }
    mounts.extend(spec.mounts.iter().cloned());

    let volumes = home_volume.filter(|v| !v.contains('/')).map(|v| {
        let mut declarations = BTreeMap::new();
        let _ = declarations.insert(v.to_owned(), NamedVolume);
        declarations
    });

    Some(OverlayDoc {
        services: Services {
            gateway: ServiceVolumes {
                volumes: mounts.clone(),
            },
            cli: ServiceVolumes { volumes: mounts },
        },
        volumes,
    })
}
