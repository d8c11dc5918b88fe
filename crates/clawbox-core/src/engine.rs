use crate::{envfile, overlay, secret, CoreError};
use clawbox_runtime::{build_image, BuildRequest, ComposeProject};
use clawbox_schema::{parse_extra_mounts, EnvKey, Settings};
use std::path::PathBuf;
use tracing::{debug, info};

/// Persisted key-value file, kept in the compose project directory.
pub const ENV_FILE: &str = ".env";
/// Overlay compose file, written only when a volume source is configured.
pub const OVERLAY_FILE: &str = "docker-compose.extra.yml";

/// Bootstrap orchestrator.
///
/// Sequences directory setup, token provisioning, overlay synthesis, and
/// `.env` reconciliation, then hands off to the docker toolchain. Everything
/// before the docker calls is exposed as [`Engine::prepare`] so it stays
/// testable without a daemon.
pub struct Engine {
    settings: Settings,
    project_dir: PathBuf,
    compose_file: PathBuf,
}

/// Knobs for the full `up` sequence.
#[derive(Debug, Clone)]
pub struct UpOptions {
    /// Build context handed to `docker build`.
    pub build_context: PathBuf,
    /// Reuse the existing image instead of rebuilding.
    pub skip_build: bool,
    /// Skip the interactive onboarding run.
    pub no_onboard: bool,
}

impl Default for UpOptions {
    fn default() -> Self {
        Self {
            build_context: PathBuf::from("."),
            skip_build: false,
            no_onboard: false,
        }
    }
}

/// Outcome of the provisioning phase.
pub struct Prepared {
    /// Settings with the gateway token filled in.
    pub settings: Settings,
    /// Compose files for the rest of the run: the default file, then the
    /// overlay when one was written.
    pub compose_files: Vec<PathBuf>,
    /// Whether an overlay document was synthesized this run.
    pub overlay_written: bool,
}

impl Engine {
    pub fn new(
        settings: Settings,
        project_dir: impl Into<PathBuf>,
        compose_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            settings,
            project_dir: project_dir.into(),
            compose_file: compose_file.into(),
        }
    }

    /// Provision state on disk: directories, token, overlay, `.env`.
    ///
    /// Idempotent — re-running with unchanged settings rewrites the same
    /// bytes. The gateway token comes from the environment when set, else
    /// from the persisted `.env`; a secret is generated only when neither
    /// holds one, so re-running never invalidates onboarded clients.
    pub fn prepare(&self) -> Result<Prepared, CoreError> {
        for dir in [&self.settings.config_dir, &self.settings.workspace_dir] {
            std::fs::create_dir_all(dir).map_err(|source| CoreError::IoAt {
                path: dir.clone(),
                source,
            })?;
        }

        let env_path = self.project_dir.join(ENV_FILE);
        let persisted_token = envfile::lookup(&env_path, EnvKey::GatewayToken);
        let token = secret::provision_token(
            self.settings
                .gateway_token
                .as_deref()
                .or(persisted_token.as_deref()),
        )?;
        let settings = self.settings.clone().with_gateway_token(token);

        let mounts = settings
            .extra_mounts
            .as_deref()
            .map(parse_extra_mounts)
            .unwrap_or_default();

        let doc = overlay::synthesize(&overlay::OverlaySpec {
            home_volume: settings.home_volume.as_deref(),
            mounts: &mounts,
            config_dir: &settings.config_dir.display().to_string(),
            workspace_dir: &settings.workspace_dir.display().to_string(),
        });

        let mut compose_files = vec![self.compose_file.clone()];
        let overlay_written = match doc {
            Some(doc) => {
                let path = self.project_dir.join(OVERLAY_FILE);
                std::fs::write(&path, doc.to_yaml()?).map_err(|source| CoreError::IoAt {
                    path: path.clone(),
                    source,
                })?;
                info!(path = %path.display(), "wrote compose overlay");
                compose_files.push(PathBuf::from(OVERLAY_FILE));
                true
            }
            None => {
                debug!("no volume sources configured; skipping overlay");
                false
            }
        };

        envfile::reconcile(&env_path, &settings.env_entries())?;

        Ok(Prepared {
            settings,
            compose_files,
            overlay_written,
        })
    }

    /// Full bootstrap: prepare, build, onboard, start the gateway.
    ///
    /// External steps run synchronously; the first non-zero exit status aborts
    /// the rest of the sequence and is surfaced unchanged to the caller.
    pub fn up(&self, options: &UpOptions) -> Result<Prepared, CoreError> {
        let prepared = self.prepare()?;

        if options.skip_build {
            debug!("skipping image build");
        } else {
            build_image(&BuildRequest {
                image: &prepared.settings.image,
                context: &options.build_context,
                apt_packages: prepared.settings.apt_packages.as_deref(),
            })?;
        }

        let project = ComposeProject::new(&self.project_dir, prepared.compose_files.clone());
        if !options.no_onboard {
            project.run_onboarding()?;
        }
        project.up_gateway()?;

        Ok(prepared)
    }
}
