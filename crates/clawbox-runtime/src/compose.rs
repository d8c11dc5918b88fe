//! Synchronous `docker` invocations for build, onboarding, and service start.
//!
//! Argument vectors are assembled separately from process execution so command
//! construction stays testable without a docker daemon. Every invocation
//! inherits the caller's stdio: build output streams through, and the
//! onboarding run is fully interactive.

use crate::RuntimeError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Fixed compose service running the gateway.
pub const GATEWAY_SERVICE: &str = "openclaw-gateway";
/// Fixed compose service used for interactive CLI sessions.
pub const CLI_SERVICE: &str = "openclaw-cli";

/// Build arg carrying the optional apt-package list into the image build.
pub const APT_PACKAGES_BUILD_ARG: &str = "CLAWBOX_APT_PACKAGES";

/// An image build delegation: tag, build context, and optional package list.
#[derive(Debug, Clone)]
pub struct BuildRequest<'a> {
    pub image: &'a str,
    pub context: &'a Path,
    pub apt_packages: Option<&'a str>,
}

impl BuildRequest<'_> {
    /// Arguments passed to `docker` for this build.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "build".to_owned(),
            "-t".to_owned(),
            self.image.to_owned(),
        ];
        if let Some(packages) = self.apt_packages {
            args.push("--build-arg".to_owned());
            args.push(format!("{APT_PACKAGES_BUILD_ARG}={packages}"));
        }
        args.push(self.context.display().to_string());
        args
    }
}

/// Build the sandbox image, streaming docker's output to the terminal.
pub fn build_image(request: &BuildRequest<'_>) -> Result<(), RuntimeError> {
    info!(image = request.image, "building sandbox image");
    run_docker(&request.to_args())
}

/// A compose project: working directory plus the ordered set of compose files.
///
/// The default compose file comes first; the overlay file, when one was
/// synthesized, follows it so its volume configuration merges on top.
#[derive(Debug, Clone)]
pub struct ComposeProject {
    project_dir: PathBuf,
    compose_files: Vec<PathBuf>,
}

impl ComposeProject {
    pub fn new(project_dir: impl Into<PathBuf>, compose_files: Vec<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            compose_files,
        }
    }

    /// Arguments for one `docker compose` subcommand against this project.
    pub fn to_args(&self, tail: &[&str]) -> Vec<String> {
        let mut args = vec!["compose".to_owned()];
        for file in &self.compose_files {
            args.push("-f".to_owned());
            args.push(file.display().to_string());
        }
        args.extend(tail.iter().map(|s| (*s).to_owned()));
        args
    }

    /// Run the interactive onboarding flow in a throwaway CLI container.
    pub fn run_onboarding(&self) -> Result<(), RuntimeError> {
        info!("starting interactive onboarding");
        self.run_compose(&["run", "--rm", CLI_SERVICE, "onboard"])
    }

    /// Start the gateway service in the background.
    pub fn up_gateway(&self) -> Result<(), RuntimeError> {
        info!("starting gateway service");
        self.run_compose(&["up", "-d", GATEWAY_SERVICE])
    }

    fn run_compose(&self, tail: &[&str]) -> Result<(), RuntimeError> {
        let args = self.to_args(tail);
        debug!(?args, "invoking docker compose");
        let status = Command::new("docker")
            .args(&args)
            .current_dir(&self.project_dir)
            .stdin(std::process::Stdio::inherit())
            .stdout(std::process::Stdio::inherit())
            .stderr(std::process::Stdio::inherit())
            .status()
            .map_err(|source| RuntimeError::Spawn {
                program: "docker compose".to_owned(),
                source,
            })?;
        check_status("docker compose", status)
    }
}

fn run_docker(args: &[String]) -> Result<(), RuntimeError> {
    debug!(?args, "invoking docker");
    let status = Command::new("docker")
        .args(args)
        .stdin(std::process::Stdio::inherit())
        .stdout(std::process::Stdio::inherit())
        .stderr(std::process::Stdio::inherit())
        .status()
        .map_err(|source| RuntimeError::Spawn {
            program: "docker".to_owned(),
            source,
        })?;
    check_status("docker", status)
}

fn check_status(program: &str, status: std::process::ExitStatus) -> Result<(), RuntimeError> {
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(RuntimeError::CommandFailed {
            program: program.to_owned(),
            status: code,
        }),
        None => Err(RuntimeError::Terminated {
            program: program.to_owned(),
        }),
    }
}
