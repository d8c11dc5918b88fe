//! External toolchain boundary for clawbox.
//!
//! This crate owns every `docker` invocation: image builds, the interactive
//! onboarding run, and service start via `docker compose`. Calls are
//! synchronous, inherit the caller's stdio, and propagate the external exit
//! status unchanged. It also implements prerequisite checking with actionable
//! install hints.

pub mod compose;
pub mod prereq;

pub use compose::{build_image, BuildRequest, ComposeProject, CLI_SERVICE, GATEWAY_SERVICE};
pub use prereq::{check_docker_prereqs, format_missing, MissingPrereq};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with status {status}")]
    CommandFailed { program: String, status: i32 },
    #[error("{program} was terminated by a signal")]
    Terminated { program: String },
}

impl RuntimeError {
    /// Exit status of the failed external command, when one exists.
    ///
    /// The orchestrator aborts on the first failure and surfaces this exact
    /// status as its own exit code.
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
