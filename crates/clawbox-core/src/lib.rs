//! Core bootstrap logic for clawbox.
//!
//! This crate ties the schema and runtime layers together into the `Engine` —
//! the orchestrator that provisions the gateway secret, synthesizes the
//! optional compose overlay, reconciles the persisted `.env` file, and
//! delegates to the docker toolchain. The pieces with real logic live in
//! `envfile` (idempotent key-value reconciliation), `overlay` (deterministic
//! compose overlay synthesis), and `secret` (token provisioning).

pub mod engine;
pub mod envfile;
pub mod overlay;
pub mod secret;

pub use engine::{Engine, Prepared, UpOptions};
pub use envfile::{lookup, parse_line, reconcile, EnvLine};
pub use overlay::{synthesize, OverlayDoc, OverlaySpec};
pub use secret::provision_token;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(#[from] clawbox_schema::ConfigError),
    #[error("runtime error: {0}")]
    Runtime(#[from] clawbox_runtime::RuntimeError),
    #[error("I/O error at {path}: {source}")]
    IoAt {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to render compose overlay: {0}")]
    OverlayRender(#[from] serde_yaml::Error),
    #[error("no usable randomness source for token generation: {0}")]
    NoRandomness(String),
}
