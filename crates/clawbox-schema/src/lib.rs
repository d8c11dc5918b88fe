//! Settings model and recognized key set for clawbox.
//!
//! This crate defines the schema layer: the fixed, closed set of recognized
//! `.env` keys (`EnvKey`), the immutable `Settings` value resolved once at
//! startup from the process environment and built-in defaults, and the
//! extra-mounts string parser (`parse_extra_mounts`).

pub mod keys;
pub mod mounts;
pub mod settings;

pub use keys::EnvKey;
pub use mounts::parse_extra_mounts;
pub use settings::{ConfigError, Settings};
