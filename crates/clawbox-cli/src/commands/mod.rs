pub mod completions;
pub mod config;
pub mod doctor;
pub mod up;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Map an external process exit status onto our own exit code, unchanged
/// where it fits in a byte.
pub fn propagate_status(status: i32) -> u8 {
    u8::try_from(status).unwrap_or(EXIT_FAILURE)
}
