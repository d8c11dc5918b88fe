use super::{json_pretty, propagate_status, EXIT_SUCCESS};
use clawbox_core::{CoreError, Engine, UpOptions};
use clawbox_schema::Settings;
use std::path::{Path, PathBuf};

#[allow(clippy::fn_params_excessive_bools)]
pub fn run(
    project_dir: &Path,
    compose_file: &Path,
    build_context: PathBuf,
    skip_build: bool,
    no_onboard: bool,
    json: bool,
) -> Result<u8, String> {
    let settings = Settings::from_env().map_err(|e| e.to_string())?;
    let engine = Engine::new(settings, project_dir, compose_file);
    let options = UpOptions {
        build_context,
        skip_build,
        no_onboard,
    };

    let prepared = match engine.up(&options) {
        Ok(prepared) => prepared,
        // An external step failed: surface its exact status, no retry.
        Err(CoreError::Runtime(err)) => {
            eprintln!("error: {err}");
            return Ok(err.exit_status().map_or(super::EXIT_FAILURE, propagate_status));
        }
        Err(e) => return Err(e.to_string()),
    };

    if json {
        let payload = serde_json::json!({
            "gateway_port": prepared.settings.gateway_port,
            "bridge_port": prepared.settings.bridge_port,
            "image": prepared.settings.image,
            "compose_files": prepared.compose_files,
            "overlay_written": prepared.overlay_written,
            "status": "running"
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "gateway is up on port {} (image {})",
            prepared.settings.gateway_port, prepared.settings.image
        );
        if prepared.overlay_written {
            println!("volume overlay: docker-compose.extra.yml");
        }
    }
    Ok(EXIT_SUCCESS)
}
