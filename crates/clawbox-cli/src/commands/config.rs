use super::{json_pretty, EXIT_SUCCESS};
use clawbox_schema::Settings;

pub fn run(json: bool) -> Result<u8, String> {
    let settings = Settings::from_env().map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&settings)?);
    } else {
        println!("config_dir:     {}", settings.config_dir.display());
        println!("workspace_dir:  {}", settings.workspace_dir.display());
        println!("gateway_port:   {}", settings.gateway_port);
        println!("bridge_port:    {}", settings.bridge_port);
        println!("gateway_bind:   {}", settings.gateway_bind);
        println!(
            "gateway_token:  {}",
            if settings.gateway_token.is_some() {
                "(set)"
            } else {
                "(generated on up)"
            }
        );
        println!("image:          {}", settings.image);
        println!(
            "extra_mounts:   {}",
            settings.extra_mounts.as_deref().unwrap_or("(none)")
        );
        println!(
            "home_volume:    {}",
            settings.home_volume.as_deref().unwrap_or("(none)")
        );
        println!(
            "apt_packages:   {}",
            settings.apt_packages.as_deref().unwrap_or("(none)")
        );
    }
    Ok(EXIT_SUCCESS)
}
