use super::{EXIT_FAILURE, EXIT_SUCCESS};
use clawbox_core::engine::{ENV_FILE, OVERLAY_FILE};
use std::path::Path;

pub fn run(project_dir: &Path, json_output: bool) -> Result<u8, String> {
    let mut checks: Vec<Check> = Vec::new();
    let mut all_pass = true;

    let missing = clawbox_runtime::check_docker_prereqs();
    if missing.is_empty() {
        checks.push(Check::pass("docker", "Docker toolchain available"));
    } else {
        all_pass = false;
        checks.push(Check::fail(
            "docker",
            &format!(
                "Missing prerequisites: {}",
                clawbox_runtime::format_missing(&missing)
            ),
        ));
    }

    if project_dir.join("docker-compose.yml").is_file() {
        checks.push(Check::pass("compose_file", "docker-compose.yml found"));
    } else {
        all_pass = false;
        checks.push(Check::fail(
            "compose_file",
            &format!("no docker-compose.yml in {}", project_dir.display()),
        ));
    }

    if project_dir.join(ENV_FILE).is_file() {
        checks.push(Check::pass("env_file", ".env present (will be reconciled)"));
    } else {
        checks.push(Check::info(
            "env_file",
            ".env not present (will be created on up)",
        ));
    }

    if project_dir.join(OVERLAY_FILE).is_file() {
        checks.push(Check::info("overlay", "volume overlay present"));
    } else {
        checks.push(Check::info(
            "overlay",
            "no volume overlay (none configured, or up not yet run)",
        ));
    }

    print_results(&checks, all_pass, json_output)
}

fn print_results(checks: &[Check], all_pass: bool, json_output: bool) -> Result<u8, String> {
    if json_output {
        let json = serde_json::json!({
            "healthy": all_pass,
            "checks": checks.iter().map(|c| serde_json::json!({
                "name": c.name,
                "status": c.status,
                "message": c.message,
            })).collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json).map_err(|e| e.to_string())?
        );
    } else {
        println!("clawbox doctor\n");
        for check in checks {
            let icon = match check.status.as_str() {
                "pass" => console::style("✓").green().to_string(),
                "fail" => console::style("✗").red().to_string(),
                _ => console::style("ℹ").dim().to_string(),
            };
            println!("  {icon} {}", check.message);
        }
        println!();
        if all_pass {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }
    Ok(if all_pass { EXIT_SUCCESS } else { EXIT_FAILURE })
}

struct Check {
    name: String,
    status: String,
    message: String,
}

impl Check {
    fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_owned(),
            status: "pass".to_owned(),
            message: message.to_owned(),
        }
    }

    fn fail(name: &str, message: &str) -> Self {
        Self {
            name: name.to_owned(),
            status: "fail".to_owned(),
            message: message.to_owned(),
        }
    }

    fn info(name: &str, message: &str) -> Self {
        Self {
            name: name.to_owned(),
            status: "info".to_owned(),
            message: message.to_owned(),
        }
    }
}
