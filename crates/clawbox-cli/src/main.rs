mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_CONFIG_ERROR, EXIT_FAILURE};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "clawbox",
    version,
    about = "Sandboxed deployment bootstrapper for the OpenClaw gateway"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Bootstrap the deployment: provision, build, onboard, start.
    Up {
        /// Directory containing the compose project.
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
        /// Primary compose file, relative to the project directory.
        #[arg(long, default_value = "docker-compose.yml")]
        compose_file: PathBuf,
        /// Build context passed to docker build.
        #[arg(long, default_value = ".")]
        build_context: PathBuf,
        /// Reuse the existing image instead of rebuilding it.
        #[arg(long, default_value_t = false)]
        skip_build: bool,
        /// Skip the interactive onboarding run.
        #[arg(long, default_value_t = false)]
        no_onboard: bool,
    },
    /// Print the settings resolved from environment and defaults.
    Config,
    /// Run diagnostic checks on the docker toolchain and project files.
    Doctor {
        /// Directory containing the compose project.
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("CLAWBOX_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let json_output = cli.json;

    // Prerequisites are checked before any mutation; only `up` touches docker.
    let needs_docker = matches!(cli.command, Commands::Up { .. });
    if needs_docker && std::env::var("CLAWBOX_SKIP_PREREQS").as_deref() != Ok("1") {
        let missing = clawbox_runtime::check_docker_prereqs();
        if !missing.is_empty() {
            eprintln!("error: {}", clawbox_runtime::format_missing(&missing));
            return ExitCode::from(EXIT_FAILURE);
        }
    }

    let result = match cli.command {
        Commands::Up {
            project_dir,
            compose_file,
            build_context,
            skip_build,
            no_onboard,
        } => commands::up::run(
            &project_dir,
            &compose_file,
            build_context,
            skip_build,
            no_onboard,
            json_output,
        ),
        Commands::Config => commands::config::run(json_output),
        Commands::Doctor { project_dir } => commands::doctor::run(&project_dir, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("invalid value for") || msg.starts_with("cannot resolve")
            {
                EXIT_CONFIG_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
