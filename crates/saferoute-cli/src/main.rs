//! SafeRoute CLI - drive the account session from the terminal.

mod app;
mod commands;
mod output;

use app_config_and_utils::{init_logging, AuthBackendKind, Config, Paths};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// SafeRoute CLI - sign up, log in and complete your safety profile.
#[derive(Parser)]
#[command(name = "saferoute")]
#[command(about = "SafeRoute account and session management")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Data directory (defaults to ~/.saferoute)
    #[arg(long, global = true, env = "SAFEROUTE_HOME")]
    base_dir: Option<PathBuf>,

    /// Auth backend (mock or firebase); overrides the config file
    #[arg(long, global = true)]
    backend: Option<AuthBackendKind>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current session
    Status,

    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        confirm_password: Option<String>,
        /// 10-digit phone number
        #[arg(long)]
        phone: Option<String>,
    },

    /// Log in with email and password
    Login {
        #[arg(long, visible_alias = "phone")]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in with Google
    LoginGoogle,

    /// Submit the profile form
    CompleteProfile(commands::ProfileArgs),

    /// Log out and clear the saved session
    Logout,

    /// Send a password reset email
    ResetPassword {
        #[arg(long)]
        email: String,
    },

    /// Mark the onboarding carousel as seen
    CarouselSeen,

    /// Show the screen the app would open on
    Route,

    /// Walk through the full flow with a mock backend and in-memory storage
    Demo,
}

fn load_config(cli: &Cli, paths: &Paths) -> anyhow::Result<Config> {
    let mut config = Config::load(paths)?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(backend) = cli.backend {
        config.auth_backend = backend;
    }
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = match &cli.base_dir {
        Some(dir) => Paths::with_base_dir(dir.clone()),
        None => Paths::new()?,
    };
    let config = load_config(&cli, &paths)?;

    init_logging(&config.log_level);
    debug!(
        base_dir = %paths.base_dir().display(),
        backend = %config.auth_backend,
        "Starting saferoute"
    );

    let format = cli.format;
    let session = || app::open_controller(&config, &paths);

    match cli.command {
        Commands::Status => commands::status(&*session().await?, format).await,
        Commands::Signup {
            email,
            password,
            confirm_password,
            phone,
        } => {
            let controller = session().await?;
            commands::signup(&controller, email, password, confirm_password, phone, format).await
        }
        Commands::Login { email, password } => {
            commands::login(&*session().await?, email, password, format).await
        }
        Commands::LoginGoogle => {
            let controller = session().await?;
            if let AuthBackendKind::Firebase = config.auth_backend {
                println!(
                    "Waiting for Google sign-in at http://localhost:{}/callback",
                    config.federated_callback_port
                );
            }
            commands::login_google(&controller, format).await
        }
        Commands::CompleteProfile(args) => {
            commands::complete_profile(&*session().await?, args, format).await
        }
        Commands::Logout => commands::logout(&*session().await?, format).await,
        Commands::ResetPassword { email } => {
            commands::reset_password(&*session().await?, email, format).await
        }
        Commands::CarouselSeen => commands::carousel_seen(&*session().await?, format).await,
        Commands::Route => commands::route(&*session().await?, format).await,
        Commands::Demo => commands::demo(format).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_complete_profile() {
        let cli = Cli::try_parse_from([
            "saferoute",
            "complete-profile",
            "--full-name",
            "Ana Lima",
            "--date-of-birth",
            "02/03/1995",
            "--gender",
            "female",
            "--home-address",
            "1 Safe Street",
            "--contact",
            "Mom:5550000000:Parent",
            "--contact",
            "Sam:5551112222",
        ])
        .unwrap();

        match cli.command {
            Commands::CompleteProfile(args) => {
                let profile = args.into_profile();
                assert_eq!(profile.full_name.as_deref(), Some("Ana Lima"));
                assert_eq!(profile.emergency_contacts.len(), 2);
            }
            _ => panic!("expected complete-profile"),
        }
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "saferoute",
            "status",
            "--backend",
            "firebase",
            "--log-level",
            "debug",
            "--format",
            "json",
        ])
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        let config = load_config(&cli, &paths).unwrap();
        assert_eq!(config.auth_backend, AuthBackendKind::Firebase);
        assert_eq!(config.log_level, "debug");
    }
}
