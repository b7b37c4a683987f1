//! Ares CLI binary entry point.

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ares::cli::auth;
use ares::cli::{AuthCommands, Cli, Commands};
use ares::config::AresConfig;
use ares::error::AresError;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        if e.needs_login() {
            eprintln!("Run `ares auth url` to start a new login.");
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), AresError> {
    let config = AresConfig::from_env()?;
    match cli.command {
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::Url => auth::handle_url(&config),
            AuthCommands::Login(args) => auth::handle_login(&config, &args.code).await,
            AuthCommands::Callback(args) => auth::handle_callback(&config, &args.uri).await,
            AuthCommands::Refresh => auth::handle_refresh(&config).await,
            AuthCommands::Status => auth::handle_status(&config),
            AuthCommands::Logout => auth::handle_logout(&config),
        },
        Commands::Open(args) => auth::handle_open(&config, args.route),
    }
}
