mod commands;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "campusweb")]
#[command(about = "Campus Square portal scraper")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the session id
    Login(PortalArgs),

    /// Fetch grades as JSON
    Grades(PortalArgs),

    /// Fetch the calendar URL and its events as JSON
    Calendar(PortalArgs),
}

#[derive(Args)]
struct PortalArgs {
    /// User id
    #[arg(short, long)]
    user: Option<String>,

    /// Password
    #[arg(short, long)]
    pass: Option<String>,

    /// Portal base URL
    #[arg(long, default_value = campusweb_core::DEFAULT_BASE_URL)]
    url: String,

    /// Session id; skips login when provided
    #[arg(long)]
    sid: Option<String>,

    /// Output JSON only (for scripts)
    #[arg(long)]
    json: bool,
}

impl PortalArgs {
    fn into_params(self) -> commands::PortalParams {
        commands::PortalParams {
            user: self.user,
            pass: self.pass,
            url: self.url,
            sid: self.sid,
            json: self.json,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("campusweb={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let json = match &cli.command {
        Commands::Login(args) | Commands::Grades(args) | Commands::Calendar(args) => args.json,
    };

    let result = match cli.command {
        Commands::Login(args) => commands::login_command(args.into_params()).await,
        Commands::Grades(args) => commands::grades_command(args.into_params()).await,
        Commands::Calendar(args) => commands::calendar_command(args.into_params()).await,
    };

    if let Err(err) = result {
        if json {
            eprintln!("{}", serde_json::json!({ "error": err.to_string() }));
        } else {
            eprintln!("Error: {err}");
        }
        std::process::exit(1);
    }
}
