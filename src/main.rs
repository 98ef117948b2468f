// quizdesk command-line entry point.
// Parses arguments, sets up logging and configuration, then runs one command.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use quizdesk::app::{self, Command};
use quizdesk::{Config, QuizClient, QuizStore};

/// Manage quizzes and their questions on a quiz data service.
#[derive(Parser)]
#[command(name = "quizdesk", version, about, long_about = None)]
struct Cli {
    /// JSON config file (defaults to the user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data service URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizdesk=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> quizdesk::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.base_url {
        config.base_url = url;
        config.validate()?;
    }

    let client = QuizClient::from_config(&config)?;
    let store = QuizStore::new(client, &config);

    let mut stdout = std::io::stdout().lock();
    app::run(&store, cli.command, &mut stdout).await
}
