//! sqlchat - chat with your relational database in natural language.

use sqlchat::cli::Cli;
use sqlchat::commands::handlers::connection::handle_connect;
use sqlchat::commands::ConnectArgs;
use sqlchat::config::{ApiKeys, Config, ConnectionConfig};
use sqlchat::db::MockDatabaseClient;
use sqlchat::error::Result;
use sqlchat::session::Session;
use sqlchat::{headless, logging, tui};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if cli.headless {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        eprintln!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // API keys may live in a .env file next to the working directory
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Failed to load .env file: {e}");
        }
    }

    // Precedence: CLI arguments > config file > built-in defaults
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_to(&mut config)?;

    let mut session = Session::new(&config, ApiKeys::from_env(), cli.mock_llm)?;

    let mut startup = None;
    if cli.mock_db {
        info!("Using mock database");
        session
            .attach(
                ConnectionConfig::default(),
                Box::new(MockDatabaseClient::chinook()),
            )
            .await;
    } else if cli.connect {
        // Reported in the chat like a /connect typed by the user
        startup = Some(handle_connect(&mut session, ConnectArgs::default()).await);
    }

    let result = if cli.headless {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        headless::run(&mut session, startup, stdin, &mut tokio::io::stdout()).await
    } else {
        tui::Tui::new()?.run(&mut session, startup).await
    };

    if let Err(e) = session.close().await {
        warn!("Failed to close connection: {e}");
    }

    result
}
