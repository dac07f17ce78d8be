//! PlantDesk shell - drive the session and navigation flow from a terminal.
//!
//! Each command stands in for something a visitor does in the browser app:
//! typing a URL, pressing back, submitting the login form, signing out.

mod app;
mod directory;

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use plantdesk_core::AppConfig;

// ============================================================================
// Constants
// ============================================================================

/// Log file written inside the data directory
const LOG_FILE_NAME: &str = "plantdesk.log";

const PROMPT: &str = "plantdesk> ";

/// Initialize the tracing subscriber for logging.
///
/// Output goes to a file so it does not interleave with the shell. The
/// returned guard flushes the writer and must live until exit.
fn init_tracing(config: &AppConfig) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let dir = match config.data_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            return None;
        }
    };
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Logging disabled: {}", e);
        return None;
    }

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--hash-password" {
        return hash_password_command();
    }

    let config = AppConfig::load()?;
    let _log_guard = init_tracing(&config);
    info!("PlantDesk shell starting");

    let mut app = App::new(config)?;
    print_lines(&app.start());

    let result = run_shell(&mut app).await;
    app.stop();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("PlantDesk shell shutting down");
    Ok(())
}

async fn run_shell(app: &mut App) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match app.handle_command(line.trim()) {
            Ok(out) => print_lines(&out),
            Err(e) => {
                warn!(error = %e, "Command failed");
                println!("Error: {}", e);
            }
        }

        if app.state == AppState::Quitting {
            break;
        }
    }
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

/// Print an argon2 hash for a users file entry
fn hash_password_command() -> Result<()> {
    let password = rpassword::prompt_password("Password to hash: ")?;
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }
    println!("{}", directory::hash_password(&password)?);
    Ok(())
}
