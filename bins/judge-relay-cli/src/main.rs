mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "judge-relay")]
#[command(about = "Judge relay CLI - Run code on Judge0 and inspect normalized output", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a source file and print the normalized result
    Submit {
        /// Path to the source file
        #[arg(short, long)]
        file: PathBuf,

        /// Language name (e.g., python, rust) or numeric Judge0 id
        #[arg(short, long)]
        language: String,

        /// Text fed to the program's stdin
        #[arg(short, long, default_value = "")]
        stdin: String,

        /// Expected output to compare against
        #[arg(short, long)]
        expected: Option<String>,

        /// Run once to capture stdout, then rerun with it as the expected output
        #[arg(long, default_value = "false")]
        use_actual: bool,

        /// Print the backend's raw create response instead of the normalized result
        #[arg(long, default_value = "false")]
        raw: bool,
    },

    /// Fetch and normalize a result by token
    Get {
        token: String,

        /// Omit source code from the output
        #[arg(long, default_value = "false")]
        no_source: bool,
    },

    /// Fetch and normalize several results, in the given order
    BatchGet {
        /// Tokens, space or comma separated
        #[arg(required = true, value_delimiter = ',')]
        tokens: Vec<String>,
    },

    /// List languages supported by the backend
    Languages,

    /// List backend statuses
    Statuses {
        /// Print the built-in status table instead of querying the backend
        #[arg(long, default_value = "false")]
        local: bool,
    },

    /// Separate program output from log lines in a captured stream
    Normalize {
        /// File to read (defaults to stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Compare an actual output against an expected one
    Compare {
        actual: String,
        expected: String,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit {
            file,
            language,
            stdin,
            expected,
            use_actual,
            raw,
        } => {
            commands::submit(&file, &language, stdin, expected, use_actual, raw).await?;
        }
        Commands::Get { token, no_source } => {
            commands::get(&token, no_source).await?;
        }
        Commands::BatchGet { tokens } => {
            commands::batch_get(tokens).await?;
        }
        Commands::Languages => {
            commands::languages().await?;
        }
        Commands::Statuses { local } => {
            commands::statuses(local).await?;
        }
        Commands::Normalize { file } => {
            commands::normalize(file.as_deref())?;
        }
        Commands::Compare { actual, expected } => {
            commands::compare(&actual, &expected)?;
        }
    }

    Ok(())
}
