use bookshelf::cli as prog_cli;
use bookshelf::config::{ConfigLayer, load_config};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bookshelf", version, about = "Run the book collection operations against a document store", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML). If omitted, the default locations are searched.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Connection URI (e.g., mongodb://localhost:27017). Takes precedence over config/env.")]
    uri: Option<String>,
    #[arg(long, help = "Database name")]
    database: Option<String>,
    #[arg(long, help = "Collection name")]
    collection: Option<String>,
    #[arg(long, help = "Output mode: human|plain|json")]
    output: Option<String>,
    #[arg(long, help = "Log level: error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[arg(long, help = "Directory for rolling log files (app.log, ops.log)")]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "Fail the run when an update/delete does not affect exactly one document")]
    strict_counts: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Connect and run every operation in order (default)")]
    Run,
    #[command(about = "Insert the sample books into the collection")]
    Seed {
        #[arg(long, help = "Drop the collection before inserting")]
        reset: bool,
    },
    #[command(about = "List the operations without connecting")]
    Plan,
}

impl Cli {
    fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            uri: self.uri.clone(),
            database: self.database.clone(),
            collection: self.collection.clone(),
            output: self.output.clone(),
            log_level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
            log_config: None,
            strict_counts: self.strict_counts.then_some(true),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let cfg = match load_config(cli.layer(), cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = bookshelf::logger::init(&cfg) {
        eprintln!("warning: logging disabled: {e}");
    }

    let cmd = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => prog_cli::Command::Run,
        Commands::Seed { reset } => prog_cli::Command::Seed { reset },
        Commands::Plan => prog_cli::Command::Plan,
    };
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = prog_cli::run(&cfg, cmd, &mut stdout).await {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
