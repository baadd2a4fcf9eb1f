use clap::{CommandFactory, Parser, Subcommand};
use meditation_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "meditation-cli", version, about = "Meditation timer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive timer session, reading commands from stdin
    Session(commands::session::SessionArgs),
    /// Read or change the settings file
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Logs go to stderr so stdout stays one JSON event per line.
fn init_tracing(fallback: &str) {
    let filter =
        EnvFilter::try_from_env("MEDITATION_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    // Only commands that use the settings file read (and create) it.
    let result = match cli.command {
        Commands::Session(args) => {
            let config = Config::load_or_default();
            init_tracing(&config.logging.filter);
            commands::session::run(args, &config)
        }
        Commands::Config { action } => {
            init_tracing(&Config::default().logging.filter);
            commands::config::run(action)
        }
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
