use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bufferly-cli", version, about = "Bufferly CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a buffer pass: classify upcoming events and place buffers
    Run(commands::run::RunArgs),
    /// Run a cleanup pass: delete orphaned buffers
    Cleanup(commands::cleanup::CleanupArgs),
    /// Classify a single event (JSON) and print the decision
    Classify(commands::classify::ClassifyArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Authentication management for Google Calendar
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Cleanup(args) => commands::cleanup::run(args),
        Commands::Classify(args) => commands::classify::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
