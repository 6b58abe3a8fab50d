mod commands;

use clap::{Parser, Subcommand};
use potshot_core::{format_coins, GameError};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "potshot")]
#[command(about = "Pay-to-play pot lottery")]
#[command(version)]
struct Cli {
    /// Data directory for game storage
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a fresh game owned by the given account
    Init {
        /// Owner account
        owner: String,
    },
    /// Take a shot at the pot
    Play {
        /// Player account
        player: String,
        /// Coins to attach (repeat plays must cover the fee)
        #[arg(short, long)]
        attach: Option<String>,
    },
    /// Show the current state of the game
    Status,
    /// Explain the active fee rule and the odds
    Explain,
    /// Check whether an account has played this round
    HasPlayed {
        /// Account to look up
        account: String,
    },
    /// Change the fee strategy (owner only)
    SetFee {
        /// Calling account
        caller: String,
        /// Strategy: free, flat, linear or quadratic
        strategy: String,
    },
    /// Change the win chance (owner only)
    SetChance {
        /// Calling account
        caller: String,
        /// Win chance in (0, 1]
        chance: f64,
    },
    /// Open a new round (owner only)
    Reset {
        /// Calling account
        caller: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "potshot={},potshot_core={}",
            log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("potshot")
    });

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    // Execute command
    let result = match cli.command {
        Commands::Init { owner } => commands::init(&data_dir, &owner),
        Commands::Play { player, attach } => {
            commands::play(&data_dir, &player, attach.as_deref()).await
        }
        Commands::Status => commands::status(&data_dir),
        Commands::Explain => commands::explain(&data_dir),
        Commands::HasPlayed { account } => commands::has_played(&data_dir, &account),
        Commands::SetFee { caller, strategy } => commands::set_fee(&data_dir, &caller, &strategy),
        Commands::SetChance { caller, chance } => {
            commands::set_chance(&data_dir, &caller, chance)
        }
        Commands::Reset { caller, force } => commands::reset(&data_dir, &caller, force),
    };

    if let Err(e) = result {
        match e {
            GameError::GameInactive { winner, pot } => {
                eprintln!(
                    "Error: the game is over, {} took the pot of {}",
                    winner,
                    format_coins(pot)
                );
                eprintln!("The owner can open a new round with 'potshot reset'");
            }
            GameError::InsufficientFee {
                players,
                required,
                attached,
            } => {
                eprintln!("Error: insufficient fee");
                eprintln!(
                    "With {} players in, a repeat play costs {} (attached: {})",
                    players,
                    format_coins(required),
                    format_coins(attached)
                );
            }
            GameError::Unauthorized { method, caller } => {
                eprintln!("Error: {} is not allowed to call {}", caller, method);
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
