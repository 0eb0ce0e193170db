use clap::Parser;
use log::{error, info};
use tracing_subscriber::EnvFilter;
use uno_rooms::config::{Cli, Command, PlayConfig};
use uno_rooms::engine::api::start_api_server;
use uno_rooms::engine::controller::{GameController, Outcome};
use uno_rooms::engine::ui::ConsoleUI;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let filter = cli.log_filter().to_string();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&filter)).init();

    // Request spans from tower-http go through tracing.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter)),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        error!("Failed to install tracing subscriber: {}", e);
    }

    match cli.command {
        Command::Serve(config) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(start_api_server(config))?;
        }
        Command::Play(config) => play(config)?,
    }
    Ok(())
}

fn play(config: PlayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let seed = config.seed.unwrap_or_else(rand::random);
    info!("Dealing with seed {}", seed);

    let mut controller = GameController::new(ConsoleUI::new(), seed)?;
    match controller.run()? {
        Outcome::Won(player_id) => info!("Seat {} won", player_id),
        Outcome::Stalemate => info!("Game ended without a winner"),
        Outcome::Quit => println!("Goodbye!"),
    }
    Ok(())
}
