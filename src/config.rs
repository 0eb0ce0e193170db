use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "uno_rooms", version, about = "UNO rooms: game engine, HTTP host and local hot-seat table")]
pub struct Cli {
    /// Log filter, e.g. `info` or `uno_rooms=debug`. RUST_LOG wins when set.
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The server logs requests by default; the terminal table stays quiet.
    pub fn log_filter(&self) -> &str {
        match (&self.log, &self.command) {
            (Some(filter), _) => filter,
            (None, Command::Serve(_)) => "info",
            (None, Command::Play(_)) => "warn",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve rooms over HTTP
    Serve(ServerConfig),
    /// Play a hot-seat game in this terminal
    Play(PlayConfig),
}

#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// Directory for saved rooms
    #[arg(long, default_value = "rooms")]
    pub data_dir: PathBuf,

    /// Deal every game from this seed
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Args)]
pub struct PlayConfig {
    /// Shuffle seed; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,
}
