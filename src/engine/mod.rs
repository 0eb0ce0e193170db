pub mod api;
pub mod card;
pub mod controller;
pub mod deck;
pub mod error;
pub mod game;
pub mod player;
pub mod profile;
pub mod room;
pub mod rules;
pub mod session;
pub mod turn;
pub mod ui;

pub use card::{Card, CardId, CardKind, Color};
pub use deck::Deck;
pub use error::GameError;
pub use game::{GameEvent, GameState};
pub use player::{Player, PlayerId};
pub use room::{Applied, RoomRegistry};
pub use session::{RoomCode, RoomStore};
pub use turn::{Direction, Phase};
