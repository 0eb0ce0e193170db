use serde::{Deserialize, Serialize};

/// Every way an engine action can be rejected.
///
/// A rejected action never mutates the game or room it was aimed at, so the
/// caller can relay the error and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameError {
    NotYourTurn,
    IllegalPlay,
    InvalidColorChoice,
    NotEnoughPlayers,
    TooManyPlayers,
    DeckExhausted,
    InsufficientCards,
    UnknownRoom,
    CardNotInHand,
    UnknownPlayer,
    DuplicatePlayer,
    GameNotStarted,
    GameAlreadyStarted,
    GameOver,
    RoomFull,
    InvalidRoomName,
    InvalidUsername,
    UnknownProfile,
}

impl GameError {
    /// Stable machine-readable code for transports.
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::NotYourTurn => "not_your_turn",
            GameError::IllegalPlay => "illegal_play",
            GameError::InvalidColorChoice => "invalid_color_choice",
            GameError::NotEnoughPlayers => "not_enough_players",
            GameError::TooManyPlayers => "too_many_players",
            GameError::DeckExhausted => "deck_exhausted",
            GameError::InsufficientCards => "insufficient_cards",
            GameError::UnknownRoom => "unknown_room",
            GameError::CardNotInHand => "card_not_in_hand",
            GameError::UnknownPlayer => "unknown_player",
            GameError::DuplicatePlayer => "duplicate_player",
            GameError::GameNotStarted => "game_not_started",
            GameError::GameAlreadyStarted => "game_already_started",
            GameError::GameOver => "game_over",
            GameError::RoomFull => "room_full",
            GameError::InvalidRoomName => "invalid_room_name",
            GameError::InvalidUsername => "invalid_username",
            GameError::UnknownProfile => "unknown_profile",
        }
    }
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::NotYourTurn => write!(f, "Not your turn"),
            GameError::IllegalPlay => write!(f, "Card cannot be played on the current discard"),
            GameError::InvalidColorChoice => {
                write!(f, "Wild cards need one of red, green, blue or yellow")
            }
            GameError::NotEnoughPlayers => write!(f, "At least 2 players are required"),
            GameError::TooManyPlayers => write!(f, "At most 10 players are allowed"),
            GameError::DeckExhausted => write!(f, "No cards left to draw"),
            GameError::InsufficientCards => write!(f, "Not enough cards to deal"),
            GameError::UnknownRoom => write!(f, "Room not found"),
            GameError::CardNotInHand => write!(f, "Card not in hand"),
            GameError::UnknownPlayer => write!(f, "Player is not in this game"),
            GameError::DuplicatePlayer => write!(f, "Player listed more than once"),
            GameError::GameNotStarted => write!(f, "Game has not started"),
            GameError::GameAlreadyStarted => write!(f, "Game has already started"),
            GameError::GameOver => write!(f, "Game is already over"),
            GameError::RoomFull => write!(f, "Room is full"),
            GameError::InvalidRoomName => {
                write!(f, "Room name must be at least 3 characters long")
            }
            GameError::InvalidUsername => write!(f, "Username is required"),
            GameError::UnknownProfile => write!(f, "Profile not found"),
        }
    }
}

impl std::error::Error for GameError {}
