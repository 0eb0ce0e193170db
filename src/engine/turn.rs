use super::error::GameError;
use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;

/// Represents the direction of play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Clockwise,
    Counterclockwise,
}

impl Direction {
    pub fn reverse(&self) -> Self {
        match self {
            Direction::Clockwise => Direction::Counterclockwise,
            Direction::Counterclockwise => Direction::Clockwise,
        }
    }
}

/// Lifecycle of a round, reported to clients as `waiting`, `playing` and
/// `finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "waiting")]
    WaitingForPlayers,
    #[serde(rename = "playing")]
    InProgress,
    #[serde(rename = "finished")]
    RoundOver,
}

/// Whose turn it is and which way play travels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnController {
    #[serde(rename = "status")]
    phase: Phase,
    #[serde(rename = "current_player")]
    current: usize,
    direction: Direction,
    player_count: usize,
}

impl Default for TurnController {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnController {
    pub fn new() -> Self {
        Self {
            phase: Phase::WaitingForPlayers,
            current: 0,
            direction: Direction::Clockwise,
            player_count: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// Moves from waiting to in progress with seat 0 to act.
    pub fn begin(&mut self, player_count: usize) -> Result<(), GameError> {
        if self.phase != Phase::WaitingForPlayers {
            return Err(GameError::GameAlreadyStarted);
        }
        if player_count < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }
        if player_count > MAX_PLAYERS {
            return Err(GameError::TooManyPlayers);
        }

        self.player_count = player_count;
        self.current = 0;
        self.phase = Phase::InProgress;
        Ok(())
    }

    pub fn ensure_in_progress(&self) -> Result<(), GameError> {
        match self.phase {
            Phase::WaitingForPlayers => Err(GameError::GameNotStarted),
            Phase::InProgress => Ok(()),
            Phase::RoundOver => Err(GameError::GameOver),
        }
    }

    /// Rejects any action from a seat other than the one to act.
    pub fn ensure_turn(&self, seat: usize) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        if seat != self.current {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    /// The seat `steps` places away from the current one in the direction of
    /// play.
    pub fn seat_after(&self, steps: usize) -> usize {
        let n = self.player_count.max(1);
        let steps = steps % n;
        match self.direction {
            Direction::Clockwise => (self.current + steps) % n,
            Direction::Counterclockwise => (self.current + n - steps) % n,
        }
    }

    pub fn advance(&mut self, steps: usize) {
        self.current = self.seat_after(steps);
    }

    /// Reverses the direction of play.
    pub fn reverse(&mut self) {
        self.direction = self.direction.reverse();
    }

    /// Freezes the round; no further turns are taken.
    pub fn finish(&mut self) {
        self.phase = Phase::RoundOver;
    }
}
