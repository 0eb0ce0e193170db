use super::error::GameError;
use super::game::{GameEvent, GameState};
use super::player::PlayerId;
use super::turn::Phase;
use super::ui::{Action, ConsoleUI};
use log::{info, warn};
use std::error::Error;
use std::io;

/// How a hot-seat game ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Won(PlayerId),
    /// No cards left anywhere to draw from.
    Stalemate,
    Quit,
}

/// Drives one game at a single terminal, passing it seat to seat.
pub struct GameController {
    game: GameState,
    ui: ConsoleUI,
}

impl GameController {
    /// Asks for player names and deals. Seats are numbered from 1.
    pub fn new(mut ui: ConsoleUI, seed: u64) -> Result<Self, Box<dyn Error>> {
        let names = ui.get_player_names()?;
        let seats = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (PlayerId::new((i + 1).to_string()), name))
            .collect();

        let game = GameState::start(seats, seed)?;
        info!("Hot-seat game started with seed {}", seed);
        Ok(GameController { game, ui })
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn run(&mut self) -> io::Result<Outcome> {
        self.ui.say("Welcome to Uno!")?;

        loop {
            let player = self.game.current_player().clone();
            self.ui
                .say(format!("\n=== Current Turn: {} ===", player.username))?;
            self.ui.display_game_state(&self.game)?;
            self.ui.display_player_hand(&player)?;

            let result = match self.ui.get_player_action()? {
                Some(Action::Play) => {
                    let Some(index) = self.ui.get_card_index(player.hand.len())? else {
                        continue;
                    };
                    let card = player.hand[index];
                    let color = if card.is_wild() {
                        Some(self.ui.choose_color()?)
                    } else {
                        None
                    };
                    self.game.play_card(&player.id, card.id, color)
                }
                Some(Action::Draw) => self.game.draw_card(&player.id),
                Some(Action::Quit) => return Ok(Outcome::Quit),
                None => continue,
            };

            match result {
                Ok(events) => {
                    for event in &events {
                        self.ui.handle_game_event(event, &self.game)?;
                    }
                    if self.game.status() == Phase::RoundOver {
                        if let Some(GameEvent::PlayerWon { player_id }) = events.last() {
                            return Ok(Outcome::Won(player_id.clone()));
                        }
                    }
                }
                Err(GameError::DeckExhausted) => {
                    warn!("Draw pile and discard pile are both empty");
                    self.ui
                        .say("There are no cards left to draw. The game ends without a winner.")?;
                    return Ok(Outcome::Stalemate);
                }
                Err(e) => {
                    self.ui.say(format!("Error: {}", e))?;
                    self.ui.say("Please try again.")?;
                }
            }
        }
    }
}
