use super::card::{Card, Color};
use super::game::{GameEvent, GameState};
use super::player::{Player, PlayerId};
use super::turn::{MAX_PLAYERS, MIN_PLAYERS};
use std::io::{self, BufRead, BufReader, Write};

/// What the seated player wants to do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Play,
    Draw,
    Quit,
}

pub struct ConsoleUI {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl Default for ConsoleUI {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleUI {
    pub fn new() -> Self {
        Self {
            input: Box::new(BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
        }
    }

    pub fn with_streams(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Self { input, output }
    }

    /// Prints `prompt` and reads one trimmed line. Running out of input is an
    /// error so a closed terminal ends the game instead of spinning.
    fn prompt(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    pub fn say(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    pub fn get_player_names(&mut self) -> io::Result<Vec<String>> {
        let mut player_names = Vec::new();
        loop {
            let name = self.prompt("Enter player name (or '.' to finish): ")?;

            if name == "." {
                if player_names.len() < MIN_PLAYERS {
                    writeln!(
                        self.output,
                        "You need at least {} players to start the game.",
                        MIN_PLAYERS
                    )?;
                    continue;
                }
                break;
            }
            if name.is_empty() {
                continue;
            }

            player_names.push(name);
            if player_names.len() == MAX_PLAYERS {
                writeln!(self.output, "The table is full.")?;
                break;
            }
        }
        Ok(player_names)
    }

    pub fn display_game_state(&mut self, game: &GameState) -> io::Result<()> {
        writeln!(self.output, "\n--- Game State ---")?;
        writeln!(self.output, "Direction: {:?}", game.direction())?;
        if let Some(top) = game.discard_top() {
            writeln!(self.output, "Discard Pile Top Card: {}", top)?;
        }
        writeln!(self.output, "Active Color: {}", game.active_color)?;
        writeln!(self.output, "Deck Cards Remaining: {}", game.deck.draw_pile().len())?;
        for player in &game.players {
            writeln!(self.output, "  {}: {} cards", player.username, player.hand.len())?;
        }
        Ok(())
    }

    pub fn display_player_hand(&mut self, player: &Player) -> io::Result<()> {
        writeln!(self.output, "\nPlayer {}'s hand:", player.username)?;
        for (i, card) in player.hand.iter().enumerate() {
            writeln!(self.output, "{}. {}", i, card)?;
        }
        Ok(())
    }

    pub fn get_player_action(&mut self) -> io::Result<Option<Action>> {
        writeln!(self.output, "\nWhat would you like to do?")?;
        writeln!(self.output, "1. Play a card")?;
        writeln!(self.output, "2. Draw a card")?;
        writeln!(self.output, "q. Quit")?;

        let action = match self.prompt("Enter your choice: ")?.as_str() {
            "1" => Some(Action::Play),
            "2" => Some(Action::Draw),
            "q" | "Q" => Some(Action::Quit),
            _ => {
                writeln!(self.output, "Invalid choice. Please enter 1, 2 or q.")?;
                None
            }
        };
        Ok(action)
    }

    /// Asks for a hand position. `Ok(None)` means the answer was not a
    /// position in the hand.
    pub fn get_card_index(&mut self, hand_len: usize) -> io::Result<Option<usize>> {
        let answer = self.prompt("Enter the index of the card you want to play: ")?;
        match answer.parse::<usize>() {
            Ok(index) if index < hand_len => Ok(Some(index)),
            Ok(_) => {
                writeln!(self.output, "There is no card at that index.")?;
                Ok(None)
            }
            Err(_) => {
                writeln!(self.output, "Invalid input. Please enter a number.")?;
                Ok(None)
            }
        }
    }

    pub fn choose_color(&mut self) -> io::Result<Color> {
        loop {
            writeln!(self.output, "Choose a color:")?;
            for (i, color) in Color::CHOOSABLE.iter().enumerate() {
                writeln!(self.output, "{}. {}", i + 1, color)?;
            }

            let choice = self.prompt("Enter your choice: ")?;
            match choice.parse::<usize>() {
                Ok(n) if (1..=Color::CHOOSABLE.len()).contains(&n) => {
                    return Ok(Color::CHOOSABLE[n - 1])
                }
                _ => writeln!(self.output, "Invalid choice. Please enter 1, 2, 3, or 4.")?,
            }
        }
    }

    pub fn handle_game_event(&mut self, event: &GameEvent, game: &GameState) -> io::Result<()> {
        let name = |id: &PlayerId| {
            game.player(id)
                .map_or_else(|| id.to_string(), |p| p.username.clone())
        };

        match event {
            GameEvent::CardPlayed { player_id, card } => {
                writeln!(self.output, "Player {} played {}", name(player_id), card)
            }
            GameEvent::ColorChosen { player_id, color } => {
                writeln!(self.output, "Player {} chose color {}", name(player_id), color)
            }
            GameEvent::DirectionReversed { direction } => {
                writeln!(self.output, "Direction reversed! Now {:?}.", direction)
            }
            GameEvent::PenaltyDrawn { player_id, cards } => writeln!(
                self.output,
                "Player {} draws {} cards: {}",
                name(player_id),
                cards.len(),
                list(cards)
            ),
            GameEvent::Skipped { player_id } => {
                writeln!(self.output, "Player {} is skipped!", name(player_id))
            }
            GameEvent::CardDrawn { player_id, card } => {
                writeln!(self.output, "Player {} drew {}", name(player_id), card)
            }
            GameEvent::DeckReshuffled { cards } => {
                writeln!(self.output, "The discard pile was shuffled back in ({} cards).", cards)
            }
            GameEvent::PlayerWon { player_id } => {
                writeln!(self.output, "Player {} has won the game!", name(player_id))
            }
        }
    }
}

fn list(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
