use super::card::{Card, CardId};
use super::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque player identity supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub hand: Vec<Card>,
    pub seat: usize,
}

impl Player {
    pub fn new(id: PlayerId, username: String, seat: usize) -> Self {
        Self {
            id,
            username,
            hand: Vec::new(),
            seat,
        }
    }

    /// Adds a card to the player's hand.
    pub fn add_card(&mut self, card: Card) {
        self.hand.push(card);
    }

    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        self.hand.iter().find(|c| c.id == card_id)
    }

    /// Removes the card with `card_id` from the hand.
    /// Returns `Err(GameError::CardNotInHand)` if the player does not hold it.
    pub fn remove_card(&mut self, card_id: CardId) -> Result<Card, GameError> {
        let index = self
            .hand
            .iter()
            .position(|c| c.id == card_id)
            .ok_or(GameError::CardNotInHand)?;
        Ok(self.hand.swap_remove(index))
    }
}

impl Extend<Card> for Player {
    fn extend<T: IntoIterator<Item = Card>>(&mut self, cards: T) {
        self.hand.extend(cards);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::card::{CardKind, Color};

    fn card(id: u8) -> Card {
        Card::new(CardId(id), Color::Red, CardKind::Number(id % 10))
    }

    #[test]
    fn test_remove_card_by_id() {
        let mut player = Player::new("p1".into(), "Alice".to_string(), 0);
        player.extend([card(1), card(2), card(3)]);

        let removed = player.remove_card(CardId(2)).unwrap();

        assert_eq!(removed.id, CardId(2));
        assert_eq!(player.hand.len(), 2);
        assert!(player.card(CardId(2)).is_none());
        assert!(player.card(CardId(3)).is_some());
    }

    #[test]
    fn test_remove_missing_card() {
        let mut player = Player::new("p1".into(), "Alice".to_string(), 0);
        player.add_card(card(1));

        assert_eq!(player.remove_card(CardId(9)), Err(GameError::CardNotInHand));
        assert_eq!(player.hand.len(), 1);
    }

    #[test]
    fn test_player_id_is_a_plain_string_on_the_wire() {
        let id = PlayerId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
