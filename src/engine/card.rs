use super::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 108;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Wild,
}

impl Color {
    /// The colors a wild card may take.
    pub const CHOOSABLE: [Color; 4] = [Color::Red, Color::Green, Color::Blue, Color::Yellow];

    pub fn is_wild(self) -> bool {
        self == Color::Wild
    }
}

impl FromStr for Color {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "blue" => Ok(Color::Blue),
            "yellow" => Ok(Color::Yellow),
            "wild" => Ok(Color::Wild),
            _ => Err(GameError::InvalidColorChoice),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Wild => "wild",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CardKind {
    Number(u8),
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

impl CardKind {
    pub fn is_number(self) -> bool {
        matches!(self, CardKind::Number(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u8);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single physical card. Cards never change once minted; a wild card's
/// chosen color lives on the game state, not on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub color: Color,
    #[serde(flatten)]
    pub kind: CardKind,
}

impl Card {
    pub fn new(id: CardId, color: Color, kind: CardKind) -> Self {
        Self { id, color, kind }
    }

    pub fn is_wild(&self) -> bool {
        self.color.is_wild()
    }

    /// Number value, present only on number cards.
    pub fn value(&self) -> Option<u8> {
        match self.kind {
            CardKind::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Mints the full 108-card set in a fixed order with ids `0..108`.
    pub fn full_set() -> Vec<Card> {
        let mut kinds = Vec::with_capacity(DECK_SIZE);

        for color in Color::CHOOSABLE {
            kinds.push((color, CardKind::Number(0)));

            for number in 1..=9 {
                kinds.push((color, CardKind::Number(number)));
                kinds.push((color, CardKind::Number(number)));
            }

            for _ in 0..2 {
                kinds.push((color, CardKind::Skip));
                kinds.push((color, CardKind::Reverse));
                kinds.push((color, CardKind::DrawTwo));
            }
        }

        for _ in 0..4 {
            kinds.push((Color::Wild, CardKind::Wild));
            kinds.push((Color::Wild, CardKind::WildDrawFour));
        }

        kinds
            .into_iter()
            .enumerate()
            .map(|(id, (color, kind))| Card::new(CardId(id as u8), color, kind))
            .collect()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CardKind::Number(n) => write!(f, "{} {}", self.color, n),
            CardKind::Skip => write!(f, "{} skip", self.color),
            CardKind::Reverse => write!(f, "{} reverse", self.color),
            CardKind::DrawTwo => write!(f, "{} draw two", self.color),
            CardKind::Wild => write!(f, "wild"),
            CardKind::WildDrawFour => write!(f, "wild draw four"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_full_set_composition() {
        let cards = Card::full_set();
        assert_eq!(cards.len(), DECK_SIZE);

        let ids: HashSet<_> = cards.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), DECK_SIZE);

        let count = |kind: CardKind| cards.iter().filter(|c| c.kind == kind).count();
        assert_eq!(cards.iter().filter(|c| c.kind.is_number()).count(), 76);
        assert_eq!(count(CardKind::Number(0)), 4);
        assert_eq!(count(CardKind::Number(7)), 8);
        assert_eq!(count(CardKind::Skip), 8);
        assert_eq!(count(CardKind::Reverse), 8);
        assert_eq!(count(CardKind::DrawTwo), 8);
        assert_eq!(count(CardKind::Wild), 4);
        assert_eq!(count(CardKind::WildDrawFour), 4);
        assert!(cards.iter().all(|c| c.is_wild()
            == matches!(c.kind, CardKind::Wild | CardKind::WildDrawFour)));
    }

    #[test]
    fn test_value_only_on_numbers() {
        let five = Card::new(CardId(0), Color::Red, CardKind::Number(5));
        let skip = Card::new(CardId(1), Color::Red, CardKind::Skip);
        assert_eq!(five.value(), Some(5));
        assert_eq!(skip.value(), None);
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!("Blue".parse::<Color>(), Ok(Color::Blue));
        assert_eq!(" yellow ".parse::<Color>(), Ok(Color::Yellow));
        assert_eq!("wild".parse::<Color>(), Ok(Color::Wild));
        assert_eq!("purple".parse::<Color>(), Err(GameError::InvalidColorChoice));
    }

    #[test]
    fn test_card_json_shape() {
        let card = Card::new(CardId(7), Color::Green, CardKind::Number(3));
        let json = serde_json::to_value(card).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "color": "green", "type": "number", "value": 3})
        );

        let skip = Card::new(CardId(9), Color::Red, CardKind::Skip);
        let json = serde_json::to_value(skip).unwrap();
        assert_eq!(json, serde_json::json!({"id": 9, "color": "red", "type": "skip"}));

        let back: Card = serde_json::from_value(json).unwrap();
        assert_eq!(back, skip);
    }
}
