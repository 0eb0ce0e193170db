use super::card::Card;
use super::error::GameError;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Shuffles cards in place with a uniform Fisher-Yates permutation.
pub fn shuffle<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) {
    cards.shuffle(rng);
}

/// Result of a draw: the cards taken off the top, and how many discards had
/// to be recycled into the draw pile first.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawn {
    pub cards: Vec<Card>,
    pub recycled: usize,
}

/// Draw pile and discard pile. The top of each pile is its last element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub(crate) draw_pile: Vec<Card>,
    pub(crate) discard_pile: Vec<Card>,
}

impl Deck {
    pub fn new(draw_pile: Vec<Card>) -> Self {
        Self {
            draw_pile,
            discard_pile: Vec::new(),
        }
    }

    /// A fresh 108-card deck in shuffled order.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards = Card::full_set();
        shuffle(&mut cards, rng);
        Self::new(cards)
    }

    pub fn draw_pile(&self) -> &[Card] {
        &self.draw_pile
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    /// The face-up card that constrains the next play.
    pub fn top(&self) -> Option<&Card> {
        self.discard_pile.last()
    }

    /// Cards held by the deck, across both piles.
    pub fn len(&self) -> usize {
        self.draw_pile.len() + self.discard_pile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deals `hand_size` cards to each of `players` hands, one card at a time
    /// round the table.
    pub fn deal(&mut self, players: usize, hand_size: usize) -> Result<Vec<Vec<Card>>, GameError> {
        if self.draw_pile.len() < players * hand_size {
            return Err(GameError::InsufficientCards);
        }

        let mut hands = vec![Vec::with_capacity(hand_size); players];
        for _ in 0..hand_size {
            for hand in hands.iter_mut() {
                // Length was checked above.
                if let Some(card) = self.draw_pile.pop() {
                    hand.push(card);
                }
            }
        }
        Ok(hands)
    }

    /// Pops `n` cards off the draw pile. When the draw pile runs short, every
    /// discard except the top one is shuffled and slid underneath what is left
    /// of the draw pile before drawing continues.
    ///
    /// Fails with [`GameError::DeckExhausted`] without touching either pile
    /// if fewer than `n` cards exist outside the players' hands.
    pub fn draw<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) -> Result<Drawn, GameError> {
        let mut recycled = 0;

        if self.draw_pile.len() < n {
            let recyclable = self.discard_pile.len().saturating_sub(1);
            if self.draw_pile.len() + recyclable < n {
                return Err(GameError::DeckExhausted);
            }
            recycled = self.recycle_discards(rng);
        }

        let at = self.draw_pile.len() - n;
        let mut cards = self.draw_pile.split_off(at);
        // Top of the pile comes out first.
        cards.reverse();
        Ok(Drawn { cards, recycled })
    }

    /// Places `card` on top of the discard pile.
    pub fn discard(&mut self, card: Card) {
        self.discard_pile.push(card);
    }

    pub(crate) fn pop_top(&mut self) -> Option<Card> {
        self.draw_pile.pop()
    }

    pub(crate) fn put_bottom(&mut self, card: Card) {
        self.draw_pile.insert(0, card);
    }

    fn recycle_discards<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let Some(top) = self.discard_pile.pop() else {
            return 0;
        };

        let mut recycled = std::mem::replace(&mut self.discard_pile, vec![top]);
        shuffle(&mut recycled, rng);
        let count = recycled.len();

        recycled.append(&mut self.draw_pile);
        self.draw_pile = recycled;

        debug!("Recycled {} discards into the draw pile", count);
        count
    }
}
