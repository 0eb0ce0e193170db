//! Play legality and card effects.

use super::card::{Card, CardKind, Color};
use super::error::GameError;
use super::player::Player;

/// What a played card does to the table once it lands on the discard pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    /// Color the next player has to match.
    pub active_color: Color,
    /// Whether the card flips the direction of play.
    pub reverse: bool,
    /// Cards the next player is forced to draw.
    pub penalty: usize,
    /// Seats the turn moves on by: 1 normally, 2 when the next player loses
    /// their turn.
    pub steps: usize,
}

impl Effect {
    pub fn skips_next(&self) -> bool {
        self.steps > 1
    }
}

/// A play is legal when the card matches the active color, matches the number
/// of a number card on top, matches the kind of an action card on top, or is
/// wild.
pub fn is_legal_play(card: &Card, discard_top: &Card, active_color: Color) -> bool {
    if card.is_wild() || card.color == active_color {
        return true;
    }

    match (card.kind, discard_top.kind) {
        (CardKind::Number(a), CardKind::Number(b)) => a == b,
        (played, top) => played == top,
    }
}

/// Works out the effect of playing `card` at a table of `player_count`.
///
/// Wild cards need `chosen_color` to be one of the four real colors; a color
/// supplied with any other card is ignored.
pub fn resolve_effect(
    card: &Card,
    chosen_color: Option<Color>,
    player_count: usize,
) -> Result<Effect, GameError> {
    let active_color = if card.is_wild() {
        match chosen_color {
            Some(color) if !color.is_wild() => color,
            _ => return Err(GameError::InvalidColorChoice),
        }
    } else {
        card.color
    };

    let mut effect = Effect {
        active_color,
        reverse: false,
        penalty: 0,
        steps: 1,
    };

    match card.kind {
        CardKind::Number(_) | CardKind::Wild => {}
        CardKind::Skip => effect.steps = 2,
        CardKind::Reverse => {
            effect.reverse = true;
            // Heads-up, a reverse hands the turn straight back.
            if player_count == 2 {
                effect.steps = 2;
            }
        }
        CardKind::DrawTwo => {
            effect.penalty = 2;
            effect.steps = 2;
        }
        CardKind::WildDrawFour => {
            effect.penalty = 4;
            effect.steps = 2;
        }
    }

    Ok(effect)
}

/// A player wins the moment their hand empties after a play.
pub fn check_win(player: &Player) -> bool {
    player.hand.is_empty()
}
