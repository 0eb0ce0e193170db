use super::card::{Card, CardId, Color};
use super::deck::Deck;
use super::error::GameError;
use super::player::{Player, PlayerId};
use super::rules::{self, Effect};
use super::turn::{Direction, Phase, TurnController};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

pub const HAND_SIZE: usize = 7;

const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Something that happened while an action was applied, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    CardPlayed {
        player_id: PlayerId,
        card: Card,
    },
    ColorChosen {
        player_id: PlayerId,
        color: Color,
    },
    DirectionReversed {
        direction: Direction,
    },
    PenaltyDrawn {
        player_id: PlayerId,
        cards: Vec<Card>,
    },
    Skipped {
        player_id: PlayerId,
    },
    CardDrawn {
        player_id: PlayerId,
        card: Card,
    },
    DeckReshuffled {
        cards: usize,
    },
    PlayerWon {
        player_id: PlayerId,
    },
}

/// The authoritative state of one round.
///
/// Every mutating method works on a copy and only commits when the whole
/// action succeeds, so a rejected action leaves the state exactly as it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<Player>,
    pub deck: Deck,
    pub active_color: Color,
    #[serde(flatten)]
    pub turn: TurnController,
    pub winner: Option<PlayerId>,
    seed: u64,
    reshuffles: u64,
}

impl GameState {
    /// Shuffles a fresh deck from `seed`, deals seven cards to each seat in
    /// the given order and turns up the first discard.
    ///
    /// An action or wild card turned up first goes to the bottom of the draw
    /// pile and the next card is turned, until a number card shows.
    pub fn start(seats: Vec<(PlayerId, String)>, seed: u64) -> Result<Self, GameError> {
        let mut turn = TurnController::new();
        turn.begin(seats.len())?;

        for (i, (id, _)) in seats.iter().enumerate() {
            if seats[..i].iter().any(|(other, _)| other == id) {
                return Err(GameError::DuplicatePlayer);
            }
        }

        let mut deck = Deck::shuffled(&mut StdRng::seed_from_u64(seed));
        let hands = deck.deal(seats.len(), HAND_SIZE)?;

        let players = seats
            .into_iter()
            .zip(hands)
            .enumerate()
            .map(|(seat, ((id, username), hand))| {
                let mut player = Player::new(id, username, seat);
                player.extend(hand);
                player
            })
            .collect::<Vec<_>>();

        let starter = turn_up_starter(&mut deck)?;
        info!(
            "Dealt {} hands, starting discard is {}",
            players.len(),
            starter
        );

        Ok(Self {
            players,
            deck,
            active_color: starter.color,
            turn,
            winner: None,
            seed,
            reshuffles: 0,
        })
    }

    pub fn status(&self) -> Phase {
        self.turn.phase()
    }

    pub fn direction(&self) -> Direction {
        self.turn.direction()
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.turn.current()]
    }

    pub fn discard_top(&self) -> Option<&Card> {
        self.deck.top()
    }

    pub fn player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == player_id)
    }

    /// Total cards across both piles and every hand; always the full deck.
    pub fn card_count(&self) -> usize {
        self.deck.len() + self.players.iter().map(|p| p.hand.len()).sum::<usize>()
    }

    /// Plays `card_id` from `player_id`'s hand.
    ///
    /// `chosen_color` is required for wild cards and ignored otherwise.
    pub fn play_card(
        &mut self,
        player_id: &PlayerId,
        card_id: CardId,
        chosen_color: Option<Color>,
    ) -> Result<Vec<GameEvent>, GameError> {
        let mut next = self.clone();
        let events = next.apply_play(player_id, card_id, chosen_color)?;
        *self = next;
        Ok(events)
    }

    /// Draws one card for `player_id` and passes the turn. The drawn card
    /// cannot be played until the player's next turn.
    pub fn draw_card(&mut self, player_id: &PlayerId) -> Result<Vec<GameEvent>, GameError> {
        let mut next = self.clone();
        let events = next.apply_draw(player_id)?;
        *self = next;
        Ok(events)
    }

    /// Draws on behalf of whoever is to act, for hosts whose turn timer ran
    /// out.
    pub fn force_draw(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.turn.ensure_in_progress()?;
        let player_id = self.current_player().id.clone();
        debug!("Forcing a draw for {}", player_id);
        self.draw_card(&player_id)
    }

    fn seat_of(&self, player_id: &PlayerId) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| &p.id == player_id)
            .ok_or(GameError::UnknownPlayer)
    }

    fn apply_play(
        &mut self,
        player_id: &PlayerId,
        card_id: CardId,
        chosen_color: Option<Color>,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.turn.ensure_in_progress()?;
        let seat = self.seat_of(player_id)?;
        self.turn.ensure_turn(seat)?;

        let card = *self.players[seat]
            .card(card_id)
            .ok_or(GameError::CardNotInHand)?;
        let top = *self.deck.top().ok_or(GameError::GameNotStarted)?;
        if !rules::is_legal_play(&card, &top, self.active_color) {
            return Err(GameError::IllegalPlay);
        }
        let effect = rules::resolve_effect(&card, chosen_color, self.players.len())?;

        let card = self.players[seat].remove_card(card_id)?;
        self.deck.discard(card);
        let mut events = vec![GameEvent::CardPlayed {
            player_id: player_id.clone(),
            card,
        }];

        self.apply_effect(seat, &card, &effect, &mut events)?;

        if rules::check_win(&self.players[seat]) {
            self.turn.finish();
            self.winner = Some(player_id.clone());
            info!("{} has won the round", player_id);
            events.push(GameEvent::PlayerWon {
                player_id: player_id.clone(),
            });
            return Ok(events);
        }

        self.turn.advance(effect.steps);
        Ok(events)
    }

    fn apply_effect(
        &mut self,
        seat: usize,
        card: &Card,
        effect: &Effect,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        self.active_color = effect.active_color;
        if card.is_wild() {
            events.push(GameEvent::ColorChosen {
                player_id: self.players[seat].id.clone(),
                color: effect.active_color,
            });
        }

        if effect.reverse {
            self.turn.reverse();
            events.push(GameEvent::DirectionReversed {
                direction: self.turn.direction(),
            });
        }

        let next = self.turn.seat_after(1);
        if effect.penalty > 0 {
            match self.draw_into(next, effect.penalty, events) {
                Ok(cards) => events.push(GameEvent::PenaltyDrawn {
                    player_id: self.players[next].id.clone(),
                    cards,
                }),
                // A last card still wins when the piles cannot cover its penalty.
                Err(GameError::DeckExhausted) if rules::check_win(&self.players[seat]) => {
                    debug!("No cards left for the penalty on a winning play");
                }
                Err(e) => return Err(e),
            }
        }

        if effect.skips_next() {
            events.push(GameEvent::Skipped {
                player_id: self.players[next].id.clone(),
            });
        }
        Ok(())
    }

    fn apply_draw(&mut self, player_id: &PlayerId) -> Result<Vec<GameEvent>, GameError> {
        self.turn.ensure_in_progress()?;
        let seat = self.seat_of(player_id)?;
        self.turn.ensure_turn(seat)?;

        let mut events = Vec::new();
        let cards = self.draw_into(seat, 1, &mut events)?;
        events.extend(cards.into_iter().map(|card| GameEvent::CardDrawn {
            player_id: player_id.clone(),
            card,
        }));

        self.turn.advance(1);
        Ok(events)
    }

    fn draw_into(
        &mut self,
        seat: usize,
        n: usize,
        events: &mut Vec<GameEvent>,
    ) -> Result<Vec<Card>, GameError> {
        let mut rng = self.reshuffle_rng();
        let drawn = self.deck.draw(n, &mut rng)?;
        if drawn.recycled > 0 {
            self.reshuffles += 1;
            events.push(GameEvent::DeckReshuffled {
                cards: drawn.recycled,
            });
        }

        self.players[seat].extend(drawn.cards.iter().copied());
        Ok(drawn.cards)
    }

    /// Each reshuffle gets its own stream so replays stay deterministic.
    fn reshuffle_rng(&self) -> StdRng {
        let stream = (self.reshuffles + 1).wrapping_mul(SEED_STRIDE);
        StdRng::seed_from_u64(self.seed.wrapping_add(stream))
    }
}

fn turn_up_starter(deck: &mut Deck) -> Result<Card, GameError> {
    if !deck.draw_pile().iter().any(|c| c.kind.is_number()) {
        return Err(GameError::InsufficientCards);
    }

    loop {
        let card = deck.pop_top().ok_or(GameError::InsufficientCards)?;
        if card.kind.is_number() {
            deck.discard(card);
            return Ok(card);
        }
        debug!("Returning {} to the bottom of the draw pile", card);
        deck.put_bottom(card);
    }
}
