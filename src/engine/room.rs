//! Room directory and per-room serialisation of game actions.
//!
//! Each room owns a mutex that admits one mutation at a time. When a
//! mutation commits, the room publishes an immutable snapshot; readers only
//! ever look at the latest snapshot and never wait behind a running action.
//! Persistence happens after the mutation lock has been released, behind a
//! separate save lock that drops any snapshot older than the last one written.

use super::card::{CardId, Color};
use super::error::GameError;
use super::game::{GameEvent, GameState};
use super::player::PlayerId;
use super::profile::{ProfileBook, UserProfile};
use super::session::{Member, RoomCode, RoomRecord, RoomStore, RoomSummary};
use super::turn::{Phase, MAX_PLAYERS, MIN_PLAYERS};
use log::{debug, error, info, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

const MIN_ROOM_NAME: usize = 3;

/// The committed state after an accepted action, and what happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applied {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    /// Room revision this action committed as.
    pub revision: u64,
}

struct Room {
    record: Mutex<RoomRecord>,
    published: RwLock<Arc<RoomRecord>>,
    /// Revision of the last snapshot written to the store.
    saved: Mutex<Option<u64>>,
}

impl Room {
    fn new(record: RoomRecord, saved: Option<u64>) -> Self {
        let published = Arc::new(record.clone());
        Self {
            record: Mutex::new(record),
            published: RwLock::new(published),
            saved: Mutex::new(saved),
        }
    }

    fn snapshot(&self) -> Arc<RoomRecord> {
        Arc::clone(&self.published.read())
    }

    /// Runs `f` under the room's mutation lock. `f` must leave the record
    /// untouched when it fails.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut RoomRecord) -> Result<T, GameError>,
    ) -> Result<(T, Arc<RoomRecord>), GameError> {
        let mut record = self.record.lock();
        let out = f(&mut record)?;
        record.revision += 1;
        record.last_updated = chrono::Utc::now();

        let snapshot = Arc::new(record.clone());
        *self.published.write() = Arc::clone(&snapshot);
        Ok((out, snapshot))
    }
}

/// Every room hosted by this process, plus the player profiles.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomCode, Arc<Room>>>,
    profiles: ProfileBook,
    /// Serialises writes of the profiles file.
    profiles_saved: Mutex<()>,
    store: Option<RoomStore>,
    seed: Option<u64>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    /// A registry that keeps rooms in memory only.
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            profiles: ProfileBook::new(),
            profiles_saved: Mutex::new(()),
            store: None,
            seed: None,
        }
    }

    /// A registry that writes every committed room and profile to `store`,
    /// starting from what is already saved there.
    pub fn with_store(store: RoomStore) -> std::io::Result<Self> {
        let mut rooms = HashMap::new();
        for code in store.list()? {
            match store.load(&code) {
                Ok(record) => {
                    let revision = record.revision;
                    rooms.insert(code, Arc::new(Room::new(record, Some(revision))));
                }
                Err(e) => warn!("Skipping unreadable room {}: {}", code, e),
            }
        }
        let profiles = store.load_profiles()?;
        info!(
            "Loaded {} rooms and {} profiles from {}",
            rooms.len(),
            profiles.len(),
            store.dir().display()
        );

        Ok(Self {
            rooms: RwLock::new(rooms),
            profiles: ProfileBook::from_profiles(profiles),
            profiles_saved: Mutex::new(()),
            store: Some(store),
            seed: None,
        })
    }

    /// Deals every game from `seed` instead of a random one.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn profiles(&self) -> &ProfileBook {
        &self.profiles
    }

    pub fn register(&self, username: &str) -> Result<UserProfile, GameError> {
        let profile = self.profiles.register(username)?;
        info!("Registered {} as {}", profile.username, profile.id);
        self.persist_profiles();
        Ok(profile)
    }

    pub fn create_room(
        &self,
        name: &str,
        max_players: usize,
        host_id: &PlayerId,
    ) -> Result<RoomSummary, GameError> {
        let name = name.trim();
        if name.chars().count() < MIN_ROOM_NAME {
            return Err(GameError::InvalidRoomName);
        }
        if max_players < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }
        if max_players > MAX_PLAYERS {
            return Err(GameError::TooManyPlayers);
        }
        let host = self.member(host_id)?;

        let (room, snapshot) = {
            let mut rooms = self.rooms.write();
            let mut rng = rand::rng();
            let code = loop {
                let code = RoomCode::generate(&mut rng);
                if !rooms.contains_key(&code) {
                    break code;
                }
            };

            let record = RoomRecord::new(code.clone(), name.to_string(), max_players, host);
            let room = Arc::new(Room::new(record, None));
            let snapshot = room.snapshot();
            rooms.insert(code, Arc::clone(&room));
            (room, snapshot)
        };

        info!("Created room {} ({})", snapshot.code, snapshot.name);
        self.persist(&room, &snapshot);
        Ok(snapshot.summary())
    }

    pub fn join_room(&self, code: &RoomCode, player_id: &PlayerId) -> Result<RoomSummary, GameError> {
        let member = self.member(player_id)?;
        let room = self.room(code)?;
        let ((), snapshot) = room.mutate(|record| {
            if record.member(&member.id).is_some() {
                return Ok(());
            }
            if record.status() == Phase::InProgress {
                return Err(GameError::GameAlreadyStarted);
            }
            if record.members.len() >= record.max_players {
                return Err(GameError::RoomFull);
            }
            record.members.push(member);
            Ok(())
        })?;

        info!("{} joined room {}", player_id, code);
        self.persist(&room, &snapshot);
        Ok(snapshot.summary())
    }

    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        let mut rooms: Vec<RoomSummary> = self
            .rooms
            .read()
            .values()
            .map(|room| room.snapshot().summary())
            .collect();
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.code.cmp(&b.code)));
        rooms
    }

    pub fn room_summary(&self, code: &RoomCode) -> Result<RoomSummary, GameError> {
        Ok(self.room(code)?.snapshot().summary())
    }

    pub fn close_room(&self, code: &RoomCode) -> Result<(), GameError> {
        self.rooms
            .write()
            .remove(code)
            .ok_or(GameError::UnknownRoom)?;

        info!("Closed room {}", code);
        if let Some(store) = &self.store {
            if let Err(e) = store.delete(code) {
                warn!("Failed to delete stored room {}: {}", code, e);
            }
        }
        Ok(())
    }

    /// Deals a new game to `ordered_player_ids`, who must all be members.
    /// An empty list seats every member in join order. A finished game is
    /// replaced by the new deal.
    pub fn start_game(
        &self,
        code: &RoomCode,
        ordered_player_ids: &[PlayerId],
    ) -> Result<GameState, GameError> {
        let seed = self.seed.unwrap_or_else(rand::random);

        let room = self.room(code)?;
        let (state, snapshot) = room.mutate(|record| {
            if record.status() == Phase::InProgress {
                return Err(GameError::GameAlreadyStarted);
            }

            let seats: Vec<(PlayerId, String)> = if ordered_player_ids.is_empty() {
                record
                    .members
                    .iter()
                    .map(|m| (m.id.clone(), m.username.clone()))
                    .collect()
            } else {
                ordered_player_ids
                    .iter()
                    .map(|id| {
                        record
                            .member(id)
                            .map(|m| (m.id.clone(), m.username.clone()))
                            .ok_or(GameError::UnknownPlayer)
                    })
                    .collect::<Result<Vec<_>, _>>()?
            };

            let game = GameState::start(seats, seed)?;
            record.game = Some(game.clone());
            Ok(game)
        })?;

        info!(
            "Started game in room {} with {} players",
            code,
            state.players.len()
        );
        self.persist(&room, &snapshot);
        Ok(state)
    }

    pub fn play_card(
        &self,
        code: &RoomCode,
        player_id: &PlayerId,
        card_id: CardId,
        chosen_color: Option<Color>,
    ) -> Result<Applied, GameError> {
        self.act(code, |game| game.play_card(player_id, card_id, chosen_color))
    }

    pub fn draw_card(&self, code: &RoomCode, player_id: &PlayerId) -> Result<Applied, GameError> {
        self.act(code, |game| game.draw_card(player_id))
    }

    /// Draw for whoever is to act; called when the host's turn timer expires.
    pub fn force_draw(&self, code: &RoomCode) -> Result<Applied, GameError> {
        self.act(code, GameState::force_draw)
    }

    /// Latest committed game state; never blocks on an in-flight action.
    pub fn get_state(&self, code: &RoomCode) -> Result<GameState, GameError> {
        self.room(code)?
            .snapshot()
            .game
            .clone()
            .ok_or(GameError::GameNotStarted)
    }

    fn act(
        &self,
        code: &RoomCode,
        action: impl FnOnce(&mut GameState) -> Result<Vec<GameEvent>, GameError>,
    ) -> Result<Applied, GameError> {
        let room = self.room(code)?;
        let (events, snapshot) = room.mutate(|record| {
            let game = record.game.as_mut().ok_or(GameError::GameNotStarted)?;
            action(game)
        })?;

        let state = snapshot.game.clone().ok_or(GameError::GameNotStarted)?;
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::PlayerWon { .. }))
        {
            info!("Game in room {} finished", code);
            self.profiles
                .record_result(state.players.iter().map(|p| &p.id), state.winner.as_ref());
            self.persist_profiles();
        }
        self.persist(&room, &snapshot);
        Ok(Applied {
            state,
            events,
            revision: snapshot.revision,
        })
    }

    fn room(&self, code: &RoomCode) -> Result<Arc<Room>, GameError> {
        self.rooms
            .read()
            .get(code)
            .cloned()
            .ok_or(GameError::UnknownRoom)
    }

    fn member(&self, id: &PlayerId) -> Result<Member, GameError> {
        let profile = self.profiles.get(id)?;
        Ok(Member {
            id: profile.id,
            username: profile.username,
        })
    }

    /// Writes `record` unless a newer revision of the room is already saved.
    fn persist(&self, room: &Room, record: &RoomRecord) {
        let Some(store) = &self.store else {
            return;
        };

        let mut saved = room.saved.lock();
        if saved.is_some_and(|revision| revision >= record.revision) {
            debug!(
                "Skipping stale save of room {} at revision {}",
                record.code, record.revision
            );
            return;
        }
        match store.save(record) {
            Ok(()) => *saved = Some(record.revision),
            Err(e) => error!("Failed to save room {}: {}", record.code, e),
        }
    }

    fn persist_profiles(&self) {
        let Some(store) = &self.store else {
            return;
        };

        // Read under the lock so the last writer always writes the newest book.
        let _guard = self.profiles_saved.lock();
        if let Err(e) = store.save_profiles(&self.profiles.all()) {
            error!("Failed to save profiles: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::card::CardKind;
    use crate::engine::rules;
    use std::thread;
    use tempfile::tempdir;

    fn registry() -> RoomRegistry {
        RoomRegistry::new().with_seed(Some(77))
    }

    fn lobby(registry: &RoomRegistry, names: &[&str]) -> (RoomCode, Vec<PlayerId>) {
        let ids: Vec<PlayerId> = names
            .iter()
            .map(|name| registry.register(name).unwrap().id)
            .collect();
        let room = registry.create_room("Test table", 10, &ids[0]).unwrap();
        for id in &ids[1..] {
            registry.join_room(&room.code, id).unwrap();
        }
        (room.code, ids)
    }

    /// Whatever the current player can legally do: play their first legal
    /// card, or draw.
    fn take_turn(registry: &RoomRegistry, code: &RoomCode) -> Result<Applied, GameError> {
        let state = registry.get_state(code)?;
        let player = state.current_player();
        let top = state.discard_top().copied().ok_or(GameError::GameNotStarted)?;
        let playable = player
            .hand
            .iter()
            .find(|c| rules::is_legal_play(c, &top, state.active_color));

        match playable {
            Some(card) => {
                let color = matches!(card.kind, CardKind::Wild | CardKind::WildDrawFour)
                    .then_some(Color::Red);
                registry.play_card(code, &player.id, card.id, color)
            }
            None => registry.draw_card(code, &player.id),
        }
    }

    #[test]
    fn test_create_room_validation() {
        let registry = registry();
        let host = registry.register("Host").unwrap().id;

        assert_eq!(
            registry.create_room("ab", 4, &host),
            Err(GameError::InvalidRoomName)
        );
        assert_eq!(
            registry.create_room("Table", 1, &host),
            Err(GameError::NotEnoughPlayers)
        );
        assert_eq!(
            registry.create_room("Table", 11, &host),
            Err(GameError::TooManyPlayers)
        );
        assert_eq!(
            registry.create_room("Table", 4, &PlayerId::new("ghost")),
            Err(GameError::UnknownProfile)
        );

        let room = registry.create_room("  Table  ", 4, &host).unwrap();
        assert_eq!(room.name, "Table");
        assert_eq!(room.members.len(), 1);
        assert_eq!(room.status, Phase::WaitingForPlayers);
        assert_eq!(registry.list_rooms(), vec![room]);
    }

    #[test]
    fn test_join_rules() {
        let registry = registry();
        let ids: Vec<PlayerId> = ["A", "B", "C"]
            .iter()
            .map(|n| registry.register(n).unwrap().id)
            .collect();
        let room = registry.create_room("Tiny", 2, &ids[0]).unwrap();

        registry.join_room(&room.code, &ids[1]).unwrap();
        // Joining twice is harmless.
        let summary = registry.join_room(&room.code, &ids[1]).unwrap();
        assert_eq!(summary.members.len(), 2);

        assert_eq!(
            registry.join_room(&room.code, &ids[2]),
            Err(GameError::RoomFull)
        );
        let missing = RoomCode::parse("ZZZZZZ").unwrap();
        assert_eq!(
            registry.join_room(&missing, &ids[2]),
            Err(GameError::UnknownRoom)
        );
    }

    #[test]
    fn test_start_game_seating() {
        let registry = registry();
        let (code, ids) = lobby(&registry, &["Alice", "Bob", "Carol", "Dave"]);

        let order = vec![ids[2].clone(), ids[0].clone(), ids[3].clone(), ids[1].clone()];
        let state = registry.start_game(&code, &order).unwrap();

        assert_eq!(state.players[0].username, "Carol");
        assert_eq!(state.deck.draw_pile().len(), 79);
        assert_eq!(registry.get_state(&code).unwrap(), state);
        assert_eq!(
            registry.room_summary(&code).unwrap().status,
            Phase::InProgress
        );
        assert_eq!(
            registry.start_game(&code, &[]),
            Err(GameError::GameAlreadyStarted)
        );
    }

    #[test]
    fn test_start_game_errors() {
        let registry = registry();
        let (code, ids) = lobby(&registry, &["Alice", "Bob"]);

        assert_eq!(
            registry.start_game(&code, &[ids[0].clone(), PlayerId::new("stranger")]),
            Err(GameError::UnknownPlayer)
        );
        assert_eq!(
            registry.start_game(&code, &[ids[0].clone()]),
            Err(GameError::NotEnoughPlayers)
        );
        assert_eq!(
            registry.start_game(&code, &[ids[0].clone(), ids[0].clone()]),
            Err(GameError::DuplicatePlayer)
        );
        assert_eq!(registry.get_state(&code), Err(GameError::GameNotStarted));

        let missing = RoomCode::parse("QQQQQQ").unwrap();
        assert_eq!(registry.get_state(&missing), Err(GameError::UnknownRoom));
        assert_eq!(
            registry.draw_card(&missing, &ids[0]),
            Err(GameError::UnknownRoom)
        );
    }

    #[test]
    fn test_rejected_action_keeps_snapshot() {
        let registry = registry();
        let (code, ids) = lobby(&registry, &["Alice", "Bob"]);
        registry.start_game(&code, &[]).unwrap();
        let before = registry.get_state(&code).unwrap();

        assert_eq!(
            registry.draw_card(&code, &ids[1]),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(registry.get_state(&code).unwrap(), before);

        let applied = registry.force_draw(&code).unwrap();
        assert_eq!(applied.state.turn.current(), 1);
        assert_eq!(registry.get_state(&code).unwrap(), applied.state);
    }

    #[test]
    fn test_full_game_updates_stats() {
        let registry = registry();
        let (code, ids) = lobby(&registry, &["Alice", "Bob", "Carol"]);
        registry.start_game(&code, &[]).unwrap();

        let mut finished = None;
        for _ in 0..5000 {
            match take_turn(&registry, &code) {
                Ok(applied) if applied.state.status() == Phase::RoundOver => {
                    finished = Some(applied.state);
                    break;
                }
                Ok(applied) => assert_eq!(applied.state.card_count(), 108),
                // Every card is in someone's hand; nobody can move.
                Err(GameError::DeckExhausted) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        if let Some(state) = finished {
            let winner = state.winner.clone().unwrap();
            assert!(state.player(&winner).unwrap().hand.is_empty());
            for id in &ids {
                let stats = registry.profiles().get(id).unwrap().stats;
                assert_eq!(stats.games_played, 1);
                assert_eq!(stats.games_won, u32::from(id == &winner));
            }
            assert_eq!(
                registry.draw_card(&code, &winner),
                Err(GameError::GameOver)
            );
        }
    }

    #[test]
    fn test_concurrent_rooms_and_readers() {
        let registry = Arc::new(registry());
        let codes: Vec<RoomCode> = (0..4)
            .map(|i| {
                let (code, _) = lobby(&registry, &[format!("A{i}").as_str(), format!("B{i}").as_str()]);
                registry.start_game(&code, &[]).unwrap();
                code
            })
            .collect();

        let handles: Vec<_> = codes
            .iter()
            .cloned()
            .map(|code| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..50 {
                        if take_turn(&registry, &code).is_err() {
                            break;
                        }
                        let state = registry.get_state(&code).unwrap();
                        assert_eq!(state.card_count(), 108);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        for code in &codes {
            assert_eq!(registry.get_state(code).unwrap().card_count(), 108);
        }
    }

    #[test]
    fn test_rooms_survive_restart() {
        let temp_dir = tempdir().unwrap();
        let store = RoomStore::new(temp_dir.path().to_path_buf()).unwrap();
        let registry = RoomRegistry::with_store(store.clone()).unwrap().with_seed(Some(1));
        let (code, _) = lobby(&registry, &["Alice", "Bob"]);
        let state = registry.start_game(&code, &[]).unwrap();
        registry.force_draw(&code).unwrap();
        let drawn = registry.get_state(&code).unwrap();
        assert_ne!(drawn, state);

        let reloaded = RoomRegistry::with_store(store.clone()).unwrap();
        assert_eq!(reloaded.get_state(&code).unwrap(), drawn);

        reloaded.close_room(&code).unwrap();
        assert!(store.list().unwrap().is_empty());
        assert_eq!(reloaded.close_room(&code), Err(GameError::UnknownRoom));
    }

    fn finish(registry: &RoomRegistry, code: &RoomCode) {
        registry
            .room(code)
            .unwrap()
            .mutate(|record| {
                record
                    .game
                    .as_mut()
                    .ok_or(GameError::GameNotStarted)?
                    .turn
                    .finish();
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_finished_game_can_be_redealt() {
        let registry = registry();
        let (code, _) = lobby(&registry, &["Alice", "Bob"]);
        registry.start_game(&code, &[]).unwrap();
        let carol = registry.register("Carol").unwrap().id;

        assert_eq!(
            registry.join_room(&code, &carol),
            Err(GameError::GameAlreadyStarted)
        );

        finish(&registry, &code);
        assert_eq!(registry.room_summary(&code).unwrap().status, Phase::RoundOver);

        registry.join_room(&code, &carol).unwrap();
        let state = registry.start_game(&code, &[]).unwrap();
        assert_eq!(state.players.len(), 3);
        assert_eq!(state.status(), Phase::InProgress);
        assert_eq!(registry.get_state(&code).unwrap(), state);
        assert_eq!(
            registry.start_game(&code, &[]),
            Err(GameError::GameAlreadyStarted)
        );
    }

    #[test]
    fn test_profiles_survive_restart() {
        let temp_dir = tempdir().unwrap();
        let store = RoomStore::new(temp_dir.path().to_path_buf()).unwrap();
        let registry = RoomRegistry::with_store(store.clone()).unwrap().with_seed(Some(3));
        let (code, ids) = lobby(&registry, &["Alice", "Bob"]);
        registry.start_game(&code, &[]).unwrap();

        let winner = ids[0].clone();
        registry
            .act(&code, |game| {
                game.turn.finish();
                game.winner = Some(winner.clone());
                Ok(vec![GameEvent::PlayerWon { player_id: winner }])
            })
            .unwrap();

        let reloaded = RoomRegistry::with_store(store).unwrap();
        let alice = reloaded.profiles().get(&ids[0]).unwrap();
        let bob = reloaded.profiles().get(&ids[1]).unwrap();
        assert_eq!(alice.username, "Alice");
        assert_eq!((alice.stats.games_played, alice.stats.games_won), (1, 1));
        assert_eq!((bob.stats.games_played, bob.stats.games_won), (1, 0));

        let room = reloaded.create_room("Rematch", 4, &ids[0]).unwrap();
        reloaded.join_room(&room.code, &ids[1]).unwrap();
        assert_eq!(reloaded.room_summary(&code).unwrap().members.len(), 2);
    }

    #[test]
    fn test_stale_snapshot_never_overwrites_newer_save() {
        let temp_dir = tempdir().unwrap();
        let store = RoomStore::new(temp_dir.path().to_path_buf()).unwrap();
        let registry = RoomRegistry::with_store(store.clone()).unwrap().with_seed(Some(8));
        let (code, _) = lobby(&registry, &["Alice", "Bob"]);
        registry.start_game(&code, &[]).unwrap();

        let room = registry.room(&code).unwrap();
        let force_draw = |record: &mut RoomRecord| {
            record
                .game
                .as_mut()
                .ok_or(GameError::GameNotStarted)?
                .force_draw()
        };
        let (_, older) = room.mutate(force_draw).unwrap();
        let (_, newer) = room.mutate(force_draw).unwrap();

        // Saves finishing in the opposite order to their commits.
        registry.persist(&room, &newer);
        registry.persist(&room, &older);

        let saved = store.load(&code).unwrap();
        assert_eq!(saved.revision, older.revision + 1);
        assert_eq!(saved, *newer);
    }

    #[test]
    fn test_concurrent_writers_on_one_room() {
        let registry = Arc::new(registry());
        let (code, _) = lobby(&registry, &["Alice", "Bob", "Carol"]);
        let start = registry.start_game(&code, &[]).unwrap();
        let start_revision = registry.room(&code).unwrap().snapshot().revision;

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                let code = code.clone();
                thread::spawn(move || {
                    let mut applied = Vec::new();
                    for _ in 0..40 {
                        let result = if i % 2 == 0 {
                            take_turn(&registry, &code)
                        } else {
                            registry.force_draw(&code)
                        };
                        match result {
                            Ok(a) => applied.push(a),
                            // Acted on a state another thread already moved past.
                            Err(GameError::NotYourTurn | GameError::IllegalPlay) => {}
                            Err(GameError::GameOver | GameError::DeckExhausted) => break,
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                    applied
                })
            })
            .collect();

        let mut applied: Vec<Applied> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        applied.sort_by_key(|a| a.revision);

        let revisions: Vec<u64> = applied.iter().map(|a| a.revision).collect();
        let expected: Vec<u64> = (1..=applied.len() as u64).map(|n| start_revision + n).collect();
        assert_eq!(revisions, expected);

        let mut previous = start;
        for a in &applied {
            let happened = |f: fn(&GameEvent) -> bool| a.events.iter().any(f);
            let mut turn = previous.turn.clone();
            if happened(|e| matches!(e, GameEvent::DirectionReversed { .. })) {
                turn.reverse();
            }
            if happened(|e| matches!(e, GameEvent::PlayerWon { .. })) {
                turn.finish();
            } else {
                let skipped = happened(|e| matches!(e, GameEvent::Skipped { .. }));
                turn.advance(if skipped { 2 } else { 1 });
            }

            assert_eq!(a.state.turn, turn, "revision {}", a.revision);
            assert_eq!(a.state.card_count(), 108);
            previous = a.state.clone();
        }
        assert_eq!(registry.get_state(&code).unwrap(), previous);
    }
}
