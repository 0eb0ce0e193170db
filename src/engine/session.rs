use super::error::GameError;
use super::game::GameState;
use super::player::PlayerId;
use super::profile::UserProfile;
use super::turn::Phase;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PROFILES_FILE: &str = "profiles.json";

/// Six-character room code players type to join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..CODE_LEN)
            .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
            .collect();
        Self(code)
    }

    /// Normalises user input; any string that cannot be a code is an unknown
    /// room.
    pub fn parse(input: &str) -> Result<Self, GameError> {
        let code = input.trim().to_ascii_uppercase();
        if code.len() == CODE_LEN && code.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
            Ok(Self(code))
        } else {
            Err(GameError::UnknownRoom)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: PlayerId,
    pub username: String,
}

/// Everything known about one room: the lobby and, once started, the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub code: RoomCode,
    pub name: String,
    pub max_players: usize,
    pub host: PlayerId,
    pub members: Vec<Member>,
    pub game: Option<GameState>,
    /// Bumped on every committed change.
    #[serde(default)]
    pub revision: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl RoomRecord {
    pub fn new(code: RoomCode, name: String, max_players: usize, host: Member) -> Self {
        let now = chrono::Utc::now();
        Self {
            code,
            name,
            max_players,
            host: host.id.clone(),
            members: vec![host],
            game: None,
            revision: 0,
            created_at: now,
            last_updated: now,
        }
    }

    pub fn status(&self) -> Phase {
        self.game
            .as_ref()
            .map_or(Phase::WaitingForPlayers, GameState::status)
    }

    pub fn member(&self, id: &PlayerId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            code: self.code.clone(),
            name: self.name.clone(),
            max_players: self.max_players,
            host: self.host.clone(),
            members: self.members.clone(),
            status: self.status(),
            created_at: self.created_at,
        }
    }
}

/// Lobby view of a room, without hands or piles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub code: RoomCode,
    pub name: String,
    pub max_players: usize,
    pub host: PlayerId,
    pub members: Vec<Member>,
    pub status: Phase,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One JSON file per room under a directory, plus `profiles.json` for the
/// registered players.
#[derive(Debug, Clone)]
pub struct RoomStore {
    dir: PathBuf,
}

impl RoomStore {
    pub fn new(dir: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, code: &RoomCode) -> PathBuf {
        self.dir.join(format!("{}.json", code))
    }

    pub fn save(&self, record: &RoomRecord) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.path(&record.code), json)
    }

    pub fn load(&self, code: &RoomCode) -> std::io::Result<RoomRecord> {
        let json = fs::read_to_string(self.path(code))?;
        let record = serde_json::from_str(&json)?;
        Ok(record)
    }

    pub fn list(&self) -> std::io::Result<Vec<RoomCode>> {
        let mut codes = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(file_name) = entry.file_name().to_str() {
                if let Some(stem) = file_name.strip_suffix(".json") {
                    if let Ok(code) = RoomCode::parse(stem) {
                        codes.push(code);
                    }
                }
            }
        }
        codes.sort();
        Ok(codes)
    }

    pub fn delete(&self, code: &RoomCode) -> std::io::Result<()> {
        fs::remove_file(self.path(code))
    }

    pub fn save_profiles(&self, profiles: &[UserProfile]) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(profiles)?;
        fs::write(self.dir.join(PROFILES_FILE), json)
    }

    /// Saved profiles; none before the first registration.
    pub fn load_profiles(&self) -> std::io::Result<Vec<UserProfile>> {
        let json = match fs::read_to_string(self.dir.join(PROFILES_FILE)) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let profiles = serde_json::from_str(&json)?;
        Ok(profiles)
    }
}
