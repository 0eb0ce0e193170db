use super::error::GameError;
use super::player::PlayerId;
use parking_lot::RwLock;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub games_played: u32,
    pub games_won: u32,
    /// Percentage of games won, 0 to 100.
    pub win_rate: f64,
}

impl PlayerStats {
    pub fn record(&mut self, won: bool) {
        self.games_played += 1;
        if won {
            self.games_won += 1;
        }
        self.win_rate = f64::from(self.games_won) / f64::from(self.games_played) * 100.0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: PlayerId,
    pub username: String,
    /// Seed the client feeds its avatar generator.
    pub avatar_seed: String,
    pub stats: PlayerStats,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl UserProfile {
    pub fn new(username: &str) -> Result<Self, GameError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(GameError::InvalidUsername);
        }

        let avatar_seed = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();

        Ok(Self {
            id: PlayerId::new(uuid::Uuid::new_v4().to_string()),
            username: username.to_string(),
            avatar_seed,
            stats: PlayerStats::default(),
            created_at: chrono::Utc::now(),
        })
    }
}

/// In-memory directory of registered players.
#[derive(Debug, Default)]
pub struct ProfileBook {
    profiles: RwLock<HashMap<PlayerId, UserProfile>>,
}

impl ProfileBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|profile| (profile.id.clone(), profile))
            .collect();
        Self {
            profiles: RwLock::new(profiles),
        }
    }

    /// Every profile, oldest first.
    pub fn all(&self) -> Vec<UserProfile> {
        let mut profiles: Vec<UserProfile> = self.profiles.read().values().cloned().collect();
        profiles.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        profiles
    }

    pub fn register(&self, username: &str) -> Result<UserProfile, GameError> {
        let profile = UserProfile::new(username)?;
        self.profiles
            .write()
            .insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    pub fn get(&self, id: &PlayerId) -> Result<UserProfile, GameError> {
        self.profiles
            .read()
            .get(id)
            .cloned()
            .ok_or(GameError::UnknownProfile)
    }

    /// Records a finished game for every registered participant.
    pub fn record_result<'a>(
        &self,
        participants: impl IntoIterator<Item = &'a PlayerId>,
        winner: Option<&PlayerId>,
    ) {
        let mut profiles = self.profiles.write();
        for id in participants {
            if let Some(profile) = profiles.get_mut(id) {
                profile.stats.record(Some(id) == winner);
            }
        }
    }
}
