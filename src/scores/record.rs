use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::RoundComplete;
use crate::core::round_state::format_elapsed;

/// Result sent for storage when a round finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub player_name: String,
    pub score: u32,
    /// Seconds the round took.
    pub time: u32,
}

impl ScoreSubmission {
    pub fn new<S: Into<String>>(player_name: S, score: u32, time: u32) -> Self {
        Self {
            player_name: player_name.into(),
            score,
            time,
        }
    }

    pub fn from_round<S: Into<String>>(player_name: S, round: &RoundComplete) -> Self {
        Self::new(player_name, round.score, round.elapsed_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: Uuid,
    pub player_name: String,
    pub score: u32,
    pub time: u32,
    pub created_at: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn display_name(&self) -> String {
        format!(
            "{} - {} pts in {} ({})",
            self.player_name,
            self.score,
            format_elapsed(self.time),
            self.created_at.format("%Y-%m-%d %H:%M")
        )
    }
}
