use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::scores::{ScoreRecord, ScoreSubmission};
use crate::utils::{GameError, GameResult};

/// Stores one JSON file per submitted score and answers leaderboard queries.
pub struct ScoreBoard {
    scores_directory: PathBuf,
}

impl ScoreBoard {
    pub fn new<P: AsRef<Path>>(scores_directory: P) -> Self {
        Self {
            scores_directory: scores_directory.as_ref().to_path_buf(),
        }
    }

    pub async fn submit(&self, submission: ScoreSubmission) -> GameResult<ScoreRecord> {
        let player_name = submission.player_name.trim();
        if player_name.is_empty() {
            return Err(GameError::invalid_submission("Player name is required"));
        }

        info!("Submitting score {} for {}", submission.score, player_name);

        if !self.scores_directory.exists() {
            fs::create_dir_all(&self.scores_directory)
                .await
                .map_err(|e| GameError::score_board(format!("Failed to create scores directory: {}", e)))?;
        }

        let record = ScoreRecord {
            id: Uuid::new_v4(),
            player_name: player_name.to_string(),
            score: submission.score,
            time: submission.time,
            created_at: Utc::now(),
        };

        let record_path = self.get_record_path(&record.id);
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| GameError::score_board(format!("Failed to serialize score: {}", e)))?;

        fs::write(&record_path, json)
            .await
            .map_err(|e| GameError::score_board(format!("Failed to write score file: {}", e)))?;

        debug!("Score file written to: {:?}", record_path);
        Ok(record)
    }

    /// Best results first; equal scores keep submission order.
    pub async fn top_scores(&self, limit: usize) -> GameResult<Vec<ScoreRecord>> {
        let mut records = self.load_records().await?;
        records.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        records.truncate(limit);
        Ok(records)
    }

    pub async fn count(&self) -> GameResult<usize> {
        Ok(self.load_records().await?.len())
    }

    async fn load_records(&self) -> GameResult<Vec<ScoreRecord>> {
        debug!("Scanning for scores in: {:?}", self.scores_directory);

        if !self.scores_directory.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.scores_directory)
            .await
            .map_err(|e| GameError::score_board(format!("Failed to read scores directory: {}", e)))?;

        let mut records = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GameError::score_board(format!("Failed to read directory entry: {}", e)))?
        {
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                match self.load_record(&path).await {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        warn!("Skipping unreadable score file {:?}: {}", path, e);
                        continue;
                    }
                }
            }
        }

        Ok(records)
    }

    async fn load_record(&self, path: &Path) -> GameResult<ScoreRecord> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    fn get_record_path(&self, id: &Uuid) -> PathBuf {
        self.scores_directory.join(format!("{}.json", id))
    }
}
