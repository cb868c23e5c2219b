use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::{Card, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    InProgress,
    Complete,
}

/// One round of play. Only [`crate::core::RoundEngine`] mutates it; everyone
/// else reads it through the getters or a [`RoundSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    pub(crate) deck: Vec<Card>,
    /// Face-up, unmatched cards in selection order. At most two.
    pub(crate) flipped: Vec<usize>,
    pub(crate) matched: BTreeSet<usize>,
    pub(crate) move_count: u32,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) elapsed_seconds: u32,
    pub(crate) phase: Phase,
    pub(crate) generation: u64,
}

impl RoundState {
    /// A round that has not been dealt yet.
    pub fn idle() -> Self {
        Self::new(Vec::new(), 0)
    }

    pub(crate) fn new(deck: Vec<Card>, generation: u64) -> Self {
        Self {
            deck,
            flipped: Vec::with_capacity(2),
            matched: BTreeSet::new(),
            move_count: 0,
            started_at: Utc::now(),
            elapsed_seconds: 0,
            phase: Phase::Idle,
            generation,
        }
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn flipped_ids(&self) -> &[usize] {
        &self.flipped
    }

    pub fn matched_ids(&self) -> &BTreeSet<usize> {
        &self.matched
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pairs_total(&self) -> usize {
        self.deck.len() / 2
    }

    pub fn pairs_found(&self) -> usize {
        self.matched.len() / 2
    }

    pub fn is_face_up(&self, card_id: usize) -> bool {
        self.flipped.contains(&card_id)
    }

    pub fn is_matched(&self, card_id: usize) -> bool {
        self.matched.contains(&card_id)
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let cards = self
            .deck
            .iter()
            .map(|card| {
                let face = if self.is_matched(card.id) {
                    CardFace::Matched(card.symbol.clone())
                } else if self.is_face_up(card.id) {
                    CardFace::FaceUp(card.symbol.clone())
                } else {
                    CardFace::Hidden
                };
                CardView { id: card.id, face }
            })
            .collect();

        RoundSnapshot {
            cards,
            move_count: self.move_count,
            elapsed_seconds: self.elapsed_seconds,
            phase: self.phase,
            generation: self.generation,
            pairs_found: self.pairs_found(),
            pairs_total: self.pairs_total(),
        }
    }

    pub fn statistics(&self) -> RoundStatistics {
        RoundStatistics {
            move_count: self.move_count,
            elapsed_seconds: self.elapsed_seconds,
            pairs_found: self.pairs_found(),
            pairs_total: self.pairs_total(),
            started_at: self.started_at,
        }
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::idle()
    }
}

/// What the render layer may know about a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardFace {
    Hidden,
    FaceUp(Symbol),
    Matched(Symbol),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub id: usize,
    pub face: CardFace,
}

/// Read-only copy of a round, safe to hand to the render layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub cards: Vec<CardView>,
    pub move_count: u32,
    pub elapsed_seconds: u32,
    pub phase: Phase,
    pub generation: u64,
    pub pairs_found: usize,
    pub pairs_total: usize,
}

impl RoundSnapshot {
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn face_up_count(&self) -> usize {
        self.cards
            .iter()
            .filter(|card| matches!(card.face, CardFace::FaceUp(_)))
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundStatistics {
    pub move_count: u32,
    pub elapsed_seconds: u32,
    pub pairs_found: usize,
    pub pairs_total: usize,
    pub started_at: DateTime<Utc>,
}

impl RoundStatistics {
    pub fn get_elapsed_formatted(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }
}

pub fn format_elapsed(elapsed_seconds: u32) -> String {
    let hours = elapsed_seconds / 3600;
    let minutes = (elapsed_seconds % 3600) / 60;
    let seconds = elapsed_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
