use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::core::Symbol;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundEvent {
    pub id: Uuid,
    pub event_type: RoundEventType,
    pub generation: u64,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEventType {
    RoundStarted,
    CardFlipped,
    PairMatched,
    PairMismatched,
    FlipCleared,
    RoundCompleted,
}

impl RoundEvent {
    pub fn new(event_type: RoundEventType, generation: u64, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            generation,
            timestamp: Utc::now(),
            data,
        }
    }

    pub fn round_started(generation: u64, deck_size: usize, seed: u64) -> Self {
        let data = serde_json::json!({
            "deck_size": deck_size,
            "seed": seed
        });
        Self::new(RoundEventType::RoundStarted, generation, data)
    }

    pub fn card_flipped(generation: u64, card_id: usize, symbol: &Symbol) -> Self {
        let data = serde_json::json!({
            "card_id": card_id,
            "symbol": symbol
        });
        Self::new(RoundEventType::CardFlipped, generation, data)
    }

    pub fn pair_matched(generation: u64, pair: [usize; 2], move_count: u32) -> Self {
        let data = serde_json::json!({
            "pair": pair,
            "move_count": move_count
        });
        Self::new(RoundEventType::PairMatched, generation, data)
    }

    pub fn pair_mismatched(generation: u64, pair: [usize; 2], move_count: u32) -> Self {
        let data = serde_json::json!({
            "pair": pair,
            "move_count": move_count
        });
        Self::new(RoundEventType::PairMismatched, generation, data)
    }

    pub fn flip_cleared(generation: u64, pair: [usize; 2]) -> Self {
        let data = serde_json::json!({ "pair": pair });
        Self::new(RoundEventType::FlipCleared, generation, data)
    }

    pub fn round_completed(generation: u64, score: u32, elapsed_seconds: u32, move_count: u32) -> Self {
        let data = serde_json::json!({
            "score": score,
            "elapsed_seconds": elapsed_seconds,
            "move_count": move_count
        });
        Self::new(RoundEventType::RoundCompleted, generation, data)
    }
}

pub trait RoundEventHandler {
    fn handle_event(&mut self, event: &RoundEvent);
}

/// Keeps the most recent events, dropping the oldest past `max_events`.
pub struct EventLogger {
    events: VecDeque<RoundEvent>,
    max_events: usize,
}

impl EventLogger {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::new(),
            max_events,
        }
    }

    pub fn get_events(&self) -> impl Iterator<Item = &RoundEvent> {
        self.events.iter()
    }

    pub fn get_events_by_type(&self, event_type: &RoundEventType) -> Vec<&RoundEvent> {
        self.events
            .iter()
            .filter(|event| &event.event_type == event_type)
            .collect()
    }

    pub fn get_recent_events(&self, count: usize) -> Vec<&RoundEvent> {
        self.events.iter().rev().take(count).collect()
    }

    pub fn export_events(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.events)
    }

    pub fn get_event_count(&self) -> usize {
        self.events.len()
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl RoundEventHandler for EventLogger {
    fn handle_event(&mut self, event: &RoundEvent) {
        self.events.push_back(event.clone());

        if self.events.len() > self.max_events {
            self.events.pop_front();
        }
    }
}
