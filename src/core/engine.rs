use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::deck::{self, DeckRng};
use crate::core::scoring::final_score;
use crate::core::{
    Card, EventLogger, Phase, RoundEvent, RoundEventHandler, RoundSnapshot, RoundState,
    RoundStatistics, Symbol,
};

/// Handle for the deferred un-flip of a mismatched pair.
///
/// Only honoured while the round that issued it is still current and the
/// pair is still face up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearTicket {
    pub generation: u64,
    pub pair: [usize; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectEvent {
    Flipped,
    MatchResolved,
    MismatchResolved(ClearTicket),
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundComplete {
    pub score: u32,
    pub elapsed_seconds: u32,
    pub move_count: u32,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOutcome {
    pub accepted: bool,
    pub event: SelectEvent,
    /// Set only on the selection that finished the round.
    pub completed: Option<RoundComplete>,
}

impl SelectOutcome {
    fn ignored() -> Self {
        Self {
            accepted: false,
            event: SelectEvent::Ignored,
            completed: None,
        }
    }

    fn accepted(event: SelectEvent) -> Self {
        Self {
            accepted: true,
            event,
            completed: None,
        }
    }
}

/// Owns one round at a time and applies every change to it.
///
/// All operations are total: invalid input is reported as
/// [`SelectEvent::Ignored`] and leaves the round untouched.
pub struct RoundEngine {
    state: RoundState,
    rng: DeckRng,
    completed: Option<RoundComplete>,
    event_log: EventLogger,
}

impl RoundEngine {
    pub fn new(rng: DeckRng) -> Self {
        Self {
            state: RoundState::idle(),
            rng,
            completed: None,
            event_log: EventLogger::default(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(DeckRng::new(seed))
    }

    /// Deals a fresh shuffled deck and starts the clock. Repeated symbols
    /// count once. An empty symbol set leaves the round idle.
    pub fn start<I>(&mut self, symbols: I) -> &RoundState
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        let symbols = deck::distinct_symbols(symbols);
        let cards = deck::deal(&symbols, &mut self.rng);
        self.begin(cards)
    }

    /// Same as [`RoundEngine::start`]; nothing carries over from the old round.
    pub fn restart<I>(&mut self, symbols: I) -> &RoundState
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        self.start(symbols)
    }

    /// Starts a round on a fixed deck order instead of a shuffled one.
    /// Returns `None`, leaving the current round alone, unless every face
    /// appears exactly twice.
    pub fn start_with_layout<I>(&mut self, faces: I) -> Option<&RoundState>
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        let cards = deck::layout(faces.into_iter().map(Into::into).collect())?;
        Some(self.begin(cards))
    }

    fn begin(&mut self, cards: Vec<Card>) -> &RoundState {
        let generation = self.state.generation + 1;
        let deck_size = cards.len();

        self.state = RoundState::new(cards, generation);
        self.completed = None;
        if deck_size > 0 {
            self.state.phase = Phase::InProgress;
        }

        info!(
            "Round {} started with {} cards (seed {})",
            generation,
            deck_size,
            self.rng.seed()
        );
        self.emit_event(RoundEvent::round_started(generation, deck_size, self.rng.seed()));

        &self.state
    }

    pub fn select_card(&mut self, card_id: usize) -> SelectOutcome {
        if self.state.phase != Phase::InProgress
            || card_id >= self.state.deck.len()
            || self.state.is_matched(card_id)
            || self.state.is_face_up(card_id)
            || self.state.flipped.len() >= 2
        {
            debug!("Ignored selection of card {}", card_id);
            return SelectOutcome::ignored();
        }

        let generation = self.state.generation;
        self.state.flipped.push(card_id);
        let symbol = self.state.deck[card_id].symbol.clone();
        self.emit_event(RoundEvent::card_flipped(generation, card_id, &symbol));

        if self.state.flipped.len() == 1 {
            return SelectOutcome::accepted(SelectEvent::Flipped);
        }

        self.state.move_count += 1;
        let pair = [self.state.flipped[0], self.state.flipped[1]];
        let move_count = self.state.move_count;

        if self.state.deck[pair[0]].symbol != self.state.deck[pair[1]].symbol {
            debug!("Cards {:?} do not match (move {})", pair, move_count);
            self.emit_event(RoundEvent::pair_mismatched(generation, pair, move_count));
            return SelectOutcome::accepted(SelectEvent::MismatchResolved(ClearTicket {
                generation,
                pair,
            }));
        }

        self.state.flipped.clear();
        for id in pair {
            self.state.matched.insert(id);
            self.state.deck[id].matched = true;
        }
        debug!("Cards {:?} matched (move {})", pair, move_count);
        self.emit_event(RoundEvent::pair_matched(generation, pair, move_count));

        let mut outcome = SelectOutcome::accepted(SelectEvent::MatchResolved);
        outcome.completed = self.complete_if_done();
        outcome
    }

    /// Turns a mismatched pair face down again. Returns `false` for a stale
    /// ticket: another round has started, or the pair is no longer up.
    pub fn clear_flipped(&mut self, ticket: ClearTicket) -> bool {
        if ticket.generation != self.state.generation || self.state.flipped != ticket.pair {
            debug!(
                "Dropped stale clear for {:?} (round {}, current {})",
                ticket.pair, ticket.generation, self.state.generation
            );
            return false;
        }

        self.state.flipped.clear();
        self.emit_event(RoundEvent::flip_cleared(ticket.generation, ticket.pair));
        true
    }

    /// Advances the round clock by one second while the round is running.
    pub fn tick(&mut self) -> u32 {
        if self.state.phase == Phase::InProgress {
            self.state.elapsed_seconds += 1;
        }
        self.state.elapsed_seconds
    }

    /// A round with no cards is never complete.
    pub fn is_complete(&self) -> bool {
        !self.state.deck.is_empty() && self.state.matched.len() == self.state.deck.len()
    }

    fn complete_if_done(&mut self) -> Option<RoundComplete> {
        if self.state.phase != Phase::InProgress || !self.is_complete() {
            return None;
        }

        self.state.phase = Phase::Complete;
        let result = RoundComplete {
            score: final_score(self.state.move_count, self.state.elapsed_seconds),
            elapsed_seconds: self.state.elapsed_seconds,
            move_count: self.state.move_count,
            generation: self.state.generation,
        };
        self.completed = Some(result);

        info!(
            "Round {} complete: score {} in {}s over {} moves",
            result.generation, result.score, result.elapsed_seconds, result.move_count
        );
        self.emit_event(RoundEvent::round_completed(
            result.generation,
            result.score,
            result.elapsed_seconds,
            result.move_count,
        ));

        Some(result)
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.state.snapshot()
    }

    pub fn statistics(&self) -> RoundStatistics {
        self.state.statistics()
    }

    /// Result of the current round once it has finished.
    pub fn completion(&self) -> Option<RoundComplete> {
        self.completed
    }

    pub fn event_log(&self) -> &EventLogger {
        &self.event_log
    }

    fn emit_event(&mut self, event: RoundEvent) {
        self.event_log.handle_event(&event);
    }
}

impl Default for RoundEngine {
    fn default() -> Self {
        Self::new(DeckRng::from_entropy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RoundEventType;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn engine_with(faces: &[&str]) -> RoundEngine {
        let mut engine = RoundEngine::with_seed(1);
        engine.start_with_layout(faces.iter().copied()).unwrap();
        engine
    }

    fn mismatch_ticket(outcome: SelectOutcome) -> ClearTicket {
        match outcome.event {
            SelectEvent::MismatchResolved(ticket) => ticket,
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = RoundEngine::with_seed(5);
        assert_eq!(engine.state().phase(), Phase::Idle);
        assert!(!engine.is_complete());
        assert!(engine.completion().is_none());
    }

    #[test]
    fn test_start_deals_two_of_each() {
        let mut engine = RoundEngine::with_seed(42);
        let state = engine.start(["A", "B", "C"]);

        assert_eq!(state.deck().len(), 6);
        assert_eq!(state.phase(), Phase::InProgress);
        assert_eq!(state.move_count(), 0);
        assert_eq!(state.elapsed_seconds(), 0);
        assert!(state.flipped_ids().is_empty());
        assert!(state.matched_ids().is_empty());
        for face in ["A", "B", "C"] {
            let copies = state.deck().iter().filter(|card| card.symbol.as_str() == face).count();
            assert_eq!(copies, 2);
        }
    }

    #[test]
    fn test_start_collapses_repeated_symbols() {
        let mut engine = RoundEngine::with_seed(42);
        assert_eq!(engine.start(["A", "A", "B"]).deck().len(), 4);
    }

    #[test]
    fn test_empty_symbol_set_stays_idle() {
        let mut engine = RoundEngine::with_seed(42);
        engine.start(Vec::<Symbol>::new());

        assert_eq!(engine.state().phase(), Phase::Idle);
        assert!(!engine.is_complete());
        assert_eq!(engine.select_card(0), SelectOutcome::ignored());
        assert_eq!(engine.tick(), 0);
    }

    #[test]
    fn test_documented_round() {
        let mut engine = engine_with(&["A", "B", "A", "B"]);

        assert_eq!(engine.select_card(0).event, SelectEvent::Flipped);
        let outcome = engine.select_card(1);
        let ticket = mismatch_ticket(outcome);
        assert!(outcome.accepted);
        assert_eq!(engine.state().move_count(), 1);
        assert_eq!(engine.state().flipped_ids(), &[0, 1]);

        assert!(engine.clear_flipped(ticket));
        assert!(engine.state().flipped_ids().is_empty());

        engine.tick();
        engine.tick();

        assert_eq!(engine.select_card(0).event, SelectEvent::Flipped);
        assert_eq!(engine.select_card(2).event, SelectEvent::MatchResolved);
        assert_eq!(engine.state().move_count(), 2);
        assert_eq!(engine.state().matched_ids().iter().copied().collect::<Vec<_>>(), vec![0, 2]);

        assert_eq!(engine.select_card(1).event, SelectEvent::Flipped);
        let last = engine.select_card(3);
        assert_eq!(last.event, SelectEvent::MatchResolved);
        assert_eq!(engine.state().move_count(), 3);
        assert_eq!(engine.state().matched_ids().len(), 4);
        assert!(engine.is_complete());
        assert_eq!(engine.state().phase(), Phase::Complete);

        let completed = last.completed.unwrap();
        assert_eq!(completed.score, 1000 - 15 - 2 * 2);
        assert_eq!(completed.elapsed_seconds, 2);
        assert_eq!(completed.move_count, 3);
        assert_eq!(engine.completion(), Some(completed));
    }

    #[test]
    fn test_invalid_selections_are_ignored() {
        let mut engine = engine_with(&["A", "B", "A", "B"]);
        engine.select_card(0);
        engine.select_card(2);
        let before = engine.snapshot();

        // out of range, already matched
        for card_id in [4, 99, 0, 2] {
            let outcome = engine.select_card(card_id);
            assert!(!outcome.accepted);
            assert_eq!(outcome.event, SelectEvent::Ignored);
        }
        assert_eq!(engine.snapshot(), before);

        // re-selecting a face-up card
        engine.select_card(1);
        let before = engine.snapshot();
        assert_eq!(engine.select_card(1).event, SelectEvent::Ignored);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_selection_blocked_while_pair_awaits_clear() {
        let mut engine = engine_with(&["A", "B", "C", "A", "B", "C"]);
        engine.select_card(0);
        let ticket = mismatch_ticket(engine.select_card(1));

        assert_eq!(engine.select_card(3).event, SelectEvent::Ignored);
        assert_eq!(engine.state().move_count(), 1);

        engine.clear_flipped(ticket);
        assert_eq!(engine.select_card(3).event, SelectEvent::Flipped);
    }

    #[test]
    fn test_move_count_only_counts_pairs() {
        let mut engine = engine_with(&["A", "A", "B", "B"]);
        engine.select_card(2);
        assert_eq!(engine.state().move_count(), 0);
        engine.select_card(3);
        assert_eq!(engine.state().move_count(), 1);
    }

    #[test]
    fn test_tick_frozen_after_completion() {
        let mut engine = engine_with(&["A", "A"]);
        assert_eq!(engine.tick(), 1);
        engine.select_card(1);
        assert!(engine.select_card(0).completed.is_some());

        assert_eq!(engine.state().phase(), Phase::Complete);
        assert_eq!(engine.tick(), 1);
        assert_eq!(engine.tick(), 1);
    }

    #[test]
    fn test_completion_reported_once() {
        let mut engine = engine_with(&["A", "A"]);
        engine.select_card(0);
        assert!(engine.select_card(1).completed.is_some());

        assert_eq!(engine.select_card(0), SelectOutcome::ignored());
        let completed_events = engine
            .event_log()
            .get_events_by_type(&RoundEventType::RoundCompleted);
        assert_eq!(completed_events.len(), 1);
    }

    #[test]
    fn test_restart_resets_round() {
        let mut engine = engine_with(&["A", "B", "A", "B"]);
        engine.select_card(0);
        engine.select_card(2);
        engine.tick();
        let old_generation = engine.state().generation();

        let state = engine.restart(["X", "Y"]);
        assert_eq!(state.move_count(), 0);
        assert!(state.matched_ids().is_empty());
        assert!(state.flipped_ids().is_empty());
        assert_eq!(state.elapsed_seconds(), 0);
        assert_eq!(state.phase(), Phase::InProgress);
        assert_eq!(state.generation(), old_generation + 1);
        assert!(engine.completion().is_none());
    }

    #[test]
    fn test_stale_clear_after_restart_is_noop() {
        let mut engine = engine_with(&["A", "B", "A", "B"]);
        engine.select_card(0);
        let ticket = mismatch_ticket(engine.select_card(1));

        engine.start_with_layout(["A", "B", "A", "B"]).unwrap();
        engine.select_card(0);
        engine.select_card(1);
        assert_eq!(engine.state().flipped_ids(), &[0, 1]);

        assert!(!engine.clear_flipped(ticket));
        assert_eq!(engine.state().flipped_ids(), &[0, 1]);
    }

    #[test]
    fn test_clear_applies_once() {
        let mut engine = engine_with(&["A", "B", "A", "B"]);
        engine.select_card(0);
        let ticket = mismatch_ticket(engine.select_card(1));

        assert!(engine.clear_flipped(ticket));
        assert!(!engine.clear_flipped(ticket));
    }

    #[test]
    fn test_rejected_layout_keeps_round() {
        let mut engine = engine_with(&["A", "A"]);
        assert!(engine.start_with_layout(["A", "B"]).is_none());
        assert_eq!(engine.state().deck().len(), 2);
        assert_eq!(engine.state().generation(), 1);
    }

    proptest! {
        #[test]
        fn prop_matched_never_reflipped(
            seed in any::<u64>(),
            picks in proptest::collection::vec(0usize..10, 0..80),
        ) {
            let mut engine = RoundEngine::with_seed(seed);
            engine.start(["A", "B", "C", "D", "E"]);

            for card_id in picks {
                let before = engine.state().move_count();
                let outcome = engine.select_card(card_id);
                if let SelectEvent::MismatchResolved(ticket) = outcome.event {
                    engine.clear_flipped(ticket);
                }

                let state = engine.state();
                prop_assert!(state.flipped_ids().len() <= 2);
                prop_assert!(state.flipped_ids().iter().all(|id| !state.is_matched(*id)));
                let expected = match outcome.event {
                    SelectEvent::MatchResolved | SelectEvent::MismatchResolved(_) => before + 1,
                    _ => before,
                };
                prop_assert_eq!(state.move_count(), expected);
                prop_assert_eq!(engine.is_complete(), state.phase() == Phase::Complete);
            }
        }
    }
}
