//! Cards, face symbols and deck construction.
//!
//! A deck for `K` distinct symbols holds `2K` cards, each symbol exactly
//! twice, in an order produced by a Fisher–Yates pass over a seeded
//! ChaCha stream. The same seed always deals the same deck.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Face value printed on a card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new<S: Into<String>>(face: S) -> Self {
        Self(face.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(face: &str) -> Self {
        Self::new(face)
    }
}

impl From<String> for Symbol {
    fn from(face: String) -> Self {
        Self(face)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Position in the deck, `0..N`.
    pub id: usize,
    pub symbol: Symbol,
    pub matched: bool,
}

impl Card {
    pub fn new(id: usize, symbol: Symbol) -> Self {
        Self {
            id,
            symbol,
            matched: false,
        }
    }
}

/// Seeded random source used to deal decks.
#[derive(Clone, Debug)]
pub struct DeckRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl DeckRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed drawn from the thread RNG. The seed stays readable through
    /// [`DeckRng::seed`] so a deal can be reproduced.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// In-place Fisher–Yates shuffle; every permutation is equally likely.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}

/// Collapses repeated symbols, keeping first-seen order.
pub fn distinct_symbols<I>(symbols: I) -> Vec<Symbol>
where
    I: IntoIterator,
    I::Item: Into<Symbol>,
{
    let mut distinct: Vec<Symbol> = Vec::new();
    for symbol in symbols {
        let symbol = symbol.into();
        if !distinct.contains(&symbol) {
            distinct.push(symbol);
        }
    }
    distinct
}

/// Deals a shuffled deck holding every symbol twice.
pub fn deal(symbols: &[Symbol], rng: &mut DeckRng) -> Vec<Card> {
    let mut faces: Vec<Symbol> = symbols
        .iter()
        .flat_map(|symbol| [symbol.clone(), symbol.clone()])
        .collect();
    rng.shuffle(&mut faces);
    layout_to_cards(faces)
}

/// Turns a fixed face order into cards, or `None` when some symbol does
/// not appear exactly twice.
pub fn layout(faces: Vec<Symbol>) -> Option<Vec<Card>> {
    let mut counts: HashMap<&Symbol, usize> = HashMap::new();
    for face in &faces {
        *counts.entry(face).or_insert(0) += 1;
    }
    if counts.values().any(|&count| count != 2) {
        return None;
    }
    Some(layout_to_cards(faces))
}

fn layout_to_cards(faces: Vec<Symbol>) -> Vec<Card> {
    faces
        .into_iter()
        .enumerate()
        .map(|(id, symbol)| Card::new(id, symbol))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn symbols(faces: &[&str]) -> Vec<Symbol> {
        faces.iter().map(|&face| Symbol::from(face)).collect()
    }

    #[test]
    fn test_shuffle_follows_seeded_chacha() {
        let mut items: Vec<u32> = (0..20).collect();
        let mut expected = items.clone();

        DeckRng::new(99).shuffle(&mut items);
        expected.shuffle(&mut ChaCha8Rng::seed_from_u64(99));

        assert_eq!(items, expected);
    }

    #[test]
    fn test_same_seed_deals_same_deck() {
        let faces = symbols(&["A", "B", "C", "D"]);
        let first = deal(&faces, &mut DeckRng::new(7));
        let second = deal(&faces, &mut DeckRng::new(7));
        assert_eq!(first, second);
    }

    #[test]
    fn test_ids_are_positions() {
        let deck = deal(&symbols(&["A", "B", "C"]), &mut DeckRng::new(1));
        for (position, card) in deck.iter().enumerate() {
            assert_eq!(card.id, position);
            assert!(!card.matched);
        }
    }

    #[test]
    fn test_distinct_symbols_keeps_first_seen_order() {
        let distinct = distinct_symbols(["B", "A", "B", "C", "A"]);
        assert_eq!(distinct, symbols(&["B", "A", "C"]));
    }

    #[test]
    fn test_layout_rejects_unpaired_faces() {
        assert!(layout(symbols(&["A", "B", "A"])).is_none());
        assert!(layout(symbols(&["A", "A", "A", "A"])).is_none());
        assert!(layout(symbols(&["A", "B", "B", "A"])).is_some());
    }

    #[test]
    fn test_shuffle_reaches_every_position() {
        // Each of the 4 items should land in each slot at least once over many deals.
        let mut rng = DeckRng::new(99);
        let mut seen = [[false; 4]; 4];
        for _ in 0..500 {
            let mut items = [0usize, 1, 2, 3];
            rng.shuffle(&mut items);
            for (slot, &item) in items.iter().enumerate() {
                seen[item][slot] = true;
            }
        }
        assert!(seen.iter().all(|row| row.iter().all(|&hit| hit)));
    }

    proptest! {
        #[test]
        fn prop_every_symbol_dealt_twice(k in 1usize..24, seed in any::<u64>()) {
            let faces: Vec<Symbol> = (0..k).map(|i| Symbol::new(format!("s{}", i))).collect();
            let deck = deal(&faces, &mut DeckRng::new(seed));

            prop_assert_eq!(deck.len(), 2 * k);
            for face in &faces {
                let copies = deck.iter().filter(|card| &card.symbol == face).count();
                prop_assert_eq!(copies, 2);
            }
        }
    }
}
