//! Card locations
//!
//! Every card sits in exactly one location. Cards themselves never change and
//! are shared between clones; only the location table and the draw order are
//! copied.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CommandCard};
use crate::error::{GameError, Result};
use crate::geometry::PlayerPosition;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardLocation {
    Deck,
    BottomPlayerHand,
    TopPlayerHand,
    DiscardPile,
}

impl CardLocation {
    pub fn hand_of(position: PlayerPosition) -> Self {
        match position {
            PlayerPosition::Bottom => CardLocation::BottomPlayerHand,
            PlayerPosition::Top => CardLocation::TopPlayerHand,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Deck {
    /// Catalog, sorted by id
    cards: Arc<Vec<CommandCard>>,
    locations: FxHashMap<CardId, CardLocation>,
    /// Cards still in the deck; the last entry is drawn next
    draw_order: Vec<CardId>,
}

impl Deck {
    /// All cards start in the deck, drawn in id order. Duplicate ids keep the
    /// first card.
    pub fn new(mut cards: Vec<CommandCard>) -> Self {
        cards.sort_by_key(|c| c.id);
        cards.dedup_by_key(|c| c.id);

        let locations = cards.iter().map(|c| (c.id, CardLocation::Deck)).collect();
        let draw_order = cards.iter().rev().map(|c| c.id).collect();
        Self {
            cards: Arc::new(cards),
            locations,
            draw_order,
        }
    }

    pub fn card(&self, id: CardId) -> Result<&CommandCard> {
        self.cards
            .binary_search_by_key(&id, |c| c.id)
            .map(|i| &self.cards[i])
            .map_err(|_| GameError::CardNotFound(id))
    }

    pub fn location_of(&self, id: CardId) -> Result<CardLocation> {
        self.locations
            .get(&id)
            .copied()
            .ok_or(GameError::CardNotFound(id))
    }

    /// Cards at a location in id order
    pub fn cards_in(&self, location: CardLocation) -> Vec<&CommandCard> {
        self.cards
            .iter()
            .filter(|c| self.locations.get(&c.id) == Some(&location))
            .collect()
    }

    pub fn count_in(&self, location: CardLocation) -> usize {
        self.locations.values().filter(|&&l| l == location).count()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Move a card; a card returned to the deck goes to the bottom
    pub fn move_card(&mut self, id: CardId, to: CardLocation) -> Result<()> {
        let from = self.location_of(id)?;
        if from == to {
            return Ok(());
        }
        if from == CardLocation::Deck {
            self.draw_order.retain(|&c| c != id);
        }
        if to == CardLocation::Deck {
            self.draw_order.insert(0, id);
        }
        self.locations.insert(id, to);
        Ok(())
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.draw_order.shuffle(rng);
    }

    /// Draw the top card into `to`, refilling an empty deck from the discard
    /// pile first. `None` only when both are empty.
    pub fn draw(&mut self, to: CardLocation) -> Option<CardId> {
        if self.draw_order.is_empty() {
            self.refill_from_discards();
        }
        let id = self.draw_order.pop()?;
        self.locations.insert(id, to);
        Some(id)
    }

    fn refill_from_discards(&mut self) {
        let discards: Vec<CardId> = self
            .cards
            .iter()
            .map(|c| c.id)
            .filter(|id| self.locations.get(id) == Some(&CardLocation::DiscardPile))
            .collect();
        tracing::debug!(cards = discards.len(), "deck refilled from discard pile");
        for &id in discards.iter().rev() {
            self.locations.insert(id, CardLocation::Deck);
            self.draw_order.push(id);
        }
    }

    /// Exchange the two hands, used when the board is reversed
    pub fn swap_hands(&mut self) {
        for location in self.locations.values_mut() {
            *location = match *location {
                CardLocation::BottomPlayerHand => CardLocation::TopPlayerHand,
                CardLocation::TopPlayerHand => CardLocation::BottomPlayerHand,
                other => other,
            };
        }
    }
}
