//! Command cards and orderable-set generation
//!
//! A card authorises ordering through a list of slots. Each slot accepts
//! units standing in any of its sections (from the playing player's side of
//! the board) up to a limit. An orderable set is a combination of units that
//! can all be ordered at once, with every unit claimed by exactly one slot
//! and no slot left with room for an unclaimed eligible unit.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{BoardGeometry, PlayerPosition, Section};
use crate::unit::SituatedUnit;

/// Command card identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many units a slot accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Limit {
    UpTo(u32),
    All,
}

impl Limit {
    fn has_room(self, filled: u32) -> bool {
        match self {
            Limit::UpTo(n) => filled < n,
            Limit::All => true,
        }
    }
}

/// One ordering constraint of a card
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub sections: Vec<Section>,
    pub limit: Limit,
}

impl Slot {
    pub fn new(section: Section, limit: Limit) -> Self {
        Self {
            sections: vec![section],
            limit,
        }
    }

    /// A slot accepting units anywhere on the board
    pub fn anywhere(limit: Limit) -> Self {
        Self {
            sections: Section::ALL.to_vec(),
            limit,
        }
    }

    fn admits(&self, unit: &SituatedUnit, position: PlayerPosition) -> bool {
        let geometry = BoardGeometry::get();
        self.sections
            .iter()
            .any(|&s| geometry.is_hex_in_section(unit.coord, s, position))
    }
}

/// The ordering constraints of a card
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderRule {
    pub slots: Vec<Slot>,
}

impl OrderRule {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// Every maximal combination of `units` this rule lets the player at
    /// `position` order together. Empty when no unit qualifies.
    pub fn orderable_sets(
        &self,
        units: &[SituatedUnit],
        position: PlayerPosition,
    ) -> BTreeSet<BTreeSet<SituatedUnit>> {
        let mut candidates: Vec<Candidate<'_>> = units
            .iter()
            .map(|unit| Candidate {
                unit,
                slots: (0..self.slots.len())
                    .filter(|&i| self.slots[i].admits(unit, position))
                    .collect(),
            })
            .filter(|c| !c.slots.is_empty())
            .collect();
        candidates.sort_by_key(|c| c.unit.id());

        let mut search = Search {
            rule: self,
            candidates: &candidates,
            claimed: vec![None; candidates.len()],
            filled: vec![0; self.slots.len()],
            found: BTreeSet::new(),
        };
        search.assign(0);

        // A straddler claimed by the wrong slot can strand a unit another
        // assignment would have ordered
        let found = search.found;
        found
            .iter()
            .filter(|set| !found.iter().any(|other| other.len() > set.len() && set.is_subset(other)))
            .cloned()
            .collect()
    }
}

struct Candidate<'a> {
    unit: &'a SituatedUnit,
    /// Indices of the slots that accept this unit
    slots: Vec<usize>,
}

/// Backtracking over slot claims
struct Search<'r, 'c, 'u> {
    rule: &'r OrderRule,
    candidates: &'c [Candidate<'u>],
    claimed: Vec<Option<usize>>,
    filled: Vec<u32>,
    found: BTreeSet<BTreeSet<SituatedUnit>>,
}

impl Search<'_, '_, '_> {
    fn assign(&mut self, next: usize) {
        if next == self.candidates.len() {
            self.record();
            return;
        }

        let candidate = &self.candidates[next];
        for &slot in &candidate.slots {
            if self.rule.slots[slot].limit.has_room(self.filled[slot]) {
                self.filled[slot] += 1;
                self.claimed[next] = Some(slot);
                self.assign(next + 1);
                self.claimed[next] = None;
                self.filled[slot] -= 1;
            }
        }

        // An unclaimed unit eligible for an unlimited slot can never be maximal
        let must_claim = candidate
            .slots
            .iter()
            .any(|&s| self.rule.slots[s].limit == Limit::All);
        if !must_claim {
            self.assign(next + 1);
        }
    }

    fn record(&mut self) {
        let maximal = self
            .candidates
            .iter()
            .zip(&self.claimed)
            .filter(|(_, claim)| claim.is_none())
            .all(|(c, _)| {
                c.slots
                    .iter()
                    .all(|&s| !self.rule.slots[s].limit.has_room(self.filled[s]))
            });
        if !maximal {
            return;
        }

        let set: BTreeSet<SituatedUnit> = self
            .candidates
            .iter()
            .zip(&self.claimed)
            .filter(|(_, claim)| claim.is_some())
            .map(|(c, _)| c.unit.clone())
            .collect();
        if !set.is_empty() {
            self.found.insert(set);
        }
    }
}

/// A command card
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandCard {
    pub id: CardId,
    pub name: String,
    pub rule: OrderRule,
}

impl CommandCard {
    pub fn new(id: CardId, name: impl Into<String>, rule: OrderRule) -> Self {
        Self {
            id,
            name: name.into(),
            rule,
        }
    }

    pub fn orderable_sets(
        &self,
        units: &[SituatedUnit],
        position: PlayerPosition,
    ) -> BTreeSet<BTreeSet<SituatedUnit>> {
        self.rule.orderable_sets(units, position)
    }
}

// ============================================================================
// CATALOG
// ============================================================================

fn section_name(section: Section) -> &'static str {
    match section {
        Section::Left => "Left",
        Section::Center => "Center",
        Section::Right => "Right",
    }
}

/// Order one unit in a section
pub fn recon(id: CardId, section: Section) -> CommandCard {
    section_card(id, "Recon", section, Limit::UpTo(1))
}

/// Order two units in a section
pub fn probe(id: CardId, section: Section) -> CommandCard {
    section_card(id, "Probe", section, Limit::UpTo(2))
}

/// Order three units in a section
pub fn attack(id: CardId, section: Section) -> CommandCard {
    section_card(id, "Attack", section, Limit::UpTo(3))
}

/// Order every unit in a section
pub fn assault(id: CardId, section: Section) -> CommandCard {
    section_card(id, "Assault", section, Limit::All)
}

fn section_card(id: CardId, title: &str, section: Section, limit: Limit) -> CommandCard {
    CommandCard::new(
        id,
        format!("{} {}", title, section_name(section)),
        OrderRule::new(vec![Slot::new(section, limit)]),
    )
}

/// Order one unit in each section
pub fn recon_in_force(id: CardId) -> CommandCard {
    per_section(id, "Recon in Force", 1)
}

/// Order two units in each section
pub fn general_advance(id: CardId) -> CommandCard {
    per_section(id, "General Advance", 2)
}

fn per_section(id: CardId, name: &str, count: u32) -> CommandCard {
    let slots = Section::ALL
        .into_iter()
        .map(|s| Slot::new(s, Limit::UpTo(count)))
        .collect();
    CommandCard::new(id, name, OrderRule::new(slots))
}

/// Order two units on each flank
pub fn pincer_move(id: CardId) -> CommandCard {
    CommandCard::new(
        id,
        "Pincer Move",
        OrderRule::new(vec![
            Slot::new(Section::Left, Limit::UpTo(2)),
            Slot::new(Section::Right, Limit::UpTo(2)),
        ]),
    )
}

/// Build a card from its catalog name
pub fn card_by_name(id: CardId, name: &str) -> Option<CommandCard> {
    if let Some((title, section)) = name.rsplit_once(' ') {
        let section = match section {
            "Left" => Some(Section::Left),
            "Center" => Some(Section::Center),
            "Right" => Some(Section::Right),
            _ => None,
        };
        if let Some(section) = section {
            match title {
                "Recon" => return Some(recon(id, section)),
                "Probe" => return Some(probe(id, section)),
                "Attack" => return Some(attack(id, section)),
                "Assault" => return Some(assault(id, section)),
                _ => {}
            }
        }
    }

    match name {
        "Recon in Force" => Some(recon_in_force(id)),
        "General Advance" => Some(general_advance(id)),
        "Pincer Move" => Some(pincer_move(id)),
        _ => None,
    }
}

/// Card names and counts of the standard 40-card deck
pub const STANDARD_DECK: [(&str, u32); 15] = [
    ("Recon Left", 2),
    ("Recon Center", 4),
    ("Recon Right", 2),
    ("Probe Left", 4),
    ("Probe Center", 5),
    ("Probe Right", 4),
    ("Attack Left", 3),
    ("Attack Center", 4),
    ("Attack Right", 3),
    ("Assault Left", 2),
    ("Assault Center", 2),
    ("Assault Right", 2),
    ("Recon in Force", 1),
    ("General Advance", 1),
    ("Pincer Move", 1),
];

/// The standard deck with ids numbered from 0 in catalog order
pub fn standard_deck() -> Vec<CommandCard> {
    let mut cards = Vec::with_capacity(40);
    for (name, count) in STANDARD_DECK {
        for _ in 0..count {
            let id = CardId(cards.len() as u32);
            if let Some(card) = card_by_name(id, name) {
                cards.push(card);
            }
        }
    }
    cards
}
