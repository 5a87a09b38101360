//! Per-hex auxiliary state: burning incendiaries and special display markers.

use serde::{Deserialize, Serialize};

/// The source of an incendiary fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfernoKind {
    /// Standard inferno rounds.
    Standard,
    /// Artillery-delivered inferno.
    Artillery,
    /// Inferno bombs dropped from the air.
    Bomb,
}

/// Incendiary material burning in a hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Inferno {
    pub kind: InfernoKind,
    pub turns_remaining: u32,
}

impl Inferno {
    pub const fn new(kind: InfernoKind, turns: u32) -> Self {
        Inferno {
            kind,
            turns_remaining: turns,
        }
    }

    /// Adds more burning material, as when a second volley lands in the hex.
    pub fn add(&mut self, turns: u32) {
        self.turns_remaining = self.turns_remaining.saturating_add(turns);
    }

    /// Burns one turn away; returns true while the fire keeps going.
    pub fn burn_turn(&mut self) -> bool {
        self.turns_remaining = self.turns_remaining.saturating_sub(1);
        self.turns_remaining > 0
    }
}

/// What a special hex display marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialDisplayKind {
    ArtilleryIncoming,
    ArtilleryTarget,
    ArtilleryAdjusted,
    ArtilleryHit,
    BombHit,
    BombMiss,
    PlayerNote,
}

/// A marker drawn on a hex for one or all players.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecialHexDisplay {
    pub kind: SpecialDisplayKind,
    /// Game round the marker refers to, if any.
    pub round: Option<u32>,
    /// Owning player; `None` means visible to everyone.
    pub owner: Option<u32>,
    pub info: String,
}

impl SpecialHexDisplay {
    pub fn new(kind: SpecialDisplayKind, info: impl Into<String>) -> Self {
        SpecialHexDisplay {
            kind,
            round: None,
            owner: None,
            info: info.into(),
        }
    }

    pub fn for_round(mut self, round: u32) -> Self {
        self.round = Some(round);
        self
    }

    pub fn owned_by(mut self, player: u32) -> Self {
        self.owner = Some(player);
        self
    }

    /// True if `player` may see this marker.
    pub fn visible_to(&self, player: u32) -> bool {
        self.owner.map_or(true, |o| o == player)
    }
}
