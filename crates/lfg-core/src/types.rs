//! Shared types used across LFG crates.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The role a queued player fills in a party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tank,
    Healer,
    Dps,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Tank => "Tank",
            Role::Healer => "Healer",
            Role::Dps => "DPS",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A queued player. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub role: Role,
    pub label: String,
}

impl Player {
    pub fn new(role: Role, label: impl Into<String>) -> Self {
        Self {
            role,
            label: label.into(),
        }
    }

    /// A player labelled by role and 1-based position, e.g. `Healer-3`.
    pub fn numbered(role: Role, ordinal: u32) -> Self {
        Self::new(role, format!("{}-{ordinal}", role.label()))
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Sequential party identifier, starting at 1.
pub type PartyId = u64;

/// Slot identifier, `0..capacity`.
pub type SlotId = usize;

/// A fixed 1 tank + 1 healer + 3 DPS group.
///
/// Members are shared references to the players dequeued from the role
/// queues, not copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub tank: Arc<Player>,
    pub healer: Arc<Player>,
    pub dps: [Arc<Player>; 3],
}

impl Party {
    pub fn members(&self) -> impl Iterator<Item = &Arc<Player>> {
        [&self.tank, &self.healer]
            .into_iter()
            .chain(self.dps.iter())
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Party {}: [", self.id)?;
        for (i, member) in self.members().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{member}")?;
        }
        f.write_str("]")
    }
}

/// Whether a slot currently hosts a party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Idle,
    Active,
}

impl SlotStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SlotStatus::Idle => "empty",
            SlotStatus::Active => "active",
        }
    }
}

/// Point-in-time view of one slot.
///
/// `party` and `remaining_secs` are present iff `status` is `Active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotState {
    pub id: SlotId,
    pub status: SlotStatus,
    pub party: Option<PartyId>,
    pub remaining_secs: Option<u32>,
    /// Parties this slot has hosted to completion.
    pub parties_served: u64,
    /// Seconds of completed runs hosted by this slot.
    pub time_served_secs: u64,
}

impl SlotState {
    pub fn idle(id: SlotId) -> Self {
        Self {
            id,
            status: SlotStatus::Idle,
            party: None,
            remaining_secs: None,
            parties_served: 0,
            time_served_secs: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SlotStatus::Active
    }
}

/// Pool-wide counters. Both only ever increase, and only on completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub parties_served: u64,
    pub total_time_served_secs: u64,
}

/// A consistent read of every slot plus the pool stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub slots: Vec<SlotState>,
    pub stats: PoolStats,
}

impl Snapshot {
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_active()).count()
    }

    pub fn idle_count(&self) -> usize {
        self.slots.len() - self.active_count()
    }
}

/// Role queue contents remaining after matchmaking is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeftoverPlayers {
    pub tanks: usize,
    pub healers: usize,
    pub dps: usize,
}

/// Terminal state of one formed party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Ran for its full duration; counted in the pool stats.
    Completed {
        party_id: PartyId,
        slot_id: SlotId,
        duration_secs: u32,
    },
    /// Stopped by the deadline mid-run; credited nothing.
    Cancelled {
        party_id: PartyId,
        slot_id: SlotId,
        elapsed_secs: u32,
    },
    /// The deadline fired while the party waited for a slot.
    NotAdmitted { party_id: PartyId },
}

impl RunOutcome {
    pub fn party_id(&self) -> PartyId {
        match self {
            RunOutcome::Completed { party_id, .. }
            | RunOutcome::Cancelled { party_id, .. }
            | RunOutcome::NotAdmitted { party_id } => *party_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

/// Everything the simulation reports once it finishes or times out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub parties_formed: u64,
    /// Outcomes ordered by party id.
    pub outcomes: Vec<RunOutcome>,
    /// Parties that were formed but never got a slot.
    pub unserved: Vec<Party>,
    pub deadline_expired: bool,
    pub snapshot: Snapshot,
    pub leftovers: LeftoverPlayers,
}
