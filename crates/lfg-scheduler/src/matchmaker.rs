//! Party matchmaker — drains three role queues into fixed-composition parties.
//!
//! Formation is all-or-nothing: a party is emitted only when at least one
//! tank, one healer and three DPS are queued, and members are taken oldest
//! first. Once the queues cannot form a party the sequence ends for good.

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::sync::Arc;

use tracing::{debug, info};

use lfg_core::{LeftoverPlayers, Party, PartyId, Player, Role};

/// DPS players per party.
pub const DPS_PER_PARTY: usize = 3;

/// FIFO role queues plus the party counter.
///
/// Iterating yields parties until the queues are exhausted; the iterator is
/// fused and does not restart.
#[derive(Debug)]
pub struct PartyMatchmaker {
    tanks: VecDeque<Arc<Player>>,
    healers: VecDeque<Arc<Player>>,
    dps: VecDeque<Arc<Player>>,
    /// Players ever queued per role, for numbering: tank, healer, dps.
    issued: [u32; 3],
    next_id: PartyId,
    exhausted: bool,
}

impl PartyMatchmaker {
    pub fn new() -> Self {
        Self {
            tanks: VecDeque::new(),
            healers: VecDeque::new(),
            dps: VecDeque::new(),
            issued: [0; 3],
            next_id: 1,
            exhausted: false,
        }
    }

    /// Queue `tanks` / `healers` / `dps` players labelled `Role-1..=n`.
    pub fn from_counts(tanks: u32, healers: u32, dps: u32) -> Self {
        let mut matchmaker = Self::new();
        matchmaker.enqueue_numbered(Role::Tank, tanks);
        matchmaker.enqueue_numbered(Role::Healer, healers);
        matchmaker.enqueue_numbered(Role::Dps, dps);
        info!(tanks, healers, dps, "players queued");
        matchmaker
    }

    /// Append `count` players of `role`, numbered after every player of
    /// that role queued before.
    pub fn enqueue_numbered(&mut self, role: Role, count: u32) {
        for _ in 0..count {
            let ordinal = self.issued[role_index(role)] + 1;
            self.enqueue(Player::numbered(role, ordinal));
        }
    }

    pub fn enqueue(&mut self, player: Player) {
        let role = player.role;
        self.issued[role_index(role)] += 1;
        self.queue_mut(role).push_back(Arc::new(player));
    }

    /// Parties emitted so far.
    pub fn parties_formed(&self) -> u64 {
        self.next_id - 1
    }

    /// Current queue lengths.
    pub fn leftovers(&self) -> LeftoverPlayers {
        LeftoverPlayers {
            tanks: self.tanks.len(),
            healers: self.healers.len(),
            dps: self.dps.len(),
        }
    }

    fn can_form(&self) -> bool {
        !self.tanks.is_empty() && !self.healers.is_empty() && self.dps.len() >= DPS_PER_PARTY
    }

    fn queue_mut(&mut self, role: Role) -> &mut VecDeque<Arc<Player>> {
        match role {
            Role::Tank => &mut self.tanks,
            Role::Healer => &mut self.healers,
            Role::Dps => &mut self.dps,
        }
    }
}

fn role_index(role: Role) -> usize {
    match role {
        Role::Tank => 0,
        Role::Healer => 1,
        Role::Dps => 2,
    }
}

impl Iterator for PartyMatchmaker {
    type Item = Party;

    fn next(&mut self) -> Option<Party> {
        if self.exhausted {
            return None;
        }
        if !self.can_form() {
            self.exhausted = true;
            debug!(leftovers = ?self.leftovers(), "matchmaking exhausted");
            return None;
        }

        // can_form() guarantees every pop below succeeds.
        let (Some(tank), Some(healer), Some(d1), Some(d2), Some(d3)) = (
            self.tanks.pop_front(),
            self.healers.pop_front(),
            self.dps.pop_front(),
            self.dps.pop_front(),
            self.dps.pop_front(),
        ) else {
            self.exhausted = true;
            return None;
        };

        let party = Party {
            id: self.next_id,
            tank,
            healer,
            dps: [d1, d2, d3],
        };
        self.next_id += 1;
        info!(party_id = party.id, "formed {party}");
        Some(party)
    }
}

impl FusedIterator for PartyMatchmaker {}

impl Default for PartyMatchmaker {
    fn default() -> Self {
        Self::new()
    }
}
