//! Instance pool — a fixed set of dungeon slots behind an admission gate.
//!
//! Admission is a counting semaphore sized to the slot count; holding a
//! permit is what entitles a party to occupy a slot. All slot and stats
//! mutation happens under one state lock, and snapshots take the same lock,
//! so a reader never sees a half-applied transition.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info};

use lfg_core::config::MAX_DURATION_SECS;
use lfg_core::{
    Party, PartyId, PoolStats, RunOutcome, SimConfig, SlotId, SlotState, SlotStatus, Snapshot,
};

use crate::balancer::RoundRobinBalancer;
use crate::cancel::CancelSignal;
use crate::error::{RuntimeError, RuntimeResult};

/// Configuration for an instance pool.
///
/// Values are expected to be validated already (see `SimConfig::validate`).
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of slots, which is also the concurrency limit.
    pub capacity: usize,
    /// Shortest run, in seconds.
    pub min_duration_secs: u32,
    /// Longest run, in seconds.
    pub max_duration_secs: u32,
    /// Real time per countdown second.
    pub tick: Duration,
    /// Fixed RNG seed for reproducible durations.
    pub seed: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 1,
            min_duration_secs: 1,
            max_duration_secs: MAX_DURATION_SECS,
            tick: Duration::from_secs(1),
            seed: None,
        }
    }
}

impl From<&SimConfig> for PoolConfig {
    fn from(config: &SimConfig) -> Self {
        Self {
            capacity: config.instances as usize,
            min_duration_secs: config.min_duration_secs,
            max_duration_secs: config.max_duration_secs,
            tick: config.tick(),
            seed: config.seed,
        }
    }
}

/// Everything guarded by the pool's state lock.
struct PoolState {
    slots: Vec<SlotState>,
    stats: PoolStats,
    balancer: RoundRobinBalancer,
    subscribers: Vec<mpsc::UnboundedSender<Snapshot>>,
}

impl PoolState {
    fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(SlotState::idle).collect(),
            stats: PoolStats::default(),
            balancer: RoundRobinBalancer::new(),
            subscribers: Vec::new(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            slots: self.slots.clone(),
            stats: self.stats,
        }
    }

    /// Push the current state to every live subscriber, dropping closed ones.
    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    fn activate(&mut self, party_id: PartyId, duration_secs: u32) -> SlotId {
        let count = self.slots.len();
        let slots = &self.slots;
        let slot_id = self
            .balancer
            .next_free(count, |i| !slots[i].is_active())
            .expect("an admission permit guarantees an idle slot");

        let slot = &mut self.slots[slot_id];
        slot.status = SlotStatus::Active;
        slot.party = Some(party_id);
        slot.remaining_secs = Some(duration_secs);
        slot_id
    }

    /// Return a slot to idle, crediting the run only if it completed.
    fn deactivate(&mut self, slot_id: SlotId, credit_secs: Option<u32>) {
        let slot = &mut self.slots[slot_id];
        slot.status = SlotStatus::Idle;
        slot.party = None;
        slot.remaining_secs = None;

        if let Some(secs) = credit_secs {
            slot.parties_served += 1;
            slot.time_served_secs += u64::from(secs);
            self.stats.parties_served += 1;
            self.stats.total_time_served_secs += u64::from(secs);
        }
    }
}

/// A bounded pool of dungeon slots.
///
/// Cloning is cheap and every clone refers to the same slots.
#[derive(Clone)]
pub struct InstancePool {
    config: PoolConfig,
    /// Admission gate: one permit per slot.
    gate: Arc<Semaphore>,
    state: Arc<Mutex<PoolState>>,
    rng: Arc<Mutex<StdRng>>,
}

impl InstancePool {
    /// Create a pool with `config.capacity` idle slots.
    pub fn new(config: PoolConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(
            capacity = config.capacity,
            min_secs = config.min_duration_secs,
            max_secs = config.max_duration_secs,
            "instance pool created"
        );
        Self {
            gate: Arc::new(Semaphore::new(config.capacity)),
            state: Arc::new(Mutex::new(PoolState::new(config.capacity))),
            rng: Arc::new(Mutex::new(rng)),
            config,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Admission permits not currently held.
    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }

    /// Draw a run duration uniformly from `[min, max]` seconds.
    pub fn draw_duration(&self) -> u32 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(self.config.min_duration_secs..=self.config.max_duration_secs)
    }

    /// A consistent copy of every slot and the pool stats.
    pub fn snapshot(&self) -> Snapshot {
        lock(&self.state).snapshot()
    }

    /// Receive a snapshot after every slot transition.
    ///
    /// The current state is delivered first.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Snapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = lock(&self.state);
        // Fails only if rx is gone, and we still hold it.
        let _ = tx.send(state.snapshot());
        state.subscribers.push(tx);
        rx
    }

    /// Wait for a free slot, then seat `party` in it for `duration_secs`.
    ///
    /// Blocks while every slot is occupied. If `cancel` fires first, the
    /// party is handed back in `AdmissionCancelled`.
    pub async fn admit(
        &self,
        party: Party,
        duration_secs: u32,
        cancel: &mut CancelSignal,
    ) -> RuntimeResult<SlotHandle> {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(party_id = party.id, "admission cancelled while waiting for a slot");
                return Err(RuntimeError::AdmissionCancelled(Box::new(party)));
            }
            permit = self.gate.clone().acquire_owned() => {
                permit.map_err(|_| RuntimeError::PoolClosed)?
            }
        };

        let slot_id = {
            let mut state = lock(&self.state);
            let slot_id = state.activate(party.id, duration_secs);
            state.publish();
            slot_id
        };

        info!(party_id = party.id, slot_id, duration_secs, "{party} entered dungeon");

        Ok(SlotHandle {
            state: Arc::clone(&self.state),
            slot_id,
            party,
            duration_secs,
            remaining_secs: duration_secs,
            finished: false,
            _permit: permit,
        })
    }

    /// Give a slot back without crediting its run.
    pub fn release(&self, handle: SlotHandle) -> RunOutcome {
        handle.abandon()
    }

    /// Close the admission gate. Pending and future admissions fail with
    /// `PoolClosed`; occupied slots are unaffected.
    pub fn close(&self) {
        self.gate.close();
        debug!("instance pool closed");
    }
}

fn lock(state: &Mutex<PoolState>) -> MutexGuard<'_, PoolState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scoped occupancy of one slot.
///
/// Dropping the handle on any path clears the slot and returns the
/// admission permit. Only `complete` credits the pool stats.
pub struct SlotHandle {
    state: Arc<Mutex<PoolState>>,
    slot_id: SlotId,
    party: Party,
    duration_secs: u32,
    remaining_secs: u32,
    finished: bool,
    // Dropped after `Drop::drop` has cleared the slot.
    _permit: OwnedSemaphorePermit,
}

impl SlotHandle {
    pub fn slot_id(&self) -> SlotId {
        self.slot_id
    }

    pub fn party(&self) -> &Party {
        &self.party
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.duration_secs - self.remaining_secs
    }

    /// Count down one second and publish the new remaining time.
    pub fn tick(&mut self) -> u32 {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        let mut state = lock(&self.state);
        state.slots[self.slot_id].remaining_secs = Some(self.remaining_secs);
        state.publish();
        debug!(
            party_id = self.party.id,
            slot_id = self.slot_id,
            remaining_secs = self.remaining_secs,
            "tick"
        );
        self.remaining_secs
    }

    /// Vacate the slot and credit the full drawn duration.
    pub fn complete(mut self) -> RunOutcome {
        self.finish(true);
        info!(
            party_id = self.party.id,
            slot_id = self.slot_id,
            duration_secs = self.duration_secs,
            "party cleared dungeon"
        );
        RunOutcome::Completed {
            party_id: self.party.id,
            slot_id: self.slot_id,
            duration_secs: self.duration_secs,
        }
    }

    /// Vacate the slot without crediting anything.
    pub fn abandon(mut self) -> RunOutcome {
        self.finish(false);
        RunOutcome::Cancelled {
            party_id: self.party.id,
            slot_id: self.slot_id,
            elapsed_secs: self.elapsed_secs(),
        }
    }

    fn finish(&mut self, credit: bool) {
        if self.finished {
            return;
        }
        self.finished = true;
        let mut state = lock(&self.state);
        state.deactivate(self.slot_id, credit.then_some(self.duration_secs));
        state.publish();
        if !credit {
            info!(
                party_id = self.party.id,
                slot_id = self.slot_id,
                elapsed_secs = self.elapsed_secs(),
                "slot released without credit"
            );
        }
    }
}

impl Drop for SlotHandle {
    fn drop(&mut self) {
        self.finish(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lfg_core::{Player, Role};

    use crate::cancel::cancel_pair;

    fn party(id: PartyId) -> Party {
        let n = id as u32;
        Party {
            id,
            tank: Arc::new(Player::numbered(Role::Tank, n)),
            healer: Arc::new(Player::numbered(Role::Healer, n)),
            dps: [
                Arc::new(Player::numbered(Role::Dps, 3 * n - 2)),
                Arc::new(Player::numbered(Role::Dps, 3 * n - 1)),
                Arc::new(Player::numbered(Role::Dps, 3 * n)),
            ],
        }
    }

    fn pool(capacity: usize) -> InstancePool {
        InstancePool::new(PoolConfig {
            capacity,
            min_duration_secs: 1,
            max_duration_secs: 3,
            tick: Duration::from_secs(1),
            seed: Some(7),
        })
    }

    #[test]
    fn pool_config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.capacity, 1);
        assert_eq!(config.max_duration_secs, 15);
        assert_eq!(config.tick, Duration::from_secs(1));
    }

    #[test]
    fn pool_config_from_sim_config() {
        let mut sim = SimConfig::scaffold();
        sim.instances = 4;
        sim.tick_millis = 10;
        sim.seed = Some(1);
        let config = PoolConfig::from(&sim);
        assert_eq!(config.capacity, 4);
        assert_eq!(config.tick, Duration::from_millis(10));
        assert_eq!(config.seed, Some(1));
    }

    #[test]
    fn new_pool_is_all_idle() {
        let pool = pool(3);
        let snap = pool.snapshot();
        assert_eq!(snap.slots.len(), 3);
        assert_eq!(snap.active_count(), 0);
        assert_eq!(snap.stats, PoolStats::default());
        assert_eq!(pool.available_permits(), 3);
    }

    #[test]
    fn drawn_durations_stay_in_bounds() {
        let pool = pool(1);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let d = pool.draw_duration();
            assert!((1..=3).contains(&d));
            seen[d as usize] = true;
        }
        assert!(seen[1] && seen[2] && seen[3]);
    }

    #[test]
    fn same_seed_draws_same_durations() {
        let a: Vec<u32> = {
            let p = pool(1);
            (0..20).map(|_| p.draw_duration()).collect()
        };
        let b: Vec<u32> = {
            let p = pool(1);
            (0..20).map(|_| p.draw_duration()).collect()
        };
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn admit_marks_slot_active() {
        let pool = pool(2);
        let mut cancel = CancelSignal::never();
        let handle = pool.admit(party(1), 3, &mut cancel).await.unwrap();

        let snap = pool.snapshot();
        let slot = &snap.slots[handle.slot_id()];
        assert_eq!(slot.status, SlotStatus::Active);
        assert_eq!(slot.party, Some(1));
        assert_eq!(slot.remaining_secs, Some(3));
        assert_eq!(pool.available_permits(), 1);
    }

    #[tokio::test]
    async fn admissions_rotate_through_slots() {
        let pool = pool(3);
        let mut cancel = CancelSignal::never();

        let a = pool.admit(party(1), 1, &mut cancel).await.unwrap();
        assert_eq!(a.slot_id(), 0);
        let b = pool.admit(party(2), 1, &mut cancel).await.unwrap();
        assert_eq!(b.slot_id(), 1);
        a.complete();

        // Slot 0 is free again, but slot 2 is next in turn.
        let c = pool.admit(party(3), 1, &mut cancel).await.unwrap();
        assert_eq!(c.slot_id(), 2);
        let d = pool.admit(party(4), 1, &mut cancel).await.unwrap();
        assert_eq!(d.slot_id(), 0);
    }

    #[tokio::test]
    async fn complete_credits_stats() {
        let pool = pool(2);
        let mut cancel = CancelSignal::never();
        let mut handle = pool.admit(party(1), 2, &mut cancel).await.unwrap();
        let slot_id = handle.slot_id();

        assert_eq!(handle.tick(), 1);
        assert_eq!(pool.snapshot().slots[slot_id].remaining_secs, Some(1));
        assert_eq!(handle.tick(), 0);

        let outcome = handle.complete();
        assert_eq!(
            outcome,
            RunOutcome::Completed {
                party_id: 1,
                slot_id,
                duration_secs: 2
            }
        );

        let snap = pool.snapshot();
        assert_eq!(snap.slots[slot_id], SlotState {
            id: slot_id,
            status: SlotStatus::Idle,
            party: None,
            remaining_secs: None,
            parties_served: 1,
            time_served_secs: 2,
        });
        assert_eq!(snap.stats.parties_served, 1);
        assert_eq!(snap.stats.total_time_served_secs, 2);
        assert_eq!(pool.available_permits(), 2);
    }

    #[tokio::test]
    async fn release_credits_nothing() {
        let pool = pool(1);
        let mut cancel = CancelSignal::never();
        let mut handle = pool.admit(party(1), 3, &mut cancel).await.unwrap();
        handle.tick();

        let outcome = pool.release(handle);
        assert_eq!(
            outcome,
            RunOutcome::Cancelled {
                party_id: 1,
                slot_id: 0,
                elapsed_secs: 1
            }
        );
        let snap = pool.snapshot();
        assert_eq!(snap.active_count(), 0);
        assert_eq!(snap.stats, PoolStats::default());
        assert_eq!(pool.available_permits(), 1);
    }

    #[tokio::test]
    async fn dropping_handle_releases_slot() {
        let pool = pool(1);
        let mut cancel = CancelSignal::never();
        {
            let _handle = pool.admit(party(1), 3, &mut cancel).await.unwrap();
            assert_eq!(pool.available_permits(), 0);
        }
        assert_eq!(pool.available_permits(), 1);
        assert_eq!(pool.snapshot().active_count(), 0);
        assert_eq!(pool.snapshot().stats.parties_served, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn admit_waits_for_capacity() {
        let pool = pool(1);
        let mut cancel = CancelSignal::never();
        let held = pool.admit(party(1), 1, &mut cancel).await.unwrap();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move {
                let mut cancel = CancelSignal::never();
                pool.admit(party(2), 1, &mut cancel).await
            })
        };

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!waiter.is_finished());
        assert_eq!(pool.snapshot().active_count(), 1);

        held.complete();
        let second = waiter.await.unwrap().unwrap();
        assert_eq!(second.party().id, 2);
        assert_eq!(pool.snapshot().active_count(), 1);
    }

    #[tokio::test]
    async fn cancelled_admission_returns_party() {
        let pool = pool(1);
        let mut never = CancelSignal::never();
        let _held = pool.admit(party(1), 1, &mut never).await.unwrap();

        let (handle, mut signal) = cancel_pair();
        handle.cancel();
        let err = pool.admit(party(2), 1, &mut signal).await.err().unwrap();
        match err {
            RuntimeError::AdmissionCancelled(p) => assert_eq!(p.id, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(pool.snapshot().active_count(), 1);
    }

    #[tokio::test]
    async fn closed_pool_rejects_admission() {
        let pool = pool(1);
        pool.close();
        let mut cancel = CancelSignal::never();
        let result = pool.admit(party(1), 1, &mut cancel).await;
        assert!(matches!(result, Err(RuntimeError::PoolClosed)));
    }

    #[tokio::test]
    async fn subscribers_see_every_transition() {
        let pool = pool(1);
        let mut updates = pool.subscribe();
        let mut cancel = CancelSignal::never();

        let mut handle = pool.admit(party(1), 2, &mut cancel).await.unwrap();
        handle.tick();
        handle.tick();
        handle.complete();

        let mut remaining = Vec::new();
        while let Ok(snap) = updates.try_recv() {
            remaining.push(snap.slots[0].remaining_secs);
        }
        assert_eq!(remaining, vec![None, Some(2), Some(1), Some(0), None]);
    }

    #[test]
    fn snapshot_is_idempotent() {
        let pool = pool(2);
        assert_eq!(pool.snapshot(), pool.snapshot());
    }
}
