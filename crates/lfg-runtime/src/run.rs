//! DungeonRun — one party occupying one slot for a drawn duration.
//!
//! Lifecycle: `Admitted -> Active (ticking) -> Completed | Cancelled`.
//! The countdown suspends once per tick and can be interrupted by the
//! shared cancel signal between ticks. A tick that becomes due at the same
//! instant as a cancellation wins, so a run whose last tick lands on the
//! deadline counts as completed.

use std::time::Duration;

use tracing::debug;

use lfg_core::{Party, RunOutcome};

use crate::cancel::CancelSignal;
use crate::error::{RuntimeError, RuntimeResult};
use crate::pool::{InstancePool, SlotHandle};

/// An admitted party with its slot and drawn duration.
pub struct DungeonRun {
    handle: SlotHandle,
    tick: Duration,
}

impl DungeonRun {
    /// Draw a duration, then wait for a slot in `pool`.
    ///
    /// On `AdmissionCancelled` the party is returned inside the error.
    pub async fn admit(
        pool: &InstancePool,
        party: Party,
        cancel: &mut CancelSignal,
    ) -> RuntimeResult<Self> {
        let duration_secs = pool.draw_duration();
        debug!(party_id = party.id, duration_secs, "duration drawn");
        let handle = pool.admit(party, duration_secs, cancel).await?;
        Ok(Self {
            handle,
            tick: pool.config().tick,
        })
    }

    pub fn party(&self) -> &Party {
        self.handle.party()
    }

    pub fn slot_id(&self) -> usize {
        self.handle.slot_id()
    }

    pub fn duration_secs(&self) -> u32 {
        self.handle.duration_secs()
    }

    /// Count the run down to zero, then vacate and credit the slot.
    ///
    /// If `cancel` fires first the slot is released uncredited and the run
    /// ends with `RunCancelled`.
    pub async fn execute(mut self, mut cancel: CancelSignal) -> RuntimeResult<RunOutcome> {
        while self.handle.remaining_secs() > 0 {
            tokio::select! {
                biased;
                _ = tokio::time::sleep(self.tick) => {
                    self.handle.tick();
                }
                _ = cancel.cancelled() => {
                    return match self.handle.abandon() {
                        RunOutcome::Cancelled { party_id, slot_id, elapsed_secs } => {
                            Err(RuntimeError::RunCancelled { party_id, slot_id, elapsed_secs })
                        }
                        outcome => Ok(outcome),
                    };
                }
            }
        }
        Ok(self.handle.complete())
    }
}
