//! Runtime error types.

use thiserror::Error;

use lfg_core::{Party, PartyId, SlotId};

/// Errors raised by admission and dungeon runs.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Cancelled while waiting for a slot. The party was never run and is
    /// handed back to the caller.
    #[error("admission cancelled for party {}", .0.id)]
    AdmissionCancelled(Box<Party>),

    /// Stopped mid-run. The slot was released and nothing was credited.
    #[error("run for party {party_id} in slot {slot_id} cancelled after {elapsed_secs}s")]
    RunCancelled {
        party_id: PartyId,
        slot_id: SlotId,
        elapsed_secs: u32,
    },

    #[error("instance pool is closed")]
    PoolClosed,
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
