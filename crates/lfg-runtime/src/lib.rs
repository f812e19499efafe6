//! lfg-runtime — bounded dungeon instance pool.
//!
//! Provides the concurrency core of the LFG simulation:
//!
//! - **Admission**: a counting gate sized to the slot count; `admit` waits
//!   for a permit (backpressure) or for cancellation
//! - **Slot bookkeeping**: per-slot status, party and countdown plus
//!   pool-wide stats, all behind one lock
//! - **Dungeon runs**: per-party countdown that ticks once per second and
//!   stops cleanly on the shared cancel signal
//! - **Live status**: a snapshot is published to subscribers on every
//!   slot transition
//!
//! # Architecture
//!
//! ```text
//! InstancePool
//!   ├── Semaphore (one permit per slot)
//!   ├── Mutex<PoolState>
//!   │     ├── Vec<SlotState> + PoolStats
//!   │     ├── RoundRobinBalancer (next idle slot)
//!   │     └── snapshot subscribers
//!   └── SlotHandle (permit + slot, released on drop)
//!         └── DungeonRun (countdown, cancellable)
//! ```

pub mod balancer;
pub mod cancel;
pub mod error;
pub mod pool;
pub mod run;

pub use balancer::RoundRobinBalancer;
pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use error::{RuntimeError, RuntimeResult};
pub use pool::{InstancePool, PoolConfig, SlotHandle};
pub use run::DungeonRun;
