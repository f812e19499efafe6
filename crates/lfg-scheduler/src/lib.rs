//! lfg-scheduler — party matchmaking and dungeon orchestration.
//!
//! Turns role counts into parties and runs them through an
//! `InstancePool` (from `lfg-runtime`). The scheduler:
//!
//! - Drains tank / healer / DPS queues into 1 + 1 + 3 parties
//! - Admits parties into the pool with backpressure
//! - Bounds the whole simulation by a deadline that cancels stragglers
//! - Reports final pool state, per-party outcomes and leftover players
//!
//! # Architecture
//!
//! ```text
//! Orchestrator
//!   ├── PartyMatchmaker (lazy, fused Iterator<Item = Party>)
//!   ├── InstancePool (admission + slot state)
//!   ├── JoinSet<DungeonRun::execute> (one task per admitted party)
//!   └── deadline watchdog (fires the shared cancel signal)
//! ```

pub mod error;
pub mod matchmaker;
pub mod orchestrator;

pub use error::{SchedulerError, SchedulerResult};
pub use matchmaker::PartyMatchmaker;
pub use orchestrator::{simulate, Orchestrator};
