//! Orchestrator — feeds parties into the instance pool under a deadline.
//!
//! The orchestrator:
//! - Pulls parties from the matchmaker one at a time
//! - Admits each into the pool, blocking while every slot is busy
//! - Spawns one task per admitted run
//! - Waits for every run to finish, or for the deadline to cancel them
//! - Reports the final snapshot, per-party outcomes and leftover players

use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{info, warn};

use lfg_core::{FinalReport, RunOutcome, SimConfig};
use lfg_runtime::{cancel_pair, DungeonRun, InstancePool, PoolConfig, RuntimeError};

use crate::error::SchedulerResult;
use crate::matchmaker::PartyMatchmaker;

/// Drives one simulation over a shared instance pool.
pub struct Orchestrator {
    pool: InstancePool,
    /// Overall ceiling, measured from the start of `run`.
    deadline: Duration,
}

impl Orchestrator {
    pub fn new(pool: InstancePool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    /// Validate `config` and build a pool from it.
    pub fn from_config(config: &SimConfig) -> SchedulerResult<Self> {
        config.validate()?;
        let pool = InstancePool::new(PoolConfig::from(config));
        Ok(Self::new(pool, config.deadline()))
    }

    /// The pool, e.g. to `subscribe` to live snapshots before `run`.
    pub fn pool(&self) -> &InstancePool {
        &self.pool
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run every party the matchmaker can form.
    ///
    /// Returns once all runs are terminal. When the deadline fires, running
    /// parties are cancelled uncredited and every party still waiting for a
    /// slot (including those formed after the deadline) is reported as not
    /// admitted. Matchmaking always runs to exhaustion, so the leftovers
    /// depend only on the role counts.
    pub async fn run(&self, mut matchmaker: PartyMatchmaker) -> SchedulerResult<FinalReport> {
        let (cancel, signal) = cancel_pair();
        let watchdog = cancel.arm_deadline(self.deadline);

        let mut runs = JoinSet::new();
        let mut outcomes = Vec::new();
        let mut unserved = Vec::new();
        let mut admit_signal = signal.clone();

        for party in matchmaker.by_ref() {
            match DungeonRun::admit(&self.pool, party, &mut admit_signal).await {
                Ok(run) => {
                    runs.spawn(run.execute(signal.clone()));
                }
                Err(RuntimeError::AdmissionCancelled(party)) => {
                    warn!(party_id = party.id, "party not admitted before the deadline");
                    outcomes.push(RunOutcome::NotAdmitted { party_id: party.id });
                    unserved.push(*party);
                    break;
                }
                Err(e) => {
                    watchdog.abort();
                    return Err(e.into());
                }
            }
        }

        // Form the remaining parties so the leftovers are the same with or
        // without a deadline; none of them can be admitted any more.
        for party in matchmaker.by_ref() {
            outcomes.push(RunOutcome::NotAdmitted { party_id: party.id });
            unserved.push(party);
        }
        if !unserved.is_empty() {
            warn!(count = unserved.len(), "parties left unserved at the deadline");
        }

        while let Some(joined) = runs.join_next().await {
            match joined? {
                Ok(outcome) => outcomes.push(outcome),
                Err(RuntimeError::RunCancelled {
                    party_id,
                    slot_id,
                    elapsed_secs,
                }) => outcomes.push(RunOutcome::Cancelled {
                    party_id,
                    slot_id,
                    elapsed_secs,
                }),
                Err(e) => {
                    watchdog.abort();
                    return Err(e.into());
                }
            }
        }
        watchdog.abort();

        outcomes.sort_by_key(RunOutcome::party_id);
        let deadline_expired = outcomes.iter().any(|o| !o.is_completed());
        let report = FinalReport {
            parties_formed: matchmaker.parties_formed(),
            outcomes,
            unserved,
            deadline_expired,
            snapshot: self.pool.snapshot(),
            leftovers: matchmaker.leftovers(),
        };

        info!(
            parties_formed = report.parties_formed,
            parties_served = report.snapshot.stats.parties_served,
            total_time_served_secs = report.snapshot.stats.total_time_served_secs,
            deadline_expired,
            "simulation finished"
        );
        Ok(report)
    }
}

/// Build an orchestrator from `config` and run the queues it describes.
pub async fn simulate(config: &SimConfig) -> SchedulerResult<FinalReport> {
    let orchestrator = Orchestrator::from_config(config)?;
    let matchmaker = PartyMatchmaker::from_counts(config.tanks, config.healers, config.dps);
    orchestrator.run(matchmaker).await
}
