//! Event engine: serialized mutations over a record store.
//!
//! Every mutation of an event runs inside that event's critical section:
//! lock, load the committed snapshot, apply the operation, commit. An error at
//! any step drops the working copy, so the store only ever holds snapshots
//! produced by whole operations. Queries read committed snapshots and never
//! take the event lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use fencing_core::{
    BoutOutcome, BoutSubmission, DeId, EngineError, Event, EventId, FencerId, PoolId,
    RankingRow, Rules, Standing, Tableau, TeamEntry, TeamId,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::TournamentError;
use crate::store::RecordStore;

/// One line of the elimination audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub event: EventId,
    pub de: DeId,
    pub score_a: String,
    pub score_b: String,
    /// Error message for a rejected submission
    pub rejected: Option<String>,
}

pub struct TournamentEngine<S: RecordStore> {
    store: S,
    locks: Mutex<HashMap<EventId, Arc<Mutex<()>>>>,
    audit: Mutex<Vec<AuditEntry>>,
}

impl<S: RecordStore> TournamentEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
            audit: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn event_lock(&self, id: EventId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id).or_default())
    }

    /// Run `op` against a working copy of the event and commit the result.
    pub fn transact<T, F>(&self, id: EventId, op: F) -> Result<T, TournamentError>
    where
        F: FnOnce(&mut Event) -> Result<T, EngineError>,
    {
        let lock = self.event_lock(id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut event = self.store.load(id)?;
        let value = op(&mut event)?;
        self.store.commit(&event)?;
        Ok(value)
    }

    /// Register a new event in the store
    pub fn create_event(&self, name: &str, rules: Rules) -> Result<EventId, TournamentError> {
        let event = Event::new(name, rules);
        self.store.insert(&event)?;
        info!(event = %event.id, name, "event created");
        Ok(event.id)
    }

    pub fn add_team(&self, id: EventId, entry: TeamEntry) -> Result<TeamId, TournamentError> {
        let name = entry.name.clone();
        let team = self.transact(id, |event| event.add_team(entry))?;
        debug!(event = %id, team = %team, name, "team entered");
        Ok(team)
    }

    pub fn build_pools<R: Rng + ?Sized>(
        &self,
        id: EventId,
        count: usize,
        rng: &mut R,
    ) -> Result<(), TournamentError> {
        self.transact(id, |event| event.build_pools(count, rng))?;
        info!(event = %id, pools = count, "pools drawn");
        Ok(())
    }

    pub fn assign_pools(&self, id: EventId, plan: Vec<Vec<TeamId>>) -> Result<(), TournamentError> {
        let count = plan.len();
        self.transact(id, |event| event.assign_pools(plan))?;
        info!(event = %id, pools = count, "pools assigned");
        Ok(())
    }

    pub fn record_pool_bout(
        &self,
        id: EventId,
        pool: PoolId,
        fencer: FencerId,
        opponent: FencerId,
        raw_fencer: &str,
        raw_opponent: &str,
    ) -> Result<(), TournamentError> {
        self.transact(id, |event| {
            event.record_pool_bout(pool, fencer, opponent, raw_fencer, raw_opponent)
        })?;
        debug!(event = %id, %fencer, %opponent, raw_fencer, raw_opponent, "pool bout recorded");
        Ok(())
    }

    pub fn complete_pool(&self, id: EventId, pool: PoolId) -> Result<(), TournamentError> {
        self.transact(id, |event| event.complete_pool(pool))?;
        info!(event = %id, %pool, "pool complete");
        Ok(())
    }

    pub fn reset_pool(&self, id: EventId, pool: PoolId) -> Result<(), TournamentError> {
        self.transact(id, |event| event.reset_pool(pool))?;
        warn!(event = %id, %pool, "pool results cleared");
        Ok(())
    }

    pub fn close_pools(&self, id: EventId) -> Result<(), TournamentError> {
        self.transact(id, Event::close_pools)?;
        info!(event = %id, "pool play closed");
        Ok(())
    }

    /// Seed the bracket from the final pool ranking
    pub fn generate_bracket(&self, id: EventId) -> Result<(), TournamentError> {
        let (size, entrants) = self.transact(id, |event| {
            event.generate_bracket()?;
            let bracket = event.bracket()?;
            Ok((bracket.size, bracket.seeds.len()))
        })?;
        info!(event = %id, size, entrants, "bracket generated");
        Ok(())
    }

    pub fn start_bout(&self, id: EventId, de: DeId) -> Result<(), TournamentError> {
        self.transact(id, |event| event.start_bout(de))?;
        debug!(event = %id, %de, "bout started");
        Ok(())
    }

    /// Apply one elimination bout. Rejected submissions are logged and
    /// audited but never change the stored event.
    pub fn submit_bout(
        &self,
        id: EventId,
        submission: &BoutSubmission,
    ) -> Result<BoutOutcome, TournamentError> {
        let result = self.transact(id, |event| event.submit_bout(submission));
        self.audit(id, submission, result.as_ref().err());

        match &result {
            Ok(outcome) => {
                info!(
                    event = %id,
                    de = %submission.de,
                    round = outcome.round,
                    winner = %outcome.winner,
                    score = %format!("{}-{}", outcome.scores.first, outcome.scores.second),
                    "bout recorded"
                );
                for next in &outcome.now_ready {
                    debug!(event = %id, de = %next, "bout ready");
                }
                for placement in &outcome.placements {
                    debug!(event = %id, team = %placement.team, place = %placement.place, "team placed");
                }
                if outcome.event_complete {
                    info!(event = %id, "event finished");
                }
            }
            Err(e) if e.is_validation() => {
                warn!(event = %id, de = %submission.de, error = %e, "submission rejected");
            }
            Err(e) => {
                tracing::error!(event = %id, de = %submission.de, error = %e, "submission aborted");
            }
        }
        result
    }

    fn audit(&self, id: EventId, submission: &BoutSubmission, error: Option<&TournamentError>) {
        let entry = AuditEntry {
            at: Utc::now(),
            event: id,
            de: submission.de,
            score_a: submission.score_a.clone(),
            score_b: submission.score_b.clone(),
            rejected: error.map(ToString::to_string),
        };
        self.audit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Every bout submission seen so far, oldest first
    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.audit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Latest committed snapshot
    pub fn event(&self, id: EventId) -> Result<Event, TournamentError> {
        Ok(self.store.load(id)?)
    }

    pub fn pool_ranking(&self, id: EventId) -> Result<Vec<RankingRow>, TournamentError> {
        Ok(self.event(id)?.pool_ranking())
    }

    pub fn tableau(&self, id: EventId) -> Result<Option<Tableau>, TournamentError> {
        Ok(self.event(id)?.tableau)
    }

    pub fn standings(&self, id: EventId) -> Result<Vec<Standing>, TournamentError> {
        Ok(self.event(id)?.standings())
    }

    pub fn ready_bouts(&self, id: EventId) -> Result<Vec<DeId>, TournamentError> {
        Ok(self.event(id)?.ready_bouts())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
