//! Persistence collaborator for match records.
//!
//! The trait keeps the core decoupled from any concrete database; callers
//! log store failures instead of turning them into match failures.

use crate::lobby::{MatchId, PlayerId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// External persistence touchpoints the core calls at registration
/// completion and at close.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn record_match_started(&self, id: MatchId, players: &[PlayerId]) -> anyhow::Result<()>;

    async fn record_match_finished(
        &self,
        id: MatchId,
        failed: bool,
        error: Option<String>,
    ) -> anyhow::Result<()>;
}

/// Store that drops every record.
pub struct NullMatchStore;

#[async_trait]
impl MatchStore for NullMatchStore {
    async fn record_match_started(&self, _id: MatchId, _players: &[PlayerId]) -> anyhow::Result<()> {
        Ok(())
    }

    async fn record_match_finished(
        &self,
        _id: MatchId,
        _failed: bool,
        _error: Option<String>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// One persisted match row.
#[derive(Clone, Debug)]
pub struct MatchRecord {
    pub players: Vec<PlayerId>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub is_failed: bool,
    pub error: Option<String>,
}

/// In-memory store for tests and local matches.
#[derive(Default)]
pub struct MemoryMatchStore {
    records: Mutex<HashMap<MatchId, MatchRecord>>,
}

impl MemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<MatchId, MatchRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, id: MatchId) -> Option<MatchRecord> {
        self.records().get(&id).cloned()
    }
}

#[async_trait]
impl MatchStore for MemoryMatchStore {
    async fn record_match_started(&self, id: MatchId, players: &[PlayerId]) -> anyhow::Result<()> {
        debug!("match {id} started with {players:?}");
        self.records().insert(
            id,
            MatchRecord {
                players: players.to_vec(),
                started_at: Utc::now(),
                finished_at: None,
                is_failed: false,
                error: None,
            },
        );
        Ok(())
    }

    async fn record_match_finished(
        &self,
        id: MatchId,
        failed: bool,
        error: Option<String>,
    ) -> anyhow::Result<()> {
        debug!("match {id} finished, failed={failed}, error={error:?}");
        let mut records = self.records();
        // A match can fail before anyone registered; keep the row anyway.
        let record = records.entry(id).or_insert_with(|| MatchRecord {
            players: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            is_failed: false,
            error: None,
        });
        record.finished_at = Some(Utc::now());
        record.is_failed = failed;
        record.error = error;
        Ok(())
    }
}
