use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, error, info, warn};

use crate::engine::{AdmissionCheck, EngineError, ReservationStore};
use crate::limits::*;
use crate::model::*;
use crate::wal::Wal;

/// Reservations of one room on one day, sorted by `span.start`.
#[derive(Debug, Clone, Default)]
pub struct DayLedger {
    pub reservations: Vec<ReservationBlock>,
}

impl DayLedger {
    /// Insert maintaining sort order by span.start.
    pub fn insert(&mut self, block: ReservationBlock) {
        let pos = self
            .reservations
            .binary_search_by_key(&block.span.start, |r| r.span.start)
            .unwrap_or_else(|e| e);
        self.reservations.insert(pos, block);
    }
}

pub type SharedDay = Arc<RwLock<DayLedger>>;

// ── Group-commit WAL channel ─────────────────────────────

enum WalCommand {
    Append {
        event: Event,
        response: oneshot::Sender<io::Result<()>>,
    },
    Compact {
        events: Vec<Event>,
        response: oneshot::Sender<io::Result<()>>,
    },
    AppendsSinceCompact {
        response: oneshot::Sender<u64>,
    },
}

type PendingAppend = (Event, oneshot::Sender<io::Result<()>>);

/// Background task that owns the WAL and batches appends for group commit:
/// everything already queued behind the first append is written with it and
/// covered by a single fsync.
async fn wal_writer_loop(mut wal: Wal, mut rx: mpsc::Receiver<WalCommand>) {
    while let Some(cmd) = rx.recv().await {
        let mut batch = match cmd {
            WalCommand::Append { event, response } => vec![(event, response)],
            other => {
                handle_non_append(&mut wal, other);
                continue;
            }
        };
        let mut deferred = None;
        while let Ok(next) = rx.try_recv() {
            match next {
                WalCommand::Append { event, response } => batch.push((event, response)),
                other => {
                    deferred = Some(other);
                    break;
                }
            }
        }

        commit_batch(&mut wal, &mut batch);
        if let Some(other) = deferred {
            handle_non_append(&mut wal, other);
        }
    }
}

fn commit_batch(wal: &mut Wal, batch: &mut Vec<PendingAppend>) {
    metrics::histogram!(crate::observability::WAL_FLUSH_BATCH_SIZE).record(batch.len() as f64);
    let flush_start = std::time::Instant::now();

    let result = batch
        .iter()
        .try_for_each(|(event, _)| wal.append_buffered(event))
        .and_then(|()| wal.flush_sync());
    if let Err(e) = &result {
        warn!("WAL batch of {} events failed: {e}", batch.len());
        // Leftovers of this batch must not reach the file ahead of the next one.
        if let Err(e) = wal.discard_pending() {
            error!("cannot roll back WAL tail, retrying on next append: {e}");
        }
    }

    metrics::histogram!(crate::observability::WAL_FLUSH_DURATION_SECONDS)
        .record(flush_start.elapsed().as_secs_f64());

    for (_, tx) in batch.drain(..) {
        let r = match &result {
            Ok(()) => Ok(()),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        };
        let _ = tx.send(r);
    }
}

fn handle_non_append(wal: &mut Wal, cmd: WalCommand) {
    match cmd {
        WalCommand::Compact { events, response } => {
            let result = Wal::write_compact_file(wal.path(), &events)
                .and_then(|()| wal.swap_compact_file());
            let _ = response.send(result);
        }
        WalCommand::AppendsSinceCompact { response } => {
            let _ = response.send(wal.appends_since_compact());
        }
        WalCommand::Append { .. } => unreachable!("appends are batched by the writer loop"),
    }
}

/// Durable reservation store: one lock per room-day, one WAL for everything.
pub struct Ledger {
    days: DashMap<DayKey, SharedDay>,
    wal_tx: mpsc::Sender<WalCommand>,
    /// Appends hold this shared; compaction holds it exclusively so no admitted
    /// reservation can fall between the snapshot and the file swap.
    commit_gate: RwLock<()>,
}

impl Ledger {
    /// Replay the WAL at `wal_path` and start its writer task.
    /// Must be called from within a tokio runtime.
    pub fn open(wal_path: PathBuf) -> io::Result<Self> {
        let events = Wal::recover(&wal_path)?;
        let wal = Wal::open(&wal_path)?;
        let (wal_tx, wal_rx) = mpsc::channel(4096);
        tokio::spawn(wal_writer_loop(wal, wal_rx));

        let days: DashMap<DayKey, DayLedger> = DashMap::new();
        let replayed = events.len();
        for event in events {
            let block = block_from_event(event);
            days.entry(block.key()).or_default().insert(block);
        }

        info!("ledger replayed {replayed} reservations from {}", wal_path.display());
        metrics::gauge!(crate::observability::RESERVATIONS_STORED).set(replayed as f64);

        Ok(Self {
            days: days
                .into_iter()
                .map(|(key, day)| (key, Arc::new(RwLock::new(day))))
                .collect(),
            wal_tx,
            commit_gate: RwLock::new(()),
        })
    }

    fn existing_day(&self, key: &DayKey) -> Option<SharedDay> {
        self.days.get(key).map(|e| e.value().clone())
    }

    fn day(&self, key: DayKey) -> SharedDay {
        self.days.entry(key).or_default().value().clone()
    }

    #[cfg(test)]
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Write event to WAL via the background group-commit writer.
    async fn wal_append(&self, event: &Event) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Append {
                event: event.clone(),
                response: tx,
            })
            .await
            .map_err(|_| EngineError::Storage("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::Storage("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::Storage(e.to_string()))
    }

    /// Total reservations across all days.
    pub async fn reservation_count(&self) -> usize {
        let mut total = 0;
        for day in self.snapshot_days() {
            total += day.read().await.reservations.len();
        }
        total
    }

    fn snapshot_days(&self) -> Vec<SharedDay> {
        self.days.iter().map(|e| e.value().clone()).collect()
    }

    /// Rewrite the WAL with one event per stored reservation.
    pub async fn compact_wal(&self) -> Result<(), EngineError> {
        let _gate = self.commit_gate.write().await;

        let mut events = Vec::new();
        for day in self.snapshot_days() {
            let guard = day.read().await;
            events.extend(guard.reservations.iter().map(Event::admitted));
        }
        let kept = events.len();

        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Compact { events, response: tx })
            .await
            .map_err(|_| EngineError::Storage("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::Storage("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::Storage(e.to_string()))?;

        metrics::counter!(crate::observability::WAL_COMPACTIONS_TOTAL).increment(1);
        debug!("compacted WAL to {kept} events");
        Ok(())
    }

    pub async fn wal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self
            .wal_tx
            .send(WalCommand::AppendsSinceCompact { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}

fn block_from_event(event: Event) -> ReservationBlock {
    match event {
        Event::ReservationAdmitted {
            id,
            room_id,
            date,
            span,
            user,
        } => ReservationBlock {
            id,
            room_id,
            date,
            span,
            user,
        },
    }
}

#[async_trait]
impl ReservationStore for Ledger {
    async fn reservations(&self, key: DayKey) -> Result<Vec<ReservationBlock>, EngineError> {
        match self.existing_day(&key) {
            Some(day) => Ok(day.read().await.reservations.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn insert_if_free(
        &self,
        candidate: ReservationBlock,
        check: AdmissionCheck<'_>,
    ) -> Result<Vec<ReservationBlock>, EngineError> {
        // Gate before day lock; compaction takes them in the same order.
        let _gate = self.commit_gate.read().await;
        let day = self.day(candidate.key());
        let mut guard = day.write().await;

        check(&guard.reservations)?;
        if guard.reservations.len() >= MAX_RESERVATIONS_PER_DAY {
            return Err(EngineError::LimitExceeded("too many reservations for this room and day"));
        }

        self.wal_append(&Event::admitted(&candidate)).await?;
        guard.insert(candidate);
        metrics::gauge!(crate::observability::RESERVATIONS_STORED).increment(1.0);

        Ok(guard.reservations.clone())
    }
}
