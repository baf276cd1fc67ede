//! Extraction sessions.
//!
//! An [`ExtractionSession`] owns the title and the ordered records of one
//! run. It is created when extraction is triggered and consumed by the
//! archive build. A [`SessionGate`] makes sure only one session is active at
//! a time for a given trigger surface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ExtractError, Result};
use crate::extract::ConversationRecord;

/// Records gathered by one extraction run.
#[derive(Debug)]
pub struct ExtractionSession {
    title: String,
    records: Vec<ConversationRecord>,
    next_id: u64,
}

impl ExtractionSession {
    /// Start a session whose first record is numbered `sequence_base`.
    pub fn new(title: impl Into<String>, sequence_base: u64) -> Self {
        Self {
            title: title.into(),
            records: Vec::new(),
            next_id: sequence_base,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Id the next appended record must carry.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn records(&self) -> &[ConversationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append the next record.
    ///
    /// Ids are assigned by the caller from [`next_id`](Self::next_id) so the
    /// extractor can name media after them before the record exists.
    pub fn append(&mut self, record: ConversationRecord) {
        debug_assert_eq!(record.id, self.next_id, "record ids must be gapless");
        self.next_id = record.id.saturating_add(1);
        self.records.push(record);
    }

    /// Consume the session, yielding its title and records.
    pub fn finish(self) -> (String, Vec<ConversationRecord>) {
        (self.title, self.records)
    }
}

/// Guard against concurrent sessions.
///
/// Clones share one flag. [`SessionGate::acquire`] fails with
/// [`ExtractError::SessionInProgress`] while a [`SessionPermit`] from any
/// clone is alive.
#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    active: Arc<AtomicBool>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the gate for one session.
    pub fn acquire(&self) -> Result<SessionPermit> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ExtractError::SessionInProgress)?;
        Ok(SessionPermit {
            active: Arc::clone(&self.active),
        })
    }

    /// Whether a session currently holds the gate.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Proof that a session holds the gate; releases it on drop.
#[derive(Debug)]
pub struct SessionPermit {
    active: Arc<AtomicBool>,
}

impl Drop for SessionPermit {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}
