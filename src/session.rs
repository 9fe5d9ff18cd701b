use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::aggregate::{self, ScatterPoint};
use crate::identity::{Identity, IdentityError};
use crate::record::{ExpenseRecord, RecordDraft, ValidationError};
use crate::storage::{Storage, StorageError};

// Top-level key remembering the last active identity between runs.
const CURRENT_USER_KEY: &str = "currentUser";

/// A single-identity expense session over a storage backend.
///
/// At most one identity's record list is resident at a time. Every mutating
/// operation that succeeds ends with a full snapshot of the list written to
/// the identity's partition, so the resident list and the persisted one never
/// diverge across a call boundary. While no identity is active, mutations
/// leave both the session and the store untouched.
pub struct Session {
    storage: Box<dyn Storage>,
    active: Option<Active>,
}

struct Active {
    identity: Identity,
    records: Vec<ExpenseRecord>,
    pending_edit: Option<usize>,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid record field")]
    Validation(#[from] ValidationError),
    #[error("invalid identity")]
    Identity(#[from] IdentityError),
    #[error("no record at index {index} (list has {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("storage backend failed")]
    Storage(#[from] StorageError),
    #[error("could not serialize record list")]
    Serialize(#[from] serde_json::Error),
}

impl Session {
    /// A logged-out session over the given backend.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Session {
            storage,
            active: None,
        }
    }

    /// Restore the last active identity, if the backend remembers one.
    ///
    /// The stored identity was normalized at login, so it is trusted here
    /// without re-validation. With no stored identity this is equivalent to
    /// `new`.
    pub fn resume(storage: Box<dyn Storage>) -> Result<Self, SessionError> {
        let stored = storage.get(CURRENT_USER_KEY)?;
        let mut session = Session::new(storage);
        if let Some(identity) = Identity::resume(stored.as_deref()) {
            debug!("resuming session for {}", identity);
            session.activate(identity)?;
        }
        Ok(session)
    }

    /// Select an identity and load its partition.
    ///
    /// The raw string is trimmed and lowercased; partitions are keyed by the
    /// normalized form, so `Alice@X.com` and `alice@x.com` share one list.
    /// Replaces any previously active identity.
    pub fn login(&mut self, raw: &str) -> Result<(), SessionError> {
        let identity = Identity::select(raw)?;
        self.storage.set(CURRENT_USER_KEY, identity.as_str())?;
        self.activate(identity)
    }

    /// Drop the active identity and its resident list.
    ///
    /// The persisted partition is left untouched; only the resumption marker
    /// is removed.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.storage.remove(CURRENT_USER_KEY)?;
        self.active = None;
        Ok(())
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.active.as_ref().map(|a| &a.identity)
    }

    /// The resident record list in insertion order; empty while logged out.
    pub fn records(&self) -> &[ExpenseRecord] {
        match &self.active {
            Some(active) => &active.records,
            None => &[],
        }
    }

    /// Validate a draft and append it to the list.
    ///
    /// A validation failure reports the offending field and mutates nothing.
    /// While logged out the (validated) record is discarded.
    pub fn add(&mut self, draft: &RecordDraft) -> Result<(), SessionError> {
        let record = draft.validate()?;
        match self.active.as_mut() {
            Some(active) => active.records.push(record),
            None => {
                debug!("add ignored: no active identity");
                return Ok(());
            }
        }
        self.persist()
    }

    /// Validate a draft and replace the record at `index` in place.
    ///
    /// Other elements keep their positions. Clears an edit cursor pointing at
    /// `index`.
    pub fn update(&mut self, index: usize, draft: &RecordDraft) -> Result<(), SessionError> {
        let record = draft.validate()?;
        let len = self.records().len();
        match self.active.as_mut() {
            Some(active) if index < len => {
                active.records[index] = record;
                if active.pending_edit == Some(index) {
                    active.pending_edit = None;
                }
            }
            _ => return Err(SessionError::IndexOutOfBounds { index, len }),
        }
        self.persist()
    }

    /// Remove the record at `index`, shifting later records left by one.
    ///
    /// Any pending edit cursor is invalidated: the index it held may now name
    /// a different record, so it cannot be trusted after a removal.
    pub fn remove(&mut self, index: usize) -> Result<ExpenseRecord, SessionError> {
        let len = self.records().len();
        let removed = match self.active.as_mut() {
            Some(active) if index < len => {
                active.pending_edit = None;
                active.records.remove(index)
            }
            _ => return Err(SessionError::IndexOutOfBounds { index, len }),
        };
        self.persist()?;
        Ok(removed)
    }

    /// Start editing the record at `index`; returns it for form prefill.
    pub fn begin_edit(&mut self, index: usize) -> Result<&ExpenseRecord, SessionError> {
        let len = self.records().len();
        match self.active.as_mut() {
            Some(active) if index < len => {
                active.pending_edit = Some(index);
                Ok(&active.records[index])
            }
            _ => Err(SessionError::IndexOutOfBounds { index, len }),
        }
    }

    /// Abandon a pending edit without touching the list.
    pub fn cancel_edit(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.pending_edit = None;
        }
    }

    /// Index of the record currently being edited, if any.
    pub fn pending_edit(&self) -> Option<usize> {
        self.active.as_ref().and_then(|a| a.pending_edit)
    }

    /// Submit a filled form: updates in place while an edit is pending,
    /// appends otherwise. Either way the session ends up with no pending
    /// edit.
    pub fn submit(&mut self, draft: &RecordDraft) -> Result<(), SessionError> {
        match self.pending_edit() {
            Some(index) => self.update(index, draft),
            None => self.add(draft),
        }
    }

    pub fn totals_by_category(&self) -> Vec<(String, Decimal)> {
        aggregate::totals_by_category(self.records())
    }

    pub fn totals_by_date(&self) -> BTreeMap<NaiveDate, Decimal> {
        aggregate::totals_by_date(self.records())
    }

    pub fn scatter_series(&self) -> Vec<ScatterPoint> {
        aggregate::scatter_series(self.records())
    }

    fn activate(&mut self, identity: Identity) -> Result<(), SessionError> {
        let records = self.load_partition(&identity)?;
        debug!("loaded {} records for {}", records.len(), identity);
        self.active = Some(Active {
            identity,
            records,
            pending_edit: None,
        });
        Ok(())
    }

    fn load_partition(&self, identity: &Identity) -> Result<Vec<ExpenseRecord>, SessionError> {
        let payload = match self.storage.get(&identity.partition_key())? {
            Some(payload) => payload,
            None => return Ok(Vec::new()),
        };
        // A corrupt payload means "no data", never a fatal error.
        match serde_json::from_str(&payload) {
            Ok(records) => Ok(records),
            Err(err) => {
                warn!("discarding unreadable record list for {}: {}", identity, err);
                Ok(Vec::new())
            }
        }
    }

    /// Write the full resident list to the active partition. No-op while
    /// logged out.
    fn persist(&mut self) -> Result<(), SessionError> {
        let (key, payload) = match &self.active {
            Some(active) => (
                active.identity.partition_key(),
                serde_json::to_string(&active.records)?,
            ),
            None => return Ok(()),
        };
        self.storage.set(&key, &payload)?;
        Ok(())
    }
}
