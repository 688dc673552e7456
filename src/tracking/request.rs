//! Request correlation tracking
//!
//! Every generation attempt gets a server-side UUID. Callers may also pass
//! their own correlation id; it is validated and stored alongside, and either
//! id can later be used to close or look up the record.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{IntegratorError, IntegratorResult};

/// Maximum accepted length of a caller-supplied id
pub const MAX_CALLER_ID_LEN: usize = 512;

/// Default number of stored records
pub const DEFAULT_MAX_STORED: usize = 1000;

/// Lifecycle of a tracked request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Completed,
    Failed,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Metadata stored for one logical call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub request_id: String,
    pub client_request_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub model: Option<String>,
    pub provider: Option<String>,
    pub endpoint: Option<String>,
    pub status: RequestStatus,
    /// Seconds
    pub response_time: Option<f64>,
    pub error: Option<String>,
}

/// Check a caller-supplied id, returning the reason it is rejected
pub fn check_caller_id(id: &str) -> IntegratorResult<()> {
    if id.is_empty() {
        return Err(IntegratorError::InvalidCallerId("empty".to_string()));
    }
    if !id.is_ascii() {
        return Err(IntegratorError::InvalidCallerId("contains non-ASCII characters".to_string()));
    }
    if id.len() > MAX_CALLER_ID_LEN {
        return Err(IntegratorError::InvalidCallerId(format!(
            "length {} exceeds {}",
            id.len(),
            MAX_CALLER_ID_LEN
        )));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct TrackerTable {
    /// Keyed by server id, oldest first
    records: IndexMap<String, RequestMetadata>,
    /// Caller id -> server id
    by_client_id: HashMap<String, String>,
}

impl TrackerTable {
    fn resolve(&self, id: &str) -> Option<String> {
        if self.records.contains_key(id) {
            Some(id.to_string())
        } else {
            self.by_client_id.get(id).cloned()
        }
    }

    fn forget_client_id(&mut self, record: &RequestMetadata) {
        if let Some(client_id) = &record.client_request_id {
            if self.by_client_id.get(client_id) == Some(&record.request_id) {
                self.by_client_id.remove(client_id);
            }
        }
    }
}

/// Bounded in-memory table of request metadata
#[derive(Debug)]
pub struct RequestTracker {
    table: Mutex<TrackerTable>,
    max_stored: usize,
}

impl RequestTracker {
    pub fn new(max_stored: usize) -> Self {
        Self {
            table: Mutex::new(TrackerTable::default()),
            max_stored: max_stored.max(1),
        }
    }

    /// Generate a fresh server-side request id
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// True iff the id is 1-512 ASCII characters
    pub fn validate_caller_id(id: &str) -> bool {
        check_caller_id(id).is_ok()
    }

    /// Open a pending record.
    ///
    /// An invalid caller id is dropped with a warning; the call proceeds with
    /// only the server id.
    pub fn open(
        &self,
        caller_id: Option<&str>,
        model: Option<&str>,
        provider: Option<&str>,
        endpoint: Option<&str>,
    ) -> RequestMetadata {
        let client_request_id = caller_id.and_then(|id| match check_caller_id(id) {
            Ok(()) => Some(id.to_string()),
            Err(e) => {
                warn!(error = %e, "Dropping caller request id");
                None
            }
        });

        let metadata = RequestMetadata {
            request_id: Self::generate_id(),
            client_request_id,
            created_at: Utc::now(),
            model: model.map(String::from),
            provider: provider.map(String::from),
            endpoint: endpoint.map(String::from),
            status: RequestStatus::Pending,
            response_time: None,
            error: None,
        };

        let mut table = self.table.lock();
        if table.records.len() >= self.max_stored {
            let evicted = Self::evict_oldest(&mut table, self.evict_batch());
            debug!(evicted, capacity = self.max_stored, "Request tracker full, evicted oldest records");
        }

        if let Some(client_id) = &metadata.client_request_id {
            table.by_client_id.insert(client_id.clone(), metadata.request_id.clone());
        }
        table.records.insert(metadata.request_id.clone(), metadata.clone());

        metadata
    }

    /// Move a pending record to a terminal status.
    ///
    /// Returns false when the id is unknown (never stored or already evicted)
    /// or the record was already closed.
    pub fn close(
        &self,
        id: &str,
        status: RequestStatus,
        response_time: Option<f64>,
        error: Option<String>,
    ) -> bool {
        let mut table = self.table.lock();
        let Some(request_id) = table.resolve(id) else {
            debug!(request_id = %id, "Close for unknown request id");
            return false;
        };
        let Some(record) = table.records.get_mut(&request_id) else {
            return false;
        };

        if record.status.is_terminal() {
            warn!(request_id = %request_id, status = %record.status, "Request already closed");
            return false;
        }

        record.status = status;
        record.response_time = response_time;
        record.error = error;
        true
    }

    /// Look up a record by server id or caller id
    pub fn get(&self, id: &str) -> Option<RequestMetadata> {
        let table = self.table.lock();
        let request_id = table.resolve(id)?;
        table.records.get(&request_id).cloned()
    }

    /// Remove records older than `max_age`, returning how many were removed
    pub fn sweep(&self, max_age: Duration) -> usize {
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        let cutoff = Utc::now().checked_sub_signed(max_age).unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut table = self.table.lock();
        let before = table.records.len();

        let expired: Vec<RequestMetadata> = table
            .records
            .values()
            .filter(|r| r.created_at < cutoff)
            .cloned()
            .collect();
        for record in &expired {
            table.records.shift_remove(&record.request_id);
            table.forget_client_id(record);
        }

        let removed = before - table.records.len();
        if removed > 0 {
            debug!(removed, remaining = table.records.len(), "Swept old request records");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.table.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.max_stored
    }

    /// Number of records evicted when the table is full (10%, at least one)
    fn evict_batch(&self) -> usize {
        (self.max_stored / 10).max(1)
    }

    fn evict_oldest(table: &mut TrackerTable, count: usize) -> usize {
        let count = count.min(table.records.len());
        let evicted: Vec<RequestMetadata> = table.records.drain(..count).map(|(_, r)| r).collect();
        for record in &evicted {
            table.forget_client_id(record);
        }
        evicted.len()
    }
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STORED)
    }
}
