use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::errors::RepositoryError;
use crate::models::measurement::MeasurementRecord;

/// In-memory storage implementation for BMI measurements.
///
/// Records are kept per user in insertion order, which preserves the
/// append-only history semantics without a separate sort step.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    /// Ordered measurement history, keyed by user ID
    histories: Arc<Mutex<HashMap<String, Vec<MeasurementRecord>>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self {
            histories: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Append a measurement to the owning user's history
    pub async fn store_record(
        &self,
        record: &MeasurementRecord,
    ) -> Result<MeasurementRecord, RepositoryError> {
        let mut store = self
            .histories
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        store
            .entry(record.user_id.clone())
            .or_default()
            .push(record.clone());
        Ok(record.clone())
    }

    /// Get the most recent measurement for a user
    pub async fn get_latest(
        &self,
        user_id: &str,
    ) -> Result<Option<MeasurementRecord>, RepositoryError> {
        let store = self
            .histories
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store.get(user_id).and_then(|h| h.last().cloned()))
    }

    /// Get a user's measurement by ID
    pub async fn get_by_id(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<MeasurementRecord>, RepositoryError> {
        let store = self
            .histories
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store
            .get(user_id)
            .and_then(|h| h.iter().find(|r| r.id == id).cloned()))
    }

    /// Get filtered measurements for a user
    pub async fn get_filtered(
        &self,
        user_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<MeasurementRecord>, usize), RepositoryError> {
        let store = self
            .histories
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        let sort_desc = sort_desc.unwrap_or(true);

        // First collect and filter the user's history
        let mut records: Vec<MeasurementRecord> = store
            .get(user_id)
            .map(|h| h.as_slice())
            .unwrap_or_default()
            .iter()
            .filter(|&record| {
                // Filter by date range if specified; RFC 3339 strings in UTC
                // compare correctly lexicographically
                if let Some(start_date) = start_date {
                    if record.created_at.as_str() < start_date {
                        return false;
                    }
                }

                if let Some(end_date) = end_date {
                    if record.created_at.as_str() > end_date {
                        return false;
                    }
                }

                true
            })
            .cloned()
            .collect();

        // Sort by creation time
        records.sort_by(|a, b| {
            let cmp = a.created_at.cmp(&b.created_at);
            if sort_desc {
                cmp.reverse()
            } else {
                cmp
            }
        });

        // Apply pagination
        let total = records.len();
        let offset = offset.unwrap_or(0);
        let limit = limit.unwrap_or(total);

        let page = records.into_iter().skip(offset).take(limit).collect();

        Ok((page, total))
    }
}
