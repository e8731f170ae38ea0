//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryCohortStore` and `MemoryEventStore` that satisfy the
//! trait contracts without any external dependencies. Both are `Clone`
//! with shared interior state, so tests can keep a handle to the store
//! they hand to the coordinator and inspect it afterwards.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryCohortStore
// ---------------------------------------------------------------------------

/// In-memory cohort store backed by a `HashMap<cohort_id, Cohort>`.
#[derive(Debug, Default, Clone)]
pub struct MemoryCohortStore {
    cohorts: Arc<Mutex<HashMap<String, Cohort>>>,
}

impl MemoryCohortStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CohortStore for MemoryCohortStore {
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Cohort>> {
        let cohorts = self.cohorts.lock().unwrap();
        Ok(cohorts.get(id).cloned())
    }

    async fn find_all(&self) -> StorageResult<Vec<Cohort>> {
        let cohorts = self.cohorts.lock().unwrap();
        let mut all: Vec<Cohort> = cohorts.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn save(&self, cohort: Cohort) -> StorageResult<Cohort> {
        let mut cohorts = self.cohorts.lock().unwrap();
        cohorts.insert(cohort.id.clone(), cohort.clone());
        Ok(cohort)
    }

    async fn update_rosters(
        &self,
        id: &str,
        teacher_ids: Vec<String>,
        student_ids: Vec<String>,
    ) -> StorageResult<Cohort> {
        let mut cohorts = self.cohorts.lock().unwrap();
        let cohort = cohorts
            .get_mut(id)
            .ok_or_else(|| StorageError::CohortNotFound {
                cohort_id: id.to_string(),
            })?;
        cohort.teacher_ids = teacher_ids;
        cohort.student_ids = student_ids;
        cohort.updated_at = Utc::now();
        Ok(cohort.clone())
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let mut cohorts = self.cohorts.lock().unwrap();
        cohorts.remove(id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryEventStore
// ---------------------------------------------------------------------------

/// In-memory event store backed by a `HashMap<event_id, AttendanceEvent>`.
#[derive(Debug, Default, Clone)]
pub struct MemoryEventStore {
    events: Arc<Mutex<HashMap<String, AttendanceEvent>>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn find_by_id(&self, id: &EventId) -> StorageResult<Option<AttendanceEvent>> {
        let events = self.events.lock().unwrap();
        Ok(events.get(&id.0).cloned())
    }

    async fn find_by_cohort(&self, cohort_id: &str) -> StorageResult<Vec<AttendanceEvent>> {
        let events = self.events.lock().unwrap();
        let mut matching: Vec<AttendanceEvent> = events
            .values()
            .filter(|e| e.cohort_id == cohort_id)
            .cloned()
            .collect();
        matching.sort_by_key(|e| e.date);
        Ok(matching)
    }

    async fn find_by_cohort_and_day(
        &self,
        cohort_id: &str,
        date: DateTime<Utc>,
    ) -> StorageResult<Option<AttendanceEvent>> {
        let (start, end) = day_bounds(date);
        let events = self.events.lock().unwrap();
        Ok(events
            .values()
            .find(|e| e.cohort_id == cohort_id && e.date >= start && e.date <= end)
            .cloned())
    }

    async fn save(&self, event: AttendanceEvent) -> StorageResult<AttendanceEvent> {
        let mut events = self.events.lock().unwrap();
        events.insert(event.id.0.clone(), event.clone());
        Ok(event)
    }

    async fn update(&self, event: &AttendanceEvent) -> StorageResult<AttendanceEvent> {
        let mut events = self.events.lock().unwrap();
        if !events.contains_key(&event.id.0) {
            return Err(StorageError::EventNotFound {
                event_id: event.id.0.clone(),
            });
        }
        events.insert(event.id.0.clone(), event.clone());
        Ok(event.clone())
    }

    async fn delete(&self, id: &EventId) -> StorageResult<()> {
        let mut events = self.events.lock().unwrap();
        events.remove(&id.0);
        Ok(())
    }
}
