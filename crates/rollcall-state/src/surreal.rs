//! SurrealDB-backed implementation of the storage traits
//!
//! `SurrealStore` is a cheap-to-clone handle over one `Surreal<Any>`
//! connection and implements both `CohortStore` and `EventStore`, using
//! `schema::CohortRow` / `schema::EventRow` for persistence and converting
//! to/from the domain types at the boundary.
//!
//! Supports in-memory (tests), local SurrealKV, and remote (WebSocket)
//! connections.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::sql::Datetime as SurrealDatetime;
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

use crate::error::{StateError, StorageError};
use crate::migrations;
use crate::schema::{CohortRow, EventRow};
use crate::storage_traits::{
    day_bounds, AttendanceEvent, Cohort, CohortStore, EventId, EventStore, StorageResult,
};
use crate::Result;

/// Configuration for a remote SurrealDB connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket endpoint URL (e.g., "wss://xxx.aws-use1.surrealdb.cloud")
    pub endpoint: String,
    /// Database username
    pub username: String,
    /// Database password
    pub password: String,
    /// Namespace (default: "rollcall")
    pub namespace: String,
    /// Database name (default: "main")
    pub database: String,
    /// Whether this is a root user (true) or database user (false)
    pub is_root: bool,
}

impl DbConfig {
    /// Create a new configuration for a database user
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            namespace: "rollcall".to_string(),
            database: "main".to_string(),
            is_root: false,
        }
    }

    /// Set custom namespace
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    /// Set custom database
    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    /// Set whether this is a root user
    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - SURREALDB_ENDPOINT (required)
    /// - SURREALDB_USERNAME (required)
    /// - SURREALDB_PASSWORD (required)
    /// - SURREALDB_NAMESPACE (optional, default: "rollcall")
    /// - SURREALDB_DATABASE (optional, default: "main")
    /// - SURREALDB_ROOT (optional, default: "false")
    pub fn from_env() -> std::result::Result<Self, String> {
        let endpoint =
            std::env::var("SURREALDB_ENDPOINT").map_err(|_| "SURREALDB_ENDPOINT not set")?;
        let username =
            std::env::var("SURREALDB_USERNAME").map_err(|_| "SURREALDB_USERNAME not set")?;
        let password =
            std::env::var("SURREALDB_PASSWORD").map_err(|_| "SURREALDB_PASSWORD not set")?;
        let namespace =
            std::env::var("SURREALDB_NAMESPACE").unwrap_or_else(|_| "rollcall".to_string());
        let database = std::env::var("SURREALDB_DATABASE").unwrap_or_else(|_| "main".to_string());
        let is_root = std::env::var("SURREALDB_ROOT")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        Ok(Self {
            endpoint,
            username,
            password,
            namespace,
            database,
            is_root,
        })
    }
}

/// SurrealDB handle implementing [`CohortStore`] and [`EventStore`].
#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Any>,
}

impl SurrealStore {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `rollcall/main`, and runs `init_schema`.
    #[instrument(skip_all)]
    pub async fn in_memory() -> Result<Self> {
        let db = surrealdb::engine::any::connect("mem://")
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        db.use_ns("rollcall")
            .use_db("main")
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;

        info!("SurrealStore connected (in-memory)");
        Ok(Self { db })
    }

    /// Connect to a remote SurrealDB instance.
    #[instrument(skip(config), fields(endpoint = %config.endpoint, namespace = %config.namespace, database = %config.database))]
    pub async fn connect(config: DbConfig) -> Result<Self> {
        info!("Connecting to SurrealDB (root={})", config.is_root);

        let db = surrealdb::engine::any::connect(&config.endpoint)
            .await
            .map_err(|e| {
                StateError::Connection(format!("Failed to connect to {}: {}", config.endpoint, e))
            })?;

        if config.is_root {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| StateError::Connection(format!("Root authentication failed: {}", e)))?;
        } else {
            db.signin(Database {
                namespace: &config.namespace,
                database: &config.database,
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| {
                StateError::Connection(format!("Database authentication failed: {}", e))
            })?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| {
                StateError::Connection(format!("Failed to select namespace/database: {}", e))
            })?;

        migrations::init_schema(&db).await?;

        info!("SurrealStore connected");
        Ok(Self { db })
    }

    /// Connect using environment variables.
    ///
    /// If SURREALDB_ENDPOINT is set, connects remotely via [`DbConfig`].
    /// If SURREALDB_URL is set, connects to that URL directly.
    /// Otherwise, falls back to local persistence in `.rollcall/db`.
    #[instrument(skip_all)]
    pub async fn from_env() -> Result<Self> {
        if let Ok(config) = DbConfig::from_env() {
            info!("SurrealDB endpoint config found, connecting remotely");
            return Self::connect(config).await;
        }

        if let Ok(url) = std::env::var("SURREALDB_URL") {
            let db = surrealdb::engine::any::connect(&url)
                .await
                .map_err(|e| StateError::Connection(e.to_string()))?;

            db.use_ns("rollcall")
                .use_db("main")
                .await
                .map_err(|e| StateError::Connection(e.to_string()))?;

            migrations::init_schema(&db).await?;
            info!("SurrealStore connected ({})", url);
            return Ok(Self { db });
        }

        // Default to local persistence in .rollcall/db
        let path = ".rollcall/db";
        std::fs::create_dir_all(path).map_err(|e| {
            StateError::Connection(format!(
                "Failed to create database directory {}: {}",
                path, e
            ))
        })?;
        let url = format!("surrealkv://{}", path);
        info!(
            "No SURREALDB_ENDPOINT or SURREALDB_URL found, using local persistence: {}",
            url
        );

        let db = surrealdb::engine::any::connect(&url)
            .await
            .map_err(|e| StateError::Connection(format!("Failed to connect to {}: {}", url, e)))?;

        db.use_ns("rollcall")
            .use_db("main")
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;
        Ok(Self { db })
    }

    // -- private helpers -----------------------------------------------------

    /// Fetch a cohort row by external course id, or CohortNotFound.
    async fn fetch_cohort(&self, id: &str) -> StorageResult<CohortRow> {
        let cid = id.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM cohorts WHERE cohort_id = $cid")
            .bind(("cid", cid))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<CohortRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StorageError::CohortNotFound {
                cohort_id: id.to_string(),
            })
    }

    /// Fetch an event row by event id, or EventNotFound.
    async fn fetch_event(&self, id: &EventId) -> StorageResult<EventRow> {
        let eid = id.0.clone();
        let mut res = self
            .db
            .query("SELECT * FROM attendance_events WHERE event_id = $eid")
            .bind(("eid", eid))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<EventRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StorageError::EventNotFound {
                event_id: id.0.clone(),
            })
    }
}

#[async_trait]
impl CohortStore for SurrealStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Cohort>> {
        match self.fetch_cohort(id).await {
            Ok(row) => Ok(Some(row.into_domain())),
            Err(StorageError::CohortNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> StorageResult<Vec<Cohort>> {
        let mut res = self
            .db
            .query("SELECT * FROM cohorts ORDER BY cohort_id ASC")
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<CohortRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(CohortRow::into_domain).collect())
    }

    #[instrument(skip(self, cohort), fields(cohort_id = %cohort.id))]
    async fn save(&self, cohort: Cohort) -> StorageResult<Cohort> {
        debug!(cohort_id = %cohort.id, "saving cohort");

        // Insert-or-replace by cohort_id (last-write-wins)
        let cid = cohort.id.clone();
        self.db
            .query("DELETE FROM cohorts WHERE cohort_id = $cid")
            .bind(("cid", cid))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let row = CohortRow::from_domain(&cohort);
        let _created: Option<CohortRow> = self
            .db
            .create("cohorts")
            .content(row)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(cohort)
    }

    #[instrument(skip(self, teacher_ids, student_ids))]
    async fn update_rosters(
        &self,
        id: &str,
        teacher_ids: Vec<String>,
        student_ids: Vec<String>,
    ) -> StorageResult<Cohort> {
        let row = self.fetch_cohort(id).await?;
        let updated = row.with_rosters(teacher_ids, student_ids);
        let cid = id.to_string();

        self.db
            .query("UPDATE cohorts CONTENT $row WHERE cohort_id = $cid")
            .bind(("row", updated.clone()))
            .bind(("cid", cid))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(updated.into_domain())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> StorageResult<()> {
        let cid = id.to_string();
        self.db
            .query("DELETE FROM cohorts WHERE cohort_id = $cid")
            .bind(("cid", cid))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl EventStore for SurrealStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &EventId) -> StorageResult<Option<AttendanceEvent>> {
        match self.fetch_event(id).await {
            Ok(row) => Ok(Some(row.into_domain())),
            Err(StorageError::EventNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_cohort(&self, cohort_id: &str) -> StorageResult<Vec<AttendanceEvent>> {
        let cid = cohort_id.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM attendance_events WHERE cohort_id = $cid ORDER BY date ASC")
            .bind(("cid", cid))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<EventRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(EventRow::into_domain).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_cohort_and_day(
        &self,
        cohort_id: &str,
        date: DateTime<Utc>,
    ) -> StorageResult<Option<AttendanceEvent>> {
        let (start, end) = day_bounds(date);
        let cid = cohort_id.to_string();

        let mut res = self
            .db
            .query(
                "SELECT * FROM attendance_events \
                 WHERE cohort_id = $cid AND date >= $start AND date <= $end",
            )
            .bind(("cid", cid))
            .bind(("start", SurrealDatetime::from(start)))
            .bind(("end", SurrealDatetime::from(end)))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<EventRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().next().map(EventRow::into_domain))
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn save(&self, event: AttendanceEvent) -> StorageResult<AttendanceEvent> {
        debug!(event_id = %event.id, cohort_id = %event.cohort_id, "saving event");

        // Insert-or-replace by event_id (last-write-wins)
        let eid = event.id.0.clone();
        self.db
            .query("DELETE FROM attendance_events WHERE event_id = $eid")
            .bind(("eid", eid))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let row = EventRow::from_domain(&event);
        let _created: Option<EventRow> = self
            .db
            .create("attendance_events")
            .content(row)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(event)
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn update(&self, event: &AttendanceEvent) -> StorageResult<AttendanceEvent> {
        let existing = self.fetch_event(&event.id).await?;

        let mut row = EventRow::from_domain(event);
        row.id = existing.id;
        let eid = event.id.0.clone();

        self.db
            .query("UPDATE attendance_events CONTENT $row WHERE event_id = $eid")
            .bind(("row", row))
            .bind(("eid", eid))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(event.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &EventId) -> StorageResult<()> {
        let eid = id.0.clone();
        self.db
            .query("DELETE FROM attendance_events WHERE event_id = $eid")
            .bind(("eid", eid))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }
}
