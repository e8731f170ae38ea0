//! Rollcall - cohort attendance tracking CLI
//!
//! The `rollcall` command manages cohorts mirrored from an external
//! classroom provider and their dated attendance events.
//!
//! ## Commands
//!
//! - `sync`: Mirror a course's roster from the classroom provider
//! - `cohort`: Inspect locally mirrored cohorts
//! - `courses`: Discover active courses upstream
//! - `event`: Create, inspect, update, and delete attendance events
//! - `present`: Record or revoke attendance on an event
//! - `stats`: Attendance statistics for an event

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use rollcall_core::{AttendanceEventManager, Credentials, EventId, EventPatch, RosterSource};
use rollcall_roster::ClassroomClient;
use rollcall_state::SurrealStore;

type Manager = AttendanceEventManager<SurrealStore, SurrealStore, ClassroomClient>;

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(author = "Rollcall Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cohort attendance tracking backed by an external classroom roster", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// OAuth access token for the classroom provider
    #[arg(
        long,
        global = true,
        env = "CLASSROOM_ACCESS_TOKEN",
        hide_env_values = true
    )]
    access_token: Option<String>,

    /// OAuth refresh token for the classroom provider
    #[arg(
        long,
        global = true,
        env = "CLASSROOM_REFRESH_TOKEN",
        hide_env_values = true
    )]
    refresh_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror a course's roster from the classroom provider
    Sync {
        /// External course id
        course_id: String,
    },

    /// Locally mirrored cohorts
    Cohort {
        #[command(subcommand)]
        action: CohortAction,
    },

    /// Discover the caller's active courses upstream
    Courses {
        /// Filter by a name/description substring
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Attendance events
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// Present-set mutations on an event
    Present {
        #[command(subcommand)]
        action: PresentAction,
    },

    /// Attendance statistics for an event
    Stats {
        /// Event id
        event_id: String,
    },
}

#[derive(Subcommand)]
enum CohortAction {
    /// Show one mirrored cohort
    Get {
        /// Cohort (course) id
        cohort_id: String,
    },

    /// List all mirrored cohorts
    List,
}

#[derive(Subcommand)]
enum EventAction {
    /// Create a dated attendance event for a cohort
    Create {
        /// Cohort (course) id
        #[arg(long)]
        cohort: String,

        /// Session timestamp (RFC 3339, e.g. 2024-03-01T10:00:00Z)
        #[arg(long)]
        date: DateTime<Utc>,

        /// Student id to record present (repeatable)
        #[arg(long = "present", value_name = "STUDENT_ID")]
        present: Vec<String>,
    },

    /// Show one event
    Get {
        /// Event id
        event_id: String,
    },

    /// List a cohort's events, date ascending
    List {
        /// Cohort (course) id
        cohort_id: String,
    },

    /// Update an event's date and/or present list
    Update {
        /// Event id
        event_id: String,

        /// Replacement timestamp (RFC 3339)
        #[arg(long)]
        date: Option<DateTime<Utc>>,

        /// Replacement present list (repeatable; replaces, never merges)
        #[arg(long = "present", value_name = "STUDENT_ID")]
        present: Option<Vec<String>>,
    },

    /// Delete an event
    Delete {
        /// Event id
        event_id: String,
    },
}

#[derive(Subcommand)]
enum PresentAction {
    /// Record one or more students present
    Add {
        /// Event id
        event_id: String,

        /// Student ids to add
        #[arg(required = true, num_args = 1..)]
        student_ids: Vec<String>,
    },

    /// Remove one or more students from the present set
    Remove {
        /// Event id
        event_id: String,

        /// Student ids to remove
        #[arg(required = true, num_args = 1..)]
        student_ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    rollcall_core::init_tracing(cli.json, level);

    // Initialize collaborators
    let store = SurrealStore::from_env()
        .await
        .context("Failed to connect to rollcall database")?;
    let roster = ClassroomClient::from_env();
    let manager: Manager = AttendanceEventManager::new(store.clone(), store, roster.clone());

    let creds = credentials(cli.access_token, cli.refresh_token);

    match cli.command {
        Commands::Sync { course_id } => cmd_sync(&manager, &course_id, &creds?).await,
        Commands::Cohort { action } => match action {
            CohortAction::Get { cohort_id } => cmd_cohort_get(&manager, &cohort_id).await,
            CohortAction::List => cmd_cohort_list(&manager).await,
        },
        Commands::Courses { query } => cmd_courses(&roster, query.as_deref(), &creds?).await,
        Commands::Event { action } => match action {
            EventAction::Create {
                cohort,
                date,
                present,
            } => cmd_event_create(&manager, &cohort, date, &present, &creds?).await,
            EventAction::Get { event_id } => cmd_event_get(&manager, &event_id).await,
            EventAction::List { cohort_id } => cmd_event_list(&manager, &cohort_id).await,
            EventAction::Update {
                event_id,
                date,
                present,
            } => cmd_event_update(&manager, &event_id, date, present, &creds?).await,
            EventAction::Delete { event_id } => cmd_event_delete(&manager, &event_id).await,
        },
        Commands::Present { action } => match action {
            PresentAction::Add {
                event_id,
                student_ids,
            } => cmd_present_add(&manager, &event_id, &student_ids, &creds?).await,
            PresentAction::Remove {
                event_id,
                student_ids,
            } => cmd_present_remove(&manager, &event_id, &student_ids).await,
        },
        Commands::Stats { event_id } => cmd_stats(&manager, &event_id).await,
    }
}

/// Build provider credentials from flag/env input.
fn credentials(access_token: Option<String>, refresh_token: Option<String>) -> Result<Credentials> {
    let access_token = access_token
        .context("Missing access token: pass --access-token or set CLASSROOM_ACCESS_TOKEN")?;

    let mut creds = Credentials::new(access_token);
    if let Some(refresh_token) = refresh_token {
        creds = creds.with_refresh_token(refresh_token);
    }
    Ok(creds)
}

/// Mirror a course's roster into the local cohort store
async fn cmd_sync(manager: &Manager, course_id: &str, credentials: &Credentials) -> Result<()> {
    info!("Syncing course {} from the classroom provider", course_id);

    match manager
        .sync()
        .sync_from_source(course_id, credentials)
        .await?
    {
        Some(cohort) => {
            println!("{}", serde_json::to_string_pretty(&cohort)?);
            Ok(())
        }
        None => anyhow::bail!(
            "course {} could not be synced (absent upstream or provider unreachable)",
            course_id
        ),
    }
}

/// Show one mirrored cohort
async fn cmd_cohort_get(manager: &Manager, cohort_id: &str) -> Result<()> {
    let cohort = manager
        .sync()
        .find_local(cohort_id)
        .await?
        .with_context(|| format!("cohort not mirrored locally: {cohort_id} (sync it first)"))?;

    println!("{}", serde_json::to_string_pretty(&cohort)?);
    Ok(())
}

/// List all mirrored cohorts
async fn cmd_cohort_list(manager: &Manager) -> Result<()> {
    let cohorts = manager.sync().list_local().await?;
    println!("{}", serde_json::to_string_pretty(&cohorts)?);
    Ok(())
}

/// Discover active courses upstream
async fn cmd_courses(
    roster: &ClassroomClient,
    query: Option<&str>,
    credentials: &Credentials,
) -> Result<()> {
    let courses = roster.search_courses(query, credentials).await;
    if courses.is_empty() {
        info!("No courses returned (none match, or the provider was unreachable)");
    }
    println!("{}", serde_json::to_string_pretty(&courses)?);
    Ok(())
}

/// Create an attendance event
async fn cmd_event_create(
    manager: &Manager,
    cohort_id: &str,
    date: DateTime<Utc>,
    present: &[String],
    credentials: &Credentials,
) -> Result<()> {
    let event = manager.create(cohort_id, date, present, credentials).await?;
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

/// Show one event
async fn cmd_event_get(manager: &Manager, event_id: &str) -> Result<()> {
    let event = manager.get(&EventId(event_id.to_string())).await?;
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

/// List a cohort's events
async fn cmd_event_list(manager: &Manager, cohort_id: &str) -> Result<()> {
    let events = manager.list_by_cohort(cohort_id).await?;
    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}

/// Update an event's date and/or present list
async fn cmd_event_update(
    manager: &Manager,
    event_id: &str,
    date: Option<DateTime<Utc>>,
    present: Option<Vec<String>>,
    credentials: &Credentials,
) -> Result<()> {
    let patch = EventPatch {
        date,
        present_ids: present,
    };

    let event = manager
        .update(&EventId(event_id.to_string()), patch, credentials)
        .await?;
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

/// Delete an event
async fn cmd_event_delete(manager: &Manager, event_id: &str) -> Result<()> {
    manager.delete(&EventId(event_id.to_string())).await?;
    println!("Deleted event {}", event_id);
    Ok(())
}

/// Record students present on an event
async fn cmd_present_add(
    manager: &Manager,
    event_id: &str,
    student_ids: &[String],
    credentials: &Credentials,
) -> Result<()> {
    let id = EventId(event_id.to_string());

    let event = match student_ids {
        [single] => manager.add_present(&id, single, credentials).await?,
        many => manager.add_present_many(&id, many, credentials).await?,
    };

    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

/// Remove students from an event's present set
async fn cmd_present_remove(manager: &Manager, event_id: &str, student_ids: &[String]) -> Result<()> {
    let id = EventId(event_id.to_string());

    let event = match student_ids {
        [single] => manager.remove_present(&id, single).await?,
        many => manager.remove_present_many(&id, many).await?,
    };

    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

/// Attendance statistics for an event
async fn cmd_stats(manager: &Manager, event_id: &str) -> Result<()> {
    let stats = manager.stats(&EventId(event_id.to_string())).await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn in_memory_manager() -> Manager {
        let store = SurrealStore::in_memory().await.expect("in-memory store");
        AttendanceEventManager::new(store.clone(), store, ClassroomClient::from_env())
    }

    #[test]
    fn credentials_require_an_access_token() {
        let err = credentials(None, Some("refresh".to_string())).unwrap_err();
        assert!(err.to_string().contains("access token"));
    }

    #[test]
    fn credentials_carry_both_tokens() {
        let creds = credentials(Some("access".to_string()), Some("refresh".to_string())).unwrap();
        assert_eq!(creds.access_token, "access");
        assert_eq!(creds.refresh_token.as_deref(), Some("refresh"));
    }

    #[tokio::test]
    async fn cmd_cohort_list_handles_empty_store() {
        let manager = in_memory_manager().await;
        cmd_cohort_list(&manager).await.expect("list");
    }

    #[tokio::test]
    async fn cmd_event_get_unknown_id_fails() {
        let manager = in_memory_manager().await;
        let result = cmd_event_get(&manager, "no-such-event").await;
        assert!(result.is_err());
    }
}
