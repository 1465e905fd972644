use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Upper bound on `summary`, counted in characters.
pub const MAX_SUMMARY_LEN: usize = 2500;

/// `0001-01-01T00:00:00Z` in seconds since the Unix epoch, the zero instant clients
/// send for an unset timestamp.
const UNSET_TIMESTAMP: i64 = -62_135_596_800;

/// Request body for creating or updating a task.
///
/// Any `technician_id` a client sends is not part of this type and is dropped during
/// deserialization; ownership always comes from the authenticated identity.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Free-text description of the work performed.
    #[validate(length(
        max = "MAX_SUMMARY_LEN",
        message = "Summary must not exceed 2500 characters"
    ))]
    pub summary: String,

    /// When the work was performed. Required on creation; on update an absent
    /// value keeps the stored one.
    pub performed_at: Option<DateTime<Utc>>,
}

/// True for the zero instant `0001-01-01T00:00:00Z`, which counts as no timestamp.
pub fn is_unset(timestamp: &DateTime<Utc>) -> bool {
    timestamp.timestamp() == UNSET_TIMESTAMP && timestamp.timestamp_subsec_nanos() == 0
}

impl TaskInput {
    /// `performed_at` if it was sent and is not the zero instant.
    pub fn performed_at_if_set(&self) -> Option<DateTime<Utc>> {
        self.performed_at.filter(|at| !is_unset(at))
    }
}

/// A maintenance task as stored and as returned on creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The technician who performed, and therefore owns, the task.
    pub technician_id: i64,
    pub summary: String,
    pub performed_at: DateTime<Utc>,
}

/// A row of `GET /tasks`: the task joined with its technician's username.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TaskListing {
    pub id: Uuid,
    pub summary: String,
    pub performed_at: DateTime<Utc>,
    pub technician_id: i64,
    pub technician_name: String,
}

/// Which tasks a listing is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// Only tasks owned by this technician.
    Technician(i64),
    /// Every task.
    All,
}

impl Task {
    /// Builds a new task owned by `technician_id` with a fresh id.
    pub fn new(summary: String, performed_at: DateTime<Utc>, technician_id: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            technician_id,
            summary,
            performed_at,
        }
    }
}
