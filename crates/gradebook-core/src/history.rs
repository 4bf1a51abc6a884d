//! The grade audit trail.
//!
//! Every grade-affecting write appends one [`GradeHistory`] row. Rows are
//! never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actor name recorded when no authenticated user drove the change.
pub const SYSTEM_ACTOR: &str = "SYSTEM";

/// Reason recorded for a manual activity grade without an explicit reason.
pub const ACTIVITY_GRADE_REASON: &str = "Activity grade update";

/// Reason recorded when the engine persists a computed term grade.
pub const TERM_GRADE_REASON: &str = "Term grade calculation";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeHistory {
  pub history_id:    Uuid,
  pub student_id:    Uuid,
  pub subject_id:    Uuid,
  /// The activity id for grade entry, the term id for term recomputation.
  pub assessment_id: Uuid,
  pub grade_value:   f64,
  pub old_value:     Option<f64>,
  pub modified_by:   String,
  pub reason:        String,
  /// Server-assigned; never changes after creation.
  pub recorded_at:   DateTime<Utc>,
}

/// Who made a grade-affecting write and why. The store turns this into a
/// [`GradeHistory`] row inside the same transaction as the write, filling in
/// the previous value, the id and the timestamp itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audit {
  pub modified_by: String,
  pub reason:      String,
}

impl Audit {
  pub fn new(modified_by: impl Into<String>, reason: impl Into<String>) -> Self {
    Self { modified_by: modified_by.into(), reason: reason.into() }
  }

  /// A change made by the engine itself rather than a person.
  pub fn system(reason: impl Into<String>) -> Self { Self::new(SYSTEM_ACTOR, reason) }
}
