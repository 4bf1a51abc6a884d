//! Reference records owned by the surrounding school-management system:
//! programs, classes, subjects, activities, and the submissions graded
//! against them.
//!
//! The engine only reads these, except for [`ActivitySubmission`], which
//! grade entry upserts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{assessment::SubjectAssessmentConfig, lookup::effective_weight};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
  pub program_id:           Uuid,
  pub name:                 String,
  /// The program's assessment system, if one has been configured.
  pub assessment_system_id: Option<Uuid>,
}

/// A class: a cohort of students taking a fixed list of subjects under one
/// program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
  pub class_id:          Uuid,
  pub program_id:        Uuid,
  pub name:              String,
  /// Stamped when the class's gradebook is initialised.
  pub term_structure_id: Option<Uuid>,
  /// Subjects taught in this class, in display order.
  pub subject_ids:       Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id: Uuid,
  pub name:       String,
  /// Credit load; `None`, negative or non-finite means the subject contributes
  /// nothing to GPA.
  pub credits:    Option<f64>,
  pub config:     Option<SubjectAssessmentConfig>,
}

impl Subject {
  pub fn credit_load(&self) -> f64 {
    self.credits.map_or(0.0, effective_weight)
  }
}

/// A gradable unit of work within a subject and assessment period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
  pub activity_id:     Uuid,
  pub subject_id:      Uuid,
  pub period_id:       Uuid,
  pub title:           String,
  /// Looked up in the subject's weightage distribution, e.g. `"quiz"`.
  pub assessment_type: String,
  pub total_marks:     f64,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
  Pending,
  Submitted,
  Graded,
}

/// One student's submission for one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySubmission {
  pub activity_id:    Uuid,
  pub student_id:     Uuid,
  pub obtained_marks: Option<f64>,
  /// Overrides the activity's `total_marks` when present.
  pub total_marks:    Option<f64>,
  pub status:         SubmissionStatus,
  pub graded_at:      Option<DateTime<Utc>>,
  pub graded_by:      Option<String>,
}

/// A graded submission joined with the activity it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedWork {
  pub submission: ActivitySubmission,
  pub activity:   Activity,
}

impl GradedWork {
  pub fn obtained_marks(&self) -> f64 {
    self.submission.obtained_marks.unwrap_or(0.0)
  }

  pub fn total_marks(&self) -> f64 {
    self
      .submission
      .total_marks
      .unwrap_or(self.activity.total_marks)
  }
}

/// Input to [`crate::store::GradebookStore::record_activity_grade`].
/// The graded timestamp is always set by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeEntry {
  pub activity_id:    Uuid,
  pub student_id:     Uuid,
  pub obtained_marks: f64,
  pub modified_by:    String,
  pub reason:         Option<String>,
}
