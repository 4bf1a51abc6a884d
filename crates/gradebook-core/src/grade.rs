//! Computed grades and the aggregates that persist them.
//!
//! Period and term grades are derived values: they are never stored on their
//! own, only embedded inside a [`SubjectGradeRecord`] keyed by period or term
//! id. The grade structs serialise in camelCase so the stored JSON keeps the
//! `{ "<id>": { "periodId": …, "percentage": … } }` shape existing readers
//! expect.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{
  Deserialize, Deserializer, Serialize, Serializer, de::Error as _,
};
use uuid::Uuid;

use crate::{Error, assessment::AssessmentSystem};

// ─── Computed grades ─────────────────────────────────────────────────────────

/// One student's result for one subject within one assessment period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentPeriodGrade {
  pub period_id:      Uuid,
  /// Σ(submission percentage × type weight); kept for audit display.
  pub obtained_marks: f64,
  /// Σ(type weight) × 100; kept for audit display.
  pub total_marks:    f64,
  pub percentage:     f64,
  /// The period's configured share of the term, copied verbatim.
  pub weight:         f64,
  pub is_passing:     bool,
  pub grade_points:   f64,
}

/// One student's result for one subject across a whole term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTermGrade {
  pub term_id:       Uuid,
  pub student_id:    Uuid,
  pub period_grades: BTreeMap<Uuid, AssessmentPeriodGrade>,
  pub final_grade:   f64,
  /// Raw sum of the period `total_marks`. Independent of `percentage`.
  pub total_marks:   f64,
  pub percentage:    f64,
  pub is_passing:    bool,
  pub grade_points:  f64,
  pub credits:       f64,
}

// ─── Keyed container ─────────────────────────────────────────────────────────

/// Newest layout written by [`GradeMap`].
pub const GRADE_SCHEMA_VERSION: u32 = 1;

/// A map from period or term id to a computed grade.
///
/// Serialises as `{"schemaVersion": 1, "entries": {<id>: <grade>}}`. Reading
/// also accepts the un-versioned legacy layout (a bare `{<id>: <grade>}`
/// object). Layouts newer than [`GRADE_SCHEMA_VERSION`] are rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeMap<T> {
  entries: BTreeMap<Uuid, T>,
}

impl<T> GradeMap<T> {
  pub fn new() -> Self { Self { entries: BTreeMap::new() } }

  pub fn get(&self, id: &Uuid) -> Option<&T> { self.entries.get(id) }

  /// Insert or replace the entry for `id`, leaving other entries untouched.
  pub fn insert(&mut self, id: Uuid, grade: T) -> Option<T> {
    self.entries.insert(id, grade)
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &T)> {
    self.entries.iter()
  }
}

impl<T> Default for GradeMap<T> {
  fn default() -> Self { Self::new() }
}

impl<T> FromIterator<(Uuid, T)> for GradeMap<T> {
  fn from_iter<I: IntoIterator<Item = (Uuid, T)>>(iter: I) -> Self {
    Self { entries: iter.into_iter().collect() }
  }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionedRef<'a, T> {
  schema_version: u32,
  entries:        &'a BTreeMap<Uuid, T>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredGradeMap<T> {
  Versioned {
    #[serde(rename = "schemaVersion")]
    schema_version: u32,
    entries:        BTreeMap<Uuid, T>,
  },
  Legacy(BTreeMap<Uuid, T>),
}

impl<T: Serialize> Serialize for GradeMap<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    VersionedRef {
      schema_version: GRADE_SCHEMA_VERSION,
      entries:        &self.entries,
    }
    .serialize(serializer)
  }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for GradeMap<T> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    match StoredGradeMap::deserialize(deserializer)? {
      StoredGradeMap::Versioned { schema_version, entries } => {
        if schema_version > GRADE_SCHEMA_VERSION {
          return Err(D::Error::custom(Error::UnsupportedSchemaVersion {
            found: schema_version,
            known: GRADE_SCHEMA_VERSION,
          }));
        }
        Ok(Self { entries })
      }
      StoredGradeMap::Legacy(entries) => Ok(Self { entries }),
    }
  }
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// The per-subject grade store within a gradebook. Exactly one exists per
/// subject taught in the class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectGradeRecord {
  pub record_id:                Uuid,
  pub gradebook_id:             Uuid,
  pub subject_id:               Uuid,
  /// The most recently persisted term grade per term.
  pub term_grades:              GradeMap<SubjectTermGrade>,
  /// Snapshots of in-progress periods, taken before a term closes.
  pub assessment_period_grades: GradeMap<AssessmentPeriodGrade>,
  pub updated_at:               DateTime<Utc>,
}

/// The per-class aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBook {
  pub gradebook_id:         Uuid,
  pub class_id:             Uuid,
  pub assessment_system_id: Uuid,
  pub term_structure_id:    Uuid,
  pub created_at:           DateTime<Utc>,
  pub subject_records:      Vec<SubjectGradeRecord>,
}

impl GradeBook {
  pub fn record_for(&self, subject_id: Uuid) -> Option<&SubjectGradeRecord> {
    self
      .subject_records
      .iter()
      .find(|r| r.subject_id == subject_id)
  }
}

/// Input to [`crate::store::GradebookStore::create_gradebook`]. Ids and
/// timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewGradeBook {
  pub class_id:             Uuid,
  pub assessment_system_id: Uuid,
  pub term_structure_id:    Uuid,
  /// One [`SubjectGradeRecord`] is created per entry.
  pub subject_ids:          Vec<Uuid>,
}

/// Read model returned to callers fetching a class's gradebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeBookSnapshot {
  #[serde(flatten)]
  pub gradebook:         GradeBook,
  pub assessment_system: AssessmentSystem,
}

/// Durable per-(student, term) cumulative result. Upserted on every
/// recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermResult {
  pub student_id:     Uuid,
  pub term_id:        Uuid,
  pub gpa:            f64,
  pub total_credits:  f64,
  pub earned_credits: f64,
}

/// A student's term-wide result across every subject of their class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeGrade {
  pub student_id:          Uuid,
  pub term_id:             Uuid,
  pub gpa:                 f64,
  pub total_credits:       f64,
  pub earned_credits:      f64,
  pub subject_grades:      BTreeMap<Uuid, SubjectTermGrade>,
  /// Subjects with no credit load; they carry a grade but cannot move GPA.
  pub uncredited_subjects: Vec<Uuid>,
}

impl CumulativeGrade {
  pub fn term_result(&self) -> TermResult {
    TermResult {
      student_id:     self.student_id,
      term_id:        self.term_id,
      gpa:            self.gpa,
      total_credits:  self.total_credits,
      earned_credits: self.earned_credits,
    }
  }
}
