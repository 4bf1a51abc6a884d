//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Enumerations use their `SCREAMING_SNAKE_CASE`
//! names. Structured fields (GPA scales, subject configs, grade maps) are
//! stored as compact JSON.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use gradebook_core::{
  assessment::{AssessmentSystem, SubjectAssessmentConfig},
  catalog::{Activity, ActivitySubmission, Class, GradedWork, Subject},
  grade::{GradeBook, GradeMap, SubjectGradeRecord, TermResult},
  history::GradeHistory,
  term::{AcademicTerm, AssessmentPeriod, TermStructure},
};
use rusqlite::Row;
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enumerations ────────────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(column: &'static str, s: String) -> Result<T> {
  s.parse()
    .map_err(|_| Error::UnknownValue { column, value: s })
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_json<T: Serialize>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

/// Decode a nullable grade-map column; NULL is an empty map.
pub fn decode_grade_map<T: DeserializeOwned>(
  s: Option<&str>,
) -> serde_json::Result<GradeMap<T>> {
  s.map_or_else(|| Ok(GradeMap::new()), |s| serde_json::from_str(s))
}

/// Insert `grade` under `id` into the stored grade map, returning the
/// re-encoded map and the entry it replaced. Other entries are untouched.
pub fn merge_grade<T: Serialize + DeserializeOwned>(
  stored: Option<&str>,
  id: Uuid,
  grade: T,
) -> serde_json::Result<(String, Option<T>)> {
  let mut map: GradeMap<T> = decode_grade_map(stored)?;
  let previous = map.insert(id, grade);
  Ok((serde_json::to_string(&map)?, previous))
}

/// Carry a JSON failure out of a `Connection::call` closure.
pub fn json_failure(e: serde_json::Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `assessment_systems` row.
pub struct RawAssessmentSystem {
  pub assessment_system_id: String,
  pub program_id:           String,
  pub name:                 String,
  pub kind:                 String,
  pub gpa_scale:            String,
}

impl RawAssessmentSystem {
  pub const COLUMNS: &'static str =
    "assessment_system_id, program_id, name, kind, gpa_scale";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      assessment_system_id: row.get(0)?,
      program_id:           row.get(1)?,
      name:                 row.get(2)?,
      kind:                 row.get(3)?,
      gpa_scale:            row.get(4)?,
    })
  }

  pub fn into_system(self) -> Result<AssessmentSystem> {
    Ok(AssessmentSystem {
      assessment_system_id: decode_uuid(&self.assessment_system_id)?,
      program_id:           decode_uuid(&self.program_id)?,
      name:                 self.name,
      kind:                 decode_enum("assessment_systems.kind", self.kind)?,
      gpa_scale:            serde_json::from_str(&self.gpa_scale)?,
    })
  }
}

/// A term structure row with its terms and each term's periods, all already
/// ordered by `ord`.
pub struct RawTermStructure {
  pub term_structure_id: String,
  pub program_id:        String,
  pub name:              String,
  pub ord:               i64,
  pub status:            String,
  pub terms:             Vec<(RawTerm, Vec<RawPeriod>)>,
}

impl RawTermStructure {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      term_structure_id: row.get(0)?,
      program_id:        row.get(1)?,
      name:              row.get(2)?,
      ord:               row.get(3)?,
      status:            row.get(4)?,
      terms:             Vec::new(),
    })
  }

  pub fn into_structure(self) -> Result<TermStructure> {
    let terms = self
      .terms
      .into_iter()
      .map(|(term, periods)| term.into_term(periods))
      .collect::<Result<_>>()?;
    Ok(TermStructure {
      term_structure_id: decode_uuid(&self.term_structure_id)?,
      program_id: decode_uuid(&self.program_id)?,
      name: self.name,
      order: self.ord,
      status: decode_enum("term_structures.status", self.status)?,
      terms,
    })
  }
}

pub struct RawTerm {
  pub term_id:           String,
  pub term_structure_id: String,
  pub name:              String,
  pub ord:               i64,
}

impl RawTerm {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      term_id:           row.get(0)?,
      term_structure_id: row.get(1)?,
      name:              row.get(2)?,
      ord:               row.get(3)?,
    })
  }

  fn into_term(self, periods: Vec<RawPeriod>) -> Result<AcademicTerm> {
    Ok(AcademicTerm {
      term_id:           decode_uuid(&self.term_id)?,
      term_structure_id: decode_uuid(&self.term_structure_id)?,
      name:              self.name,
      order:             self.ord,
      periods:           periods
        .into_iter()
        .map(RawPeriod::into_period)
        .collect::<Result<_>>()?,
    })
  }
}

pub struct RawPeriod {
  pub period_id: String,
  pub term_id:   String,
  pub name:      String,
  pub ord:       i64,
  pub weight:    f64,
}

impl RawPeriod {
  pub const COLUMNS: &'static str = "period_id, term_id, name, ord, weight";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      period_id: row.get(0)?,
      term_id:   row.get(1)?,
      name:      row.get(2)?,
      ord:       row.get(3)?,
      weight:    row.get(4)?,
    })
  }

  pub fn into_period(self) -> Result<AssessmentPeriod> {
    Ok(AssessmentPeriod {
      period_id: decode_uuid(&self.period_id)?,
      term_id:   decode_uuid(&self.term_id)?,
      name:      self.name,
      order:     self.ord,
      weight:    self.weight,
    })
  }
}

pub struct RawSubject {
  pub subject_id:  String,
  pub name:        String,
  pub credits:     Option<f64>,
  pub config_json: Option<String>,
}

impl RawSubject {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id:  row.get(0)?,
      name:        row.get(1)?,
      credits:     row.get(2)?,
      config_json: row.get(3)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    let config = self
      .config_json
      .as_deref()
      .map(serde_json::from_str::<SubjectAssessmentConfig>)
      .transpose()?;
    Ok(Subject {
      subject_id: decode_uuid(&self.subject_id)?,
      name: self.name,
      credits: self.credits,
      config,
    })
  }
}

pub struct RawClass {
  pub class_id:          String,
  pub program_id:        String,
  pub name:              String,
  pub term_structure_id: Option<String>,
  pub subject_ids:       Vec<String>,
}

impl RawClass {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      class_id:          row.get(0)?,
      program_id:        row.get(1)?,
      name:              row.get(2)?,
      term_structure_id: row.get(3)?,
      subject_ids:       Vec::new(),
    })
  }

  pub fn into_class(self) -> Result<Class> {
    Ok(Class {
      class_id:          decode_uuid(&self.class_id)?,
      program_id:        decode_uuid(&self.program_id)?,
      name:              self.name,
      term_structure_id: decode_opt_uuid(self.term_structure_id.as_deref())?,
      subject_ids:       self
        .subject_ids
        .iter()
        .map(|s| decode_uuid(s))
        .collect::<Result<_>>()?,
    })
  }
}

pub struct RawActivity {
  pub activity_id:     String,
  pub subject_id:      String,
  pub period_id:       String,
  pub title:           String,
  pub assessment_type: String,
  pub total_marks:     f64,
}

impl RawActivity {
  pub const COLUMNS: &'static str =
    "activity_id, subject_id, period_id, title, assessment_type, total_marks";

  /// Read the activity columns starting at `offset`.
  pub fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      activity_id:     row.get(offset)?,
      subject_id:      row.get(offset + 1)?,
      period_id:       row.get(offset + 2)?,
      title:           row.get(offset + 3)?,
      assessment_type: row.get(offset + 4)?,
      total_marks:     row.get(offset + 5)?,
    })
  }

  pub fn into_activity(self) -> Result<Activity> {
    Ok(Activity {
      activity_id:     decode_uuid(&self.activity_id)?,
      subject_id:      decode_uuid(&self.subject_id)?,
      period_id:       decode_uuid(&self.period_id)?,
      title:           self.title,
      assessment_type: self.assessment_type,
      total_marks:     self.total_marks,
    })
  }
}

pub struct RawSubmission {
  pub activity_id:    String,
  pub student_id:     String,
  pub obtained_marks: Option<f64>,
  pub total_marks:    Option<f64>,
  pub status:         String,
  pub graded_at:      Option<String>,
  pub graded_by:      Option<String>,
}

impl RawSubmission {
  pub const COLUMNS: &'static str = "s.activity_id, s.student_id, \
     s.obtained_marks, s.total_marks, s.status, s.graded_at, s.graded_by";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      activity_id:    row.get(0)?,
      student_id:     row.get(1)?,
      obtained_marks: row.get(2)?,
      total_marks:    row.get(3)?,
      status:         row.get(4)?,
      graded_at:      row.get(5)?,
      graded_by:      row.get(6)?,
    })
  }

  pub fn into_submission(self) -> Result<ActivitySubmission> {
    Ok(ActivitySubmission {
      activity_id:    decode_uuid(&self.activity_id)?,
      student_id:     decode_uuid(&self.student_id)?,
      obtained_marks: self.obtained_marks,
      total_marks:    self.total_marks,
      status:         decode_enum("activity_submissions.status", self.status)?,
      graded_at:      self.graded_at.as_deref().map(decode_dt).transpose()?,
      graded_by:      self.graded_by,
    })
  }
}

/// A submission row joined with its activity (submission columns first).
pub struct RawGradedWork {
  pub submission: RawSubmission,
  pub activity:   RawActivity,
}

impl RawGradedWork {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      submission: RawSubmission::from_row(row)?,
      activity:   RawActivity::from_row(row, 7)?,
    })
  }

  pub fn into_work(self) -> Result<GradedWork> {
    Ok(GradedWork {
      submission: self.submission.into_submission()?,
      activity:   self.activity.into_activity()?,
    })
  }
}

pub struct RawRecord {
  pub record_id:                String,
  pub gradebook_id:             String,
  pub subject_id:               String,
  pub term_grades:              Option<String>,
  pub assessment_period_grades: Option<String>,
  pub updated_at:               String,
}

impl RawRecord {
  pub const COLUMNS: &'static str = "record_id, gradebook_id, subject_id, \
     term_grades, assessment_period_grades, updated_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:                row.get(0)?,
      gradebook_id:             row.get(1)?,
      subject_id:               row.get(2)?,
      term_grades:              row.get(3)?,
      assessment_period_grades: row.get(4)?,
      updated_at:               row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<SubjectGradeRecord> {
    Ok(SubjectGradeRecord {
      record_id:                decode_uuid(&self.record_id)?,
      gradebook_id:             decode_uuid(&self.gradebook_id)?,
      subject_id:               decode_uuid(&self.subject_id)?,
      term_grades:              decode_grade_map(self.term_grades.as_deref())?,
      assessment_period_grades: decode_grade_map(
        self.assessment_period_grades.as_deref(),
      )?,
      updated_at:               decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawGradeBook {
  pub gradebook_id:         String,
  pub class_id:             String,
  pub assessment_system_id: String,
  pub term_structure_id:    String,
  pub created_at:           String,
  pub records:              Vec<RawRecord>,
}

impl RawGradeBook {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      gradebook_id:         row.get(0)?,
      class_id:             row.get(1)?,
      assessment_system_id: row.get(2)?,
      term_structure_id:    row.get(3)?,
      created_at:           row.get(4)?,
      records:              Vec::new(),
    })
  }

  pub fn into_gradebook(self) -> Result<GradeBook> {
    Ok(GradeBook {
      gradebook_id:         decode_uuid(&self.gradebook_id)?,
      class_id:             decode_uuid(&self.class_id)?,
      assessment_system_id: decode_uuid(&self.assessment_system_id)?,
      term_structure_id:    decode_uuid(&self.term_structure_id)?,
      created_at:           decode_dt(&self.created_at)?,
      subject_records:      self
        .records
        .into_iter()
        .map(RawRecord::into_record)
        .collect::<Result<_>>()?,
    })
  }
}

pub struct RawTermResult {
  pub student_id:     String,
  pub term_id:        String,
  pub gpa:            f64,
  pub total_credits:  f64,
  pub earned_credits: f64,
}

impl RawTermResult {
  pub fn into_result(self) -> Result<TermResult> {
    Ok(TermResult {
      student_id:     decode_uuid(&self.student_id)?,
      term_id:        decode_uuid(&self.term_id)?,
      gpa:            self.gpa,
      total_credits:  self.total_credits,
      earned_credits: self.earned_credits,
    })
  }
}

pub struct RawHistory {
  pub history_id:    String,
  pub student_id:    String,
  pub subject_id:    String,
  pub assessment_id: String,
  pub grade_value:   f64,
  pub old_value:     Option<f64>,
  pub modified_by:   String,
  pub reason:        String,
  pub recorded_at:   String,
}

impl RawHistory {
  pub fn into_history(self) -> Result<GradeHistory> {
    Ok(GradeHistory {
      history_id:    decode_uuid(&self.history_id)?,
      student_id:    decode_uuid(&self.student_id)?,
      subject_id:    decode_uuid(&self.subject_id)?,
      assessment_id: decode_uuid(&self.assessment_id)?,
      grade_value:   self.grade_value,
      old_value:     self.old_value,
      modified_by:   self.modified_by,
      reason:        self.reason,
      recorded_at:   decode_dt(&self.recorded_at)?,
    })
  }
}
