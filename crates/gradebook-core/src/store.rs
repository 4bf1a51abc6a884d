//! The `GradebookStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `gradebook-store-sqlite`). The engine and the HTTP layer depend on this
//! abstraction, never on a concrete backend. The handle is passed explicitly;
//! each write operation below is a single transaction inside the backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  assessment::AssessmentSystem,
  catalog::{Activity, ActivitySubmission, Class, GradeEntry, GradedWork, Subject},
  grade::{
    AssessmentPeriodGrade, GradeBook, NewGradeBook, SubjectGradeRecord,
    SubjectTermGrade, TermResult,
  },
  history::{Audit, GradeHistory},
  term::{AssessmentPeriod, TermStructure},
};

/// Abstraction over a gradebook storage backend.
///
/// Backend errors must convert into [`crate::Error`] so that conditions the
/// engine reacts to (notably [`crate::Error::AlreadyExists`] raised by a
/// uniqueness constraint) survive the trip through the backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait GradebookStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Class → program chain ─────────────────────────────────────────────

  /// Retrieve a class with its subject list. Returns `None` if not found.
  fn get_class(
    &self,
    class_id: Uuid,
  ) -> impl Future<Output = Result<Option<Class>, Self::Error>> + Send + '_;

  /// The assessment system configured on a program, if any.
  fn program_assessment_system(
    &self,
    program_id: Uuid,
  ) -> impl Future<Output = Result<Option<AssessmentSystem>, Self::Error>> + Send + '_;

  /// The lowest-order ACTIVE term structure of a program, with its terms and
  /// periods, if any.
  fn first_active_term_structure(
    &self,
    program_id: Uuid,
  ) -> impl Future<Output = Result<Option<TermStructure>, Self::Error>> + Send + '_;

  fn get_assessment_system(
    &self,
    assessment_system_id: Uuid,
  ) -> impl Future<Output = Result<Option<AssessmentSystem>, Self::Error>> + Send + '_;

  fn get_term_structure(
    &self,
    term_structure_id: Uuid,
  ) -> impl Future<Output = Result<Option<TermStructure>, Self::Error>> + Send + '_;

  /// Student ids enrolled in a class.
  fn list_roster(
    &self,
    class_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  // ── Grading inputs ────────────────────────────────────────────────────

  /// Retrieve a subject with its credits and assessment config.
  fn get_subject(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  fn get_period(
    &self,
    period_id: Uuid,
  ) -> impl Future<Output = Result<Option<AssessmentPeriod>, Self::Error>> + Send + '_;

  /// The periods of a term, ordered by `order`.
  fn list_periods(
    &self,
    term_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AssessmentPeriod>, Self::Error>> + Send + '_;

  fn get_activity(
    &self,
    activity_id: Uuid,
  ) -> impl Future<Output = Result<Option<Activity>, Self::Error>> + Send + '_;

  /// A student's GRADED submissions for activities of `subject_id` within
  /// `period_id`, each joined with its activity.
  fn graded_submissions(
    &self,
    subject_id: Uuid,
    period_id: Uuid,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<GradedWork>, Self::Error>> + Send + '_;

  // ── Gradebooks ────────────────────────────────────────────────────────

  /// Retrieve a gradebook with all of its subject records.
  fn get_gradebook(
    &self,
    gradebook_id: Uuid,
  ) -> impl Future<Output = Result<Option<GradeBook>, Self::Error>> + Send + '_;

  fn find_gradebook_for_class(
    &self,
    class_id: Uuid,
  ) -> impl Future<Output = Result<Option<GradeBook>, Self::Error>> + Send + '_;

  /// Create a gradebook, one empty subject record per subject, and stamp the
  /// class with the term structure — all or nothing.
  ///
  /// Fails with [`crate::Error::AlreadyExists`] if the class already has a
  /// gradebook, including when a concurrent creation wins the race.
  fn create_gradebook(
    &self,
    input: NewGradeBook,
  ) -> impl Future<Output = Result<GradeBook, Self::Error>> + Send + '_;

  /// Merge `grade` into the subject record's `term_grades` under its term id
  /// (other terms are preserved) and append one audit row.
  ///
  /// The audit row's `old_value` is the prior `final_grade` for that term
  /// when the stored entry belongs to the same student.
  fn save_term_grade(
    &self,
    gradebook_id: Uuid,
    subject_id: Uuid,
    grade: SubjectTermGrade,
    audit: Audit,
  ) -> impl Future<Output = Result<SubjectGradeRecord, Self::Error>> + Send + '_;

  /// Merge `grade` into the subject record's `assessment_period_grades`
  /// under its period id.
  fn save_period_snapshot(
    &self,
    gradebook_id: Uuid,
    subject_id: Uuid,
    grade: AssessmentPeriodGrade,
  ) -> impl Future<Output = Result<SubjectGradeRecord, Self::Error>> + Send + '_;

  // ── Results and audit ─────────────────────────────────────────────────

  /// Insert or overwrite the result for `(student_id, term_id)`.
  fn upsert_term_result(
    &self,
    result: TermResult,
  ) -> impl Future<Output = Result<TermResult, Self::Error>> + Send + '_;

  fn get_term_result(
    &self,
    student_id: Uuid,
    term_id: Uuid,
  ) -> impl Future<Output = Result<Option<TermResult>, Self::Error>> + Send + '_;

  /// Upsert the student's submission as GRADED and append an audit row.
  ///
  /// Fails with [`crate::Error::ActivityNotFound`] if the activity does not
  /// exist.
  fn record_activity_grade(
    &self,
    entry: GradeEntry,
  ) -> impl Future<Output = Result<ActivitySubmission, Self::Error>> + Send + '_;

  /// A student's audit trail, oldest first.
  fn grade_history(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<GradeHistory>, Self::Error>> + Send + '_;
}
