//! Engine tests against an in-memory SQLite store.

use std::{
  collections::HashMap,
  sync::Arc,
  time::{Duration, Instant},
};

use gradebook_core::{
  ErrorKind,
  assessment::{
    AssessmentSystem, AssessmentSystemKind, GpaScale, PassingCriteria,
    SubjectAssessmentConfig,
  },
  catalog::{
    Activity, ActivitySubmission, Class, GradeEntry, GradedWork, Program, Subject,
    SubmissionStatus,
  },
  grade::{
    AssessmentPeriodGrade, GradeBook, NewGradeBook, SubjectGradeRecord,
    SubjectTermGrade, TermResult,
  },
  history::{Audit, GradeHistory, SYSTEM_ACTOR},
  store::GradebookStore,
  term::{AcademicTerm, AssessmentPeriod, TermStructure, TermStructureStatus},
};
use gradebook_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{ConfigurationIssue, EngineConfig, GradebookEngine};

// ─── Fixture ─────────────────────────────────────────────────────────────────

/// A program with a 4-point CGPA system and one active structure holding one
/// term with two periods weighted 60 / 40.
struct Fixture {
  store:     Arc<SqliteStore>,
  program:   Program,
  structure: TermStructure,
  class:     Class,
  subjects:  Vec<Subject>,
  students:  Vec<Uuid>,
}

impl Fixture {
  fn term_id(&self) -> Uuid { self.structure.terms[0].term_id }

  fn period(&self, index: usize) -> &AssessmentPeriod {
    &self.structure.terms[0].periods[index]
  }

  fn engine(&self) -> GradebookEngine<SqliteStore> {
    GradebookEngine::new(Arc::clone(&self.store), quick_config())
  }

  /// Add a graded activity of `kind` for `student`.
  async fn grade(
    &self,
    subject: usize,
    period: usize,
    student: Uuid,
    kind: &str,
    obtained: f64,
    total: f64,
  ) -> Activity {
    let activity = Activity {
      activity_id: Uuid::new_v4(),
      subject_id: self.subjects[subject].subject_id,
      period_id: self.period(period).period_id,
      title: format!("{kind} {obtained}/{total}"),
      assessment_type: kind.into(),
      total_marks: total,
    };
    self.store.insert_activity(&activity).await.unwrap();
    self
      .store
      .put_submission(&ActivitySubmission {
        activity_id:    activity.activity_id,
        student_id:     student,
        obtained_marks: Some(obtained),
        total_marks:    None,
        status:         SubmissionStatus::Graded,
        graded_at:      None,
        graded_by:      None,
      })
      .await
      .unwrap();
    activity
  }
}

fn quick_config() -> EngineConfig { EngineConfig { batch_size: 50, batch_delay_ms: 0 } }

fn config(weights: &[(&str, f64)]) -> SubjectAssessmentConfig {
  SubjectAssessmentConfig {
    weightage_distribution: weights
      .iter()
      .map(|(k, w)| (k.to_string(), *w))
      .collect::<HashMap<_, _>>(),
    passing_criteria:       PassingCriteria::default(),
  }
}

fn subject(name: &str, credits: Option<f64>, config: Option<SubjectAssessmentConfig>) -> Subject {
  Subject { subject_id: Uuid::new_v4(), name: name.into(), credits, config }
}

async fn fixture_with(
  students: usize,
  subjects: Vec<Subject>,
  with_system: bool,
  structure_status: TermStructureStatus,
) -> Fixture {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let program_id = Uuid::new_v4();

  let system = AssessmentSystem {
    assessment_system_id: Uuid::new_v4(),
    program_id,
    name: "Four point".into(),
    kind: AssessmentSystemKind::Cgpa,
    gpa_scale: GpaScale::default(),
  };
  store.insert_assessment_system(&system).await.unwrap();

  let program = Program {
    program_id,
    name: "Sciences".into(),
    assessment_system_id: with_system.then_some(system.assessment_system_id),
  };
  store.insert_program(&program).await.unwrap();

  let term_structure_id = Uuid::new_v4();
  let term_id = Uuid::new_v4();
  let structure = TermStructure {
    term_structure_id,
    program_id,
    name: "Semesters".into(),
    order: 1,
    status: structure_status,
    terms: vec![AcademicTerm {
      term_id,
      term_structure_id,
      name: "Semester 1".into(),
      order: 1,
      periods: [("Midterms", 1, 60.0), ("Finals", 2, 40.0)]
        .into_iter()
        .map(|(name, order, weight)| AssessmentPeriod {
          period_id: Uuid::new_v4(),
          term_id,
          name: name.into(),
          order,
          weight,
        })
        .collect(),
    }],
  };
  store.insert_term_structure(&structure).await.unwrap();

  for subject in &subjects {
    store.insert_subject(subject).await.unwrap();
  }

  let class = Class {
    class_id: Uuid::new_v4(),
    program_id,
    name: "10-A".into(),
    term_structure_id: None,
    subject_ids: subjects.iter().map(|s| s.subject_id).collect(),
  };
  store.insert_class(&class).await.unwrap();

  let students: Vec<Uuid> = (0..students).map(|_| Uuid::new_v4()).collect();
  store.enroll_students(class.class_id, &students).await.unwrap();

  Fixture { store, program, structure, class, subjects, students }
}

async fn fixture(students: usize) -> Fixture {
  fixture_with(
    students,
    vec![
      subject("Mathematics", Some(4.0), Some(config(&[]))),
      subject("Physics", Some(3.0), Some(config(&[("exam", 3.0), ("quiz", 1.0)]))),
    ],
    true,
    TermStructureStatus::Active,
  )
  .await
}

fn assert_close(actual: f64, expected: f64) {
  assert!(
    (actual - expected).abs() < 1e-9,
    "expected {expected}, got {actual}"
  );
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn initialize_binds_system_structure_and_subjects() {
  let f = fixture(1).await;
  let gradebook = f.engine().initialize_gradebook(f.class.class_id).await.unwrap();

  assert_eq!(gradebook.class_id, f.class.class_id);
  assert_eq!(gradebook.term_structure_id, f.structure.term_structure_id);
  let subjects: Vec<_> = gradebook.subject_records.iter().map(|r| r.subject_id).collect();
  assert_eq!(subjects, f.class.subject_ids);

  let snapshot = f
    .engine()
    .gradebook_snapshot(f.class.class_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(snapshot.gradebook.gradebook_id, gradebook.gradebook_id);
  assert_eq!(snapshot.assessment_system.kind, AssessmentSystemKind::Cgpa);
}

#[tokio::test]
async fn initialize_twice_fails_and_changes_nothing() {
  let f = fixture(1).await;
  let engine = f.engine();
  let first = engine.initialize_gradebook(f.class.class_id).await.unwrap();

  let err = engine.initialize_gradebook(f.class.class_id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::AlreadyExists);

  let current = engine.gradebook_for_class(f.class.class_id).await.unwrap();
  assert_eq!(current.gradebook_id, first.gradebook_id);
  assert_eq!(current.subject_records.len(), first.subject_records.len());
}

#[tokio::test]
async fn racing_initializations_create_one_gradebook() {
  let f = fixture(1).await;
  let engine = f.engine();
  let (a, b) = tokio::join!(
    engine.initialize_gradebook(f.class.class_id),
    engine.initialize_gradebook(f.class.class_id),
  );
  let failures: Vec<_> = [a, b].into_iter().filter_map(Result::err).collect();
  assert_eq!(failures.len(), 1);
  assert_eq!(failures[0].kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn initialize_unknown_class_is_not_found() {
  let f = fixture(0).await;
  let err = f.engine().initialize_gradebook(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn initialize_without_assessment_system_is_missing_configuration() {
  let f = fixture_with(1, vec![], false, TermStructureStatus::Active).await;
  let err = f.engine().initialize_gradebook(f.class.class_id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::MissingConfiguration);
  assert!(err.to_string().contains("assessment system"));
}

#[tokio::test]
async fn initialize_without_active_structure_is_missing_configuration() {
  let f = fixture_with(1, vec![], true, TermStructureStatus::Inactive).await;
  let err = f.engine().initialize_gradebook(f.class.class_id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::MissingConfiguration);
  assert!(err.to_string().contains("term structure"));
}

#[tokio::test]
async fn snapshot_of_class_without_gradebook_is_none() {
  let f = fixture(0).await;
  assert!(f.engine().gradebook_snapshot(f.class.class_id).await.unwrap().is_none());
  let err = f.engine().gradebook_for_class(f.class.class_id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Calculators ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn term_grade_weights_periods() {
  let f = fixture(1).await;
  let engine = f.engine();
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();
  let student = f.students[0];
  f.grade(0, 0, student, "Quiz", 80.0, 100.0).await;
  f.grade(0, 1, student, "Exam", 50.0, 100.0).await;

  let grade = engine
    .term_grade(
      f.subjects[0].subject_id,
      f.term_id(),
      student,
      gradebook.assessment_system_id,
    )
    .await
    .unwrap();

  assert_close(grade.percentage, 68.0);
  assert_close(grade.final_grade, 68.0);
  assert_eq!(grade.grade_points, 1.0);
  assert_eq!(grade.credits, 4.0);
  assert!(grade.is_passing);
  assert_eq!(grade.period_grades[&f.period(0).period_id].weight, 60.0);
}

#[tokio::test]
async fn period_grade_weights_assessment_types() {
  let f = fixture(1).await;
  let engine = f.engine();
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();
  let student = f.students[0];
  // Physics weights exams 3:1 over quizzes; type names match case-insensitively.
  f.grade(1, 0, student, "QUIZ", 10.0, 10.0).await;
  f.grade(1, 0, student, "Exam", 40.0, 100.0).await;

  let grade = engine
    .period_grade(
      f.subjects[1].subject_id,
      f.period(0).period_id,
      student,
      gradebook.assessment_system_id,
      f.subjects[1].config.as_ref().unwrap(),
    )
    .await
    .unwrap();

  assert_close(grade.percentage, 55.0);
  assert_close(grade.total_marks, 400.0);
  assert!(grade.is_passing);
}

#[tokio::test]
async fn zero_total_marks_score_zero() {
  let f = fixture(1).await;
  let engine = f.engine();
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();
  let student = f.students[0];
  f.grade(0, 0, student, "Quiz", 0.0, 0.0).await;

  let grade = engine
    .period_grade(
      f.subjects[0].subject_id,
      f.period(0).period_id,
      student,
      gradebook.assessment_system_id,
      f.subjects[0].config.as_ref().unwrap(),
    )
    .await
    .unwrap();
  assert_eq!(grade.percentage, 0.0);
  assert!(!grade.is_passing);
}

#[tokio::test]
async fn subject_without_config_is_missing_configuration() {
  let f = fixture_with(
    1,
    vec![subject("Art", Some(1.0), None)],
    true,
    TermStructureStatus::Active,
  )
  .await;
  let engine = f.engine();
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();

  let err = engine
    .term_grade(
      f.subjects[0].subject_id,
      f.term_id(),
      f.students[0],
      gradebook.assessment_system_id,
    )
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::MissingConfiguration);
}

#[tokio::test]
async fn cumulative_grade_is_credit_weighted_and_persisted() {
  let f = fixture(1).await;
  let engine = f.engine();
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();
  let student = f.students[0];
  // Mathematics: 68% → 1.0 point over 4 credits.
  f.grade(0, 0, student, "Quiz", 80.0, 100.0).await;
  f.grade(0, 1, student, "Quiz", 50.0, 100.0).await;
  // Physics: 95% → 4.0 points over 3 credits.
  f.grade(1, 0, student, "Exam", 95.0, 100.0).await;
  f.grade(1, 1, student, "Exam", 19.0, 20.0).await;

  let result = engine
    .cumulative_grade(gradebook.gradebook_id, student, f.term_id(), SYSTEM_ACTOR)
    .await
    .unwrap();

  assert_close(result.gpa, (4.0 * 1.0 + 3.0 * 4.0) / 7.0);
  assert_eq!(result.total_credits, 7.0);
  assert_eq!(result.earned_credits, 7.0);
  assert!(result.uncredited_subjects.is_empty());

  let stored = f
    .store
    .get_term_result(student, f.term_id())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored, result.term_result());

  // The persisted term grade reads back exactly as computed.
  let gradebook = f.store.get_gradebook(gradebook.gradebook_id).await.unwrap().unwrap();
  let maths = f.subjects[0].subject_id;
  let persisted = gradebook
    .record_for(maths)
    .unwrap()
    .term_grades
    .get(&f.term_id())
    .unwrap();
  assert_eq!(persisted, &result.subject_grades[&maths]);
}

#[tokio::test]
async fn uncredited_subject_is_reported_not_counted() {
  let f = fixture_with(
    1,
    vec![
      subject("Mathematics", Some(2.0), Some(config(&[]))),
      subject("Homeroom", None, Some(config(&[]))),
    ],
    true,
    TermStructureStatus::Active,
  )
  .await;
  let engine = f.engine();
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();
  let student = f.students[0];
  f.grade(0, 0, student, "Quiz", 9.0, 10.0).await;
  f.grade(0, 1, student, "Quiz", 9.0, 10.0).await;
  f.grade(1, 0, student, "Quiz", 1.0, 10.0).await;

  let result = engine
    .cumulative_grade(gradebook.gradebook_id, student, f.term_id(), SYSTEM_ACTOR)
    .await
    .unwrap();
  assert_eq!(result.gpa, 4.0);
  assert_eq!(result.total_credits, 2.0);
  assert_eq!(result.uncredited_subjects, vec![f.subjects[1].subject_id]);
}

#[tokio::test]
async fn term_outside_structure_is_not_found() {
  let f = fixture(1).await;
  let engine = f.engine();
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();
  let err = engine
    .batch_recompute(gradebook.gradebook_id, Uuid::new_v4(), None, SYSTEM_ACTOR)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Batch recompute ─────────────────────────────────────────────────────────

async fn term_results(f: &Fixture) -> Vec<Option<TermResult>> {
  let mut results = Vec::new();
  for &student in &f.students {
    results.push(f.store.get_term_result(student, f.term_id()).await.unwrap());
  }
  results
}

#[tokio::test]
async fn batch_recompute_is_idempotent() {
  let f = fixture(6).await;
  let engine = f.engine();
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();
  for (i, &student) in f.students.iter().enumerate() {
    f.grade(0, 0, student, "Quiz", 10.0 * i as f64, 60.0).await;
    f.grade(1, 1, student, "Exam", 55.0, 70.0).await;
  }

  let first = engine
    .batch_recompute(gradebook.gradebook_id, f.term_id(), Some(4), "registrar")
    .await
    .unwrap();
  let before = term_results(&f).await;
  let second = engine
    .batch_recompute(gradebook.gradebook_id, f.term_id(), Some(4), "registrar")
    .await
    .unwrap();
  let after = term_results(&f).await;

  assert_eq!(first, second);
  assert_eq!(first.batches, 2);
  assert_eq!(first.succeeded, 6);
  assert!(before.iter().all(Option::is_some));
  assert_eq!(before, after);

  let history = f.store.grade_history(f.students[0]).await.unwrap();
  assert!(!history.is_empty());
  assert!(history.iter().all(|h| h.modified_by == "registrar"));
}

#[tokio::test]
async fn batch_recompute_waits_between_batches() {
  let f = fixture(3).await;
  let engine = GradebookEngine::new(
    Arc::clone(&f.store),
    EngineConfig { batch_size: 1, batch_delay_ms: 25 },
  );
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();

  let started = Instant::now();
  let report = engine
    .batch_recompute(gradebook.gradebook_id, f.term_id(), None, SYSTEM_ACTOR)
    .await
    .unwrap();
  assert_eq!(report.batches, 3);
  assert!(started.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn zero_batch_size_is_treated_as_one() {
  let f = fixture(2).await;
  let engine = f.engine();
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();
  let report = engine
    .batch_recompute(gradebook.gradebook_id, f.term_id(), Some(0), SYSTEM_ACTOR)
    .await
    .unwrap();
  assert_eq!(report.batches, 2);
  assert_eq!(report.succeeded, 2);
}

/// Delegates to SQLite but fails grading input reads for one student.
struct FlakyStore {
  inner:   Arc<SqliteStore>,
  failing: Uuid,
}

type StoreResult<T> = Result<T, gradebook_store_sqlite::Error>;

impl GradebookStore for FlakyStore {
  type Error = gradebook_store_sqlite::Error;

  async fn get_class(&self, class_id: Uuid) -> StoreResult<Option<Class>> {
    self.inner.get_class(class_id).await
  }

  async fn program_assessment_system(
    &self,
    program_id: Uuid,
  ) -> StoreResult<Option<AssessmentSystem>> {
    self.inner.program_assessment_system(program_id).await
  }

  async fn first_active_term_structure(
    &self,
    program_id: Uuid,
  ) -> StoreResult<Option<TermStructure>> {
    self.inner.first_active_term_structure(program_id).await
  }

  async fn get_assessment_system(&self, id: Uuid) -> StoreResult<Option<AssessmentSystem>> {
    self.inner.get_assessment_system(id).await
  }

  async fn get_term_structure(&self, id: Uuid) -> StoreResult<Option<TermStructure>> {
    self.inner.get_term_structure(id).await
  }

  async fn list_roster(&self, class_id: Uuid) -> StoreResult<Vec<Uuid>> {
    self.inner.list_roster(class_id).await
  }

  async fn get_subject(&self, id: Uuid) -> StoreResult<Option<Subject>> {
    self.inner.get_subject(id).await
  }

  async fn get_period(&self, id: Uuid) -> StoreResult<Option<AssessmentPeriod>> {
    self.inner.get_period(id).await
  }

  async fn list_periods(&self, term_id: Uuid) -> StoreResult<Vec<AssessmentPeriod>> {
    self.inner.list_periods(term_id).await
  }

  async fn get_activity(&self, id: Uuid) -> StoreResult<Option<Activity>> {
    self.inner.get_activity(id).await
  }

  async fn graded_submissions(
    &self,
    subject_id: Uuid,
    period_id: Uuid,
    student_id: Uuid,
  ) -> StoreResult<Vec<GradedWork>> {
    if student_id == self.failing {
      return Err(gradebook_store_sqlite::Error::Core(gradebook_core::Error::Store(
        "injected read failure".into(),
      )));
    }
    self.inner.graded_submissions(subject_id, period_id, student_id).await
  }

  async fn get_gradebook(&self, id: Uuid) -> StoreResult<Option<GradeBook>> {
    self.inner.get_gradebook(id).await
  }

  async fn find_gradebook_for_class(&self, class_id: Uuid) -> StoreResult<Option<GradeBook>> {
    self.inner.find_gradebook_for_class(class_id).await
  }

  async fn create_gradebook(&self, input: NewGradeBook) -> StoreResult<GradeBook> {
    self.inner.create_gradebook(input).await
  }

  async fn save_term_grade(
    &self,
    gradebook_id: Uuid,
    subject_id: Uuid,
    grade: SubjectTermGrade,
    audit: Audit,
  ) -> StoreResult<SubjectGradeRecord> {
    self.inner.save_term_grade(gradebook_id, subject_id, grade, audit).await
  }

  async fn save_period_snapshot(
    &self,
    gradebook_id: Uuid,
    subject_id: Uuid,
    grade: AssessmentPeriodGrade,
  ) -> StoreResult<SubjectGradeRecord> {
    self.inner.save_period_snapshot(gradebook_id, subject_id, grade).await
  }

  async fn upsert_term_result(&self, result: TermResult) -> StoreResult<TermResult> {
    self.inner.upsert_term_result(result).await
  }

  async fn get_term_result(
    &self,
    student_id: Uuid,
    term_id: Uuid,
  ) -> StoreResult<Option<TermResult>> {
    self.inner.get_term_result(student_id, term_id).await
  }

  async fn record_activity_grade(&self, entry: GradeEntry) -> StoreResult<ActivitySubmission> {
    self.inner.record_activity_grade(entry).await
  }

  async fn grade_history(&self, student_id: Uuid) -> StoreResult<Vec<GradeHistory>> {
    self.inner.grade_history(student_id).await
  }
}

#[tokio::test]
async fn failing_student_does_not_stop_the_batch() {
  let f = fixture(250).await;
  let failing = f.students[36];
  let engine = GradebookEngine::new(
    Arc::new(FlakyStore { inner: Arc::clone(&f.store), failing }),
    quick_config(),
  );
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();

  let report = engine
    .batch_recompute(gradebook.gradebook_id, f.term_id(), Some(50), SYSTEM_ACTOR)
    .await
    .unwrap();

  assert_eq!(report.batches, 5);
  assert_eq!(report.succeeded, 249);
  assert_eq!(report.failed.len(), 1);
  assert_eq!(report.failed[0].student_id, failing);
  assert!(report.failed[0].error.contains("injected read failure"));

  let results = term_results(&f).await;
  assert!(results[36].is_none());
  assert_eq!(results.iter().filter(|r| r.is_some()).count(), 249);
  // Students in the batches after the failure were still processed.
  assert!(results[249].is_some());
}

// ─── Grade entry and refreshes ───────────────────────────────────────────────

#[tokio::test]
async fn recorded_grade_feeds_the_next_refresh() {
  let f = fixture(1).await;
  let engine = f.engine();
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();
  let student = f.students[0];
  let maths = f.subjects[0].subject_id;
  let activity = f.grade(0, 0, student, "Quiz", 2.0, 10.0).await;

  let submission = engine
    .record_activity_grade(GradeEntry {
      activity_id:    activity.activity_id,
      student_id:     student,
      obtained_marks: 9.0,
      modified_by:    "ms.frizzle".into(),
      reason:         None,
    })
    .await
    .unwrap();
  assert_eq!(submission.obtained_marks, Some(9.0));

  let record = engine
    .refresh_subject_record(gradebook.gradebook_id, maths, f.term_id(), student, "ms.frizzle")
    .await
    .unwrap();
  let grade = record.term_grades.get(&f.term_id()).unwrap();
  // 90% in the 60-weight period, nothing in the 40-weight period.
  assert_close(grade.percentage, 54.0);
  assert_eq!(grade.student_id, student);

  let history = f.store.grade_history(student).await.unwrap();
  let reasons: Vec<_> = history.iter().map(|h| h.reason.as_str()).collect();
  assert_eq!(reasons, ["Activity grade update", "Term grade calculation"]);
  assert_eq!(history[0].modified_by, "ms.frizzle");
  assert_eq!(history[0].old_value, Some(2.0));
  assert_eq!(history[1].modified_by, "ms.frizzle");
}

#[tokio::test]
async fn refresh_rejects_subject_outside_gradebook() {
  let f = fixture(1).await;
  let engine = f.engine();
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();
  let err = engine
    .refresh_subject_record(
      gradebook.gradebook_id,
      Uuid::new_v4(),
      f.term_id(),
      f.students[0],
      SYSTEM_ACTOR,
    )
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn period_snapshot_is_stored_on_the_record() {
  let f = fixture(1).await;
  let engine = f.engine();
  let gradebook = engine.initialize_gradebook(f.class.class_id).await.unwrap();
  let student = f.students[0];
  f.grade(1, 1, student, "Quiz", 7.0, 10.0).await;

  let period_id = f.period(1).period_id;
  let record = engine
    .snapshot_period_grade(gradebook.gradebook_id, f.subjects[1].subject_id, period_id, student)
    .await
    .unwrap();
  let snapshot = record.assessment_period_grades.get(&period_id).unwrap();
  assert_close(snapshot.percentage, 70.0);
  assert_eq!(snapshot.weight, 40.0);
  assert!(record.term_grades.is_empty());
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn fully_configured_class_has_no_issues() {
  let f = fixture(0).await;
  assert!(f.engine().validate_class(f.class.class_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn validation_lists_every_gap() {
  let art = subject("Art", None, None);
  let f = fixture_with(0, vec![art.clone()], false, TermStructureStatus::Inactive).await;

  let issues = f.engine().validate_class(f.class.class_id).await.unwrap();
  let program_id = f.program.program_id;
  assert_eq!(issues, vec![
    ConfigurationIssue::MissingAssessmentSystem { program_id },
    ConfigurationIssue::MissingTermStructure { program_id },
    ConfigurationIssue::MissingSubjectConfig {
      subject_id: art.subject_id,
      name:       "Art".into(),
    },
    ConfigurationIssue::UncreditedSubject {
      subject_id: art.subject_id,
      name:       "Art".into(),
    },
  ]);

  let json = serde_json::to_value(&issues[0]).unwrap();
  assert_eq!(json["kind"], "missing_assessment_system");
}

#[tokio::test]
async fn validation_flags_weightless_terms() {
  let f = fixture(0).await;
  let term_structure_id = Uuid::new_v4();
  let term_id = Uuid::new_v4();
  let weightless = TermStructure {
    term_structure_id,
    program_id: f.program.program_id,
    name: "Draft".into(),
    order: 0,
    status: TermStructureStatus::Active,
    terms: vec![AcademicTerm {
      term_id,
      term_structure_id,
      name: "Empty term".into(),
      order: 1,
      periods: vec![],
    }],
  };
  f.store.insert_term_structure(&weightless).await.unwrap();

  let issues = f.engine().validate_class(f.class.class_id).await.unwrap();
  assert_eq!(issues, vec![ConfigurationIssue::NonPositivePeriodWeights {
    term_id,
    name: "Empty term".into(),
    total_weight: 0.0,
  }]);
}

#[tokio::test]
async fn validation_flags_negative_period_weights() {
  let f = fixture(0).await;
  let term_structure_id = Uuid::new_v4();
  let term_id = Uuid::new_v4();
  let (kept, penalised) = (Uuid::new_v4(), Uuid::new_v4());
  let period = |period_id, name: &str, weight| AssessmentPeriod {
    period_id,
    term_id,
    name: name.into(),
    order: 1,
    weight,
  };
  let lopsided = TermStructure {
    term_structure_id,
    program_id: f.program.program_id,
    name: "Draft".into(),
    order: 0,
    status: TermStructureStatus::Active,
    terms: vec![AcademicTerm {
      term_id,
      term_structure_id,
      name: "Lopsided term".into(),
      order: 1,
      periods: vec![period(kept, "Coursework", 10.0), period(penalised, "Penalty", -5.0)],
    }],
  };
  f.store.insert_term_structure(&lopsided).await.unwrap();

  let issues = f.engine().validate_class(f.class.class_id).await.unwrap();
  assert_eq!(issues, vec![ConfigurationIssue::NegativePeriodWeight {
    period_id: penalised,
    name:      "Penalty".into(),
    weight:    -5.0,
  }]);
}
