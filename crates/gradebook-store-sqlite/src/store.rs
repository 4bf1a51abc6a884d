//! [`SqliteStore`], the SQLite implementation of [`GradebookStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use gradebook_core::{
  assessment::AssessmentSystem,
  catalog::{
    Activity, ActivitySubmission, Class, GradeEntry, GradedWork, Subject,
    SubmissionStatus,
  },
  grade::{
    AssessmentPeriodGrade, GradeBook, GradeMap, NewGradeBook, SubjectGradeRecord,
    SubjectTermGrade, TermResult,
  },
  history::{ACTIVITY_GRADE_REASON, Audit, GradeHistory},
  store::GradebookStore,
  term::{AssessmentPeriod, TermStructure, TermStructureStatus},
};

use crate::{
  Error, Result,
  encode::{
    RawActivity, RawAssessmentSystem, RawClass, RawGradeBook, RawGradedWork,
    RawHistory, RawPeriod, RawRecord, RawSubject, RawSubmission, RawTerm,
    RawTermResult, RawTermStructure, decode_uuid, encode_dt, encode_uuid,
    json_failure, merge_grade,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A gradebook store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load a gradebook and its subject records, looked up by `column`.
  async fn load_gradebook(
    &self,
    column: &'static str,
    id: Uuid,
  ) -> Result<Option<GradeBook>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawGradeBook> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT gradebook_id, class_id, assessment_system_id,
                  term_structure_id, created_at
           FROM gradebooks WHERE {column} = ?1"
        );
        let Some(mut gradebook) = conn
          .query_row(&sql, params![id_str], RawGradeBook::from_row)
          .optional()?
        else {
          return Ok(None);
        };
        gradebook.records = read_records(conn, &gradebook.gradebook_id)?;
        Ok(Some(gradebook))
      })
      .await?;

    raw.map(RawGradeBook::into_gradebook).transpose()
  }

  /// Load the lowest-order term structure matching `filter` (bound to `?1`)
  /// with its terms and periods.
  async fn load_term_structure(
    &self,
    filter: String,
    key: Uuid,
  ) -> Result<Option<TermStructure>> {
    let key_str = encode_uuid(key);

    let raw: Option<RawTermStructure> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT term_structure_id, program_id, name, ord, status
           FROM term_structures WHERE {filter}
           ORDER BY ord LIMIT 1"
        );
        let Some(mut structure) = conn
          .query_row(&sql, params![key_str], RawTermStructure::from_row)
          .optional()?
        else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT term_id, term_structure_id, name, ord
           FROM academic_terms WHERE term_structure_id = ?1
           ORDER BY ord",
        )?;
        let terms = stmt
          .query_map(params![structure.term_structure_id], RawTerm::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        for term in terms {
          let periods = read_periods(conn, &term.term_id)?;
          structure.terms.push((term, periods));
        }
        Ok(Some(structure))
      })
      .await?;

    raw.map(RawTermStructure::into_structure).transpose()
  }
}

// ─── Row helpers (run inside `Connection::call`) ─────────────────────────────

fn read_periods(conn: &Connection, term_id: &str) -> rusqlite::Result<Vec<RawPeriod>> {
  let sql = format!(
    "SELECT {} FROM assessment_periods WHERE term_id = ?1 ORDER BY ord",
    RawPeriod::COLUMNS
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(params![term_id], RawPeriod::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn read_records(conn: &Connection, gradebook_id: &str) -> rusqlite::Result<Vec<RawRecord>> {
  let sql = format!(
    "SELECT {} FROM subject_grade_records WHERE gradebook_id = ?1 ORDER BY rowid",
    RawRecord::COLUMNS
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(params![gradebook_id], RawRecord::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn read_record(
  conn: &Connection,
  gradebook_id: &str,
  subject_id: &str,
) -> rusqlite::Result<Option<RawRecord>> {
  let sql = format!(
    "SELECT {} FROM subject_grade_records
     WHERE gradebook_id = ?1 AND subject_id = ?2",
    RawRecord::COLUMNS
  );
  conn
    .query_row(&sql, params![gradebook_id, subject_id], RawRecord::from_row)
    .optional()
}

/// Insert the record, or overwrite the grade maps of the existing record for
/// the same `(gradebook_id, subject_id)`. The record id never changes.
fn write_record(conn: &Connection, record: &RawRecord) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO subject_grade_records (
       record_id, gradebook_id, subject_id,
       term_grades, assessment_period_grades, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
     ON CONFLICT (gradebook_id, subject_id) DO UPDATE SET
       term_grades              = excluded.term_grades,
       assessment_period_grades = excluded.assessment_period_grades,
       updated_at               = excluded.updated_at",
    params![
      record.record_id,
      record.gradebook_id,
      record.subject_id,
      record.term_grades,
      record.assessment_period_grades,
      record.updated_at,
    ],
  )?;
  Ok(())
}

fn append_history(conn: &Connection, row: &RawHistory) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO grade_history (
       history_id, student_id, subject_id, assessment_id,
       grade_value, old_value, modified_by, reason, recorded_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    params![
      row.history_id,
      row.student_id,
      row.subject_id,
      row.assessment_id,
      row.grade_value,
      row.old_value,
      row.modified_by,
      row.reason,
      row.recorded_at,
    ],
  )?;
  Ok(())
}

// ─── GradebookStore impl ─────────────────────────────────────────────────────

impl GradebookStore for SqliteStore {
  type Error = Error;

  // ── Class → program chain ───────────────────────────────────────────────

  async fn get_class(&self, class_id: Uuid) -> Result<Option<Class>> {
    let id_str = encode_uuid(class_id);

    let raw: Option<RawClass> = self
      .conn
      .call(move |conn| {
        let Some(mut class) = conn
          .query_row(
            "SELECT class_id, program_id, name, term_structure_id
             FROM classes WHERE class_id = ?1",
            params![id_str],
            RawClass::from_row,
          )
          .optional()?
        else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT subject_id FROM class_subjects WHERE class_id = ?1 ORDER BY ord",
        )?;
        class.subject_ids = stmt
          .query_map(params![id_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(Some(class))
      })
      .await?;

    raw.map(RawClass::into_class).transpose()
  }

  async fn program_assessment_system(
    &self,
    program_id: Uuid,
  ) -> Result<Option<AssessmentSystem>> {
    let id_str = encode_uuid(program_id);

    let raw: Option<RawAssessmentSystem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT a.assessment_system_id, a.program_id, a.name, a.kind,
                      a.gpa_scale
               FROM programs p
               JOIN assessment_systems a
                 ON a.assessment_system_id = p.assessment_system_id
               WHERE p.program_id = ?1",
              params![id_str],
              RawAssessmentSystem::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAssessmentSystem::into_system).transpose()
  }

  async fn first_active_term_structure(
    &self,
    program_id: Uuid,
  ) -> Result<Option<TermStructure>> {
    let filter = format!(
      "program_id = ?1 AND status = '{}'",
      TermStructureStatus::Active
    );
    self.load_term_structure(filter, program_id).await
  }

  async fn get_assessment_system(
    &self,
    assessment_system_id: Uuid,
  ) -> Result<Option<AssessmentSystem>> {
    let id_str = encode_uuid(assessment_system_id);

    let raw: Option<RawAssessmentSystem> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM assessment_systems WHERE assessment_system_id = ?1",
          RawAssessmentSystem::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, params![id_str], RawAssessmentSystem::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAssessmentSystem::into_system).transpose()
  }

  async fn get_term_structure(
    &self,
    term_structure_id: Uuid,
  ) -> Result<Option<TermStructure>> {
    self
      .load_term_structure("term_structure_id = ?1".to_owned(), term_structure_id)
      .await
  }

  async fn list_roster(&self, class_id: Uuid) -> Result<Vec<Uuid>> {
    let id_str = encode_uuid(class_id);

    let raws: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT student_id FROM enrollments WHERE class_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(params![id_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    raws.iter().map(|s| decode_uuid(s)).collect()
  }

  // ── Grading inputs ──────────────────────────────────────────────────────

  async fn get_subject(&self, subject_id: Uuid) -> Result<Option<Subject>> {
    let id_str = encode_uuid(subject_id);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT subject_id, name, credits, config_json
               FROM subjects WHERE subject_id = ?1",
              params![id_str],
              RawSubject::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn get_period(&self, period_id: Uuid) -> Result<Option<AssessmentPeriod>> {
    let id_str = encode_uuid(period_id);

    let raw: Option<RawPeriod> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM assessment_periods WHERE period_id = ?1",
          RawPeriod::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, params![id_str], RawPeriod::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPeriod::into_period).transpose()
  }

  async fn list_periods(&self, term_id: Uuid) -> Result<Vec<AssessmentPeriod>> {
    let id_str = encode_uuid(term_id);

    let raws: Vec<RawPeriod> = self
      .conn
      .call(move |conn| Ok(read_periods(conn, &id_str)?))
      .await?;

    raws.into_iter().map(RawPeriod::into_period).collect()
  }

  async fn get_activity(&self, activity_id: Uuid) -> Result<Option<Activity>> {
    let id_str = encode_uuid(activity_id);

    let raw: Option<RawActivity> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM activities WHERE activity_id = ?1",
          RawActivity::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, params![id_str], |row| RawActivity::from_row(row, 0))
            .optional()?,
        )
      })
      .await?;

    raw.map(RawActivity::into_activity).transpose()
  }

  async fn graded_submissions(
    &self,
    subject_id: Uuid,
    period_id: Uuid,
    student_id: Uuid,
  ) -> Result<Vec<GradedWork>> {
    let subject_str = encode_uuid(subject_id);
    let period_str = encode_uuid(period_id);
    let student_str = encode_uuid(student_id);
    let graded = SubmissionStatus::Graded.as_ref().to_owned();

    let raws: Vec<RawGradedWork> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {},
                  a.activity_id, a.subject_id, a.period_id, a.title,
                  a.assessment_type, a.total_marks
           FROM activity_submissions s
           JOIN activities a ON a.activity_id = s.activity_id
           WHERE a.subject_id = ?1
             AND a.period_id  = ?2
             AND s.student_id = ?3
             AND s.status     = ?4
           ORDER BY a.rowid",
          RawSubmission::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            params![subject_str, period_str, student_str, graded],
            RawGradedWork::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGradedWork::into_work).collect()
  }

  // ── Gradebooks ──────────────────────────────────────────────────────────

  async fn get_gradebook(&self, gradebook_id: Uuid) -> Result<Option<GradeBook>> {
    self.load_gradebook("gradebook_id", gradebook_id).await
  }

  async fn find_gradebook_for_class(&self, class_id: Uuid) -> Result<Option<GradeBook>> {
    self.load_gradebook("class_id", class_id).await
  }

  async fn create_gradebook(&self, input: NewGradeBook) -> Result<GradeBook> {
    let created_at = Utc::now();
    let gradebook_id = Uuid::new_v4();
    let gradebook = GradeBook {
      gradebook_id,
      class_id: input.class_id,
      assessment_system_id: input.assessment_system_id,
      term_structure_id: input.term_structure_id,
      created_at,
      subject_records: input
        .subject_ids
        .iter()
        .map(|&subject_id| SubjectGradeRecord {
          record_id: Uuid::new_v4(),
          gradebook_id,
          subject_id,
          term_grades: GradeMap::new(),
          assessment_period_grades: GradeMap::new(),
          updated_at: created_at,
        })
        .collect(),
    };

    let gradebook_str = encode_uuid(gradebook_id);
    let class_str = encode_uuid(input.class_id);
    let system_str = encode_uuid(input.assessment_system_id);
    let structure_str = encode_uuid(input.term_structure_id);
    let at_str = encode_dt(created_at);
    let records: Vec<(String, String)> = gradebook
      .subject_records
      .iter()
      .map(|r| (encode_uuid(r.record_id), encode_uuid(r.subject_id)))
      .collect();

    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing = tx
          .query_row(
            "SELECT 1 FROM gradebooks WHERE class_id = ?1",
            params![class_str],
            |_| Ok(()),
          )
          .optional()?;
        if existing.is_some() {
          return Ok(false);
        }

        tx.execute(
          "INSERT INTO gradebooks (
             gradebook_id, class_id, assessment_system_id,
             term_structure_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          params![gradebook_str, class_str, system_str, structure_str, at_str],
        )?;

        for (record_id, subject_id) in &records {
          tx.execute(
            "INSERT INTO subject_grade_records (
               record_id, gradebook_id, subject_id,
               term_grades, assessment_period_grades, updated_at
             ) VALUES (?1, ?2, ?3, NULL, NULL, ?4)",
            params![record_id, gradebook_str, subject_id, at_str],
          )?;
        }

        tx.execute(
          "UPDATE classes SET term_structure_id = ?1 WHERE class_id = ?2",
          params![structure_str, class_str],
        )?;

        tx.commit()?;
        Ok(true)
      })
      .await;

    match created.map_err(Error::from) {
      Ok(true) => Ok(gradebook),
      Ok(false) => Err(gradebook_core::Error::AlreadyExists(input.class_id).into()),
      Err(err) if err.is_unique_violation() => {
        Err(gradebook_core::Error::AlreadyExists(input.class_id).into())
      }
      Err(err) => Err(err),
    }
  }

  async fn save_term_grade(
    &self,
    gradebook_id: Uuid,
    subject_id: Uuid,
    grade: SubjectTermGrade,
    audit: Audit,
  ) -> Result<SubjectGradeRecord> {
    let now = encode_dt(Utc::now());
    let gradebook_str = encode_uuid(gradebook_id);
    let subject_str = encode_uuid(subject_id);
    let new_record_id = encode_uuid(Uuid::new_v4());
    let term_id = grade.term_id;
    let student_id = grade.student_id;
    let mut history = RawHistory {
      history_id:    encode_uuid(Uuid::new_v4()),
      student_id:    encode_uuid(student_id),
      subject_id:    subject_str.clone(),
      assessment_id: encode_uuid(term_id),
      grade_value:   grade.final_grade,
      old_value:     None,
      modified_by:   audit.modified_by,
      reason:        audit.reason,
      recorded_at:   now.clone(),
    };

    let raw: RawRecord = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let (record_id, stored_terms, period_grades) =
          match read_record(&tx, &gradebook_str, &subject_str)? {
            Some(r) => (r.record_id, r.term_grades, r.assessment_period_grades),
            None => (new_record_id, None, None),
          };

        let (term_grades, previous) =
          merge_grade(stored_terms.as_deref(), term_id, grade).map_err(json_failure)?;
        history.old_value = previous
          .filter(|p: &SubjectTermGrade| p.student_id == student_id)
          .map(|p| p.final_grade);

        let record = RawRecord {
          record_id,
          gradebook_id: gradebook_str,
          subject_id: subject_str,
          term_grades: Some(term_grades),
          assessment_period_grades: period_grades,
          updated_at: now,
        };
        write_record(&tx, &record)?;
        append_history(&tx, &history)?;

        tx.commit()?;
        Ok(record)
      })
      .await?;

    raw.into_record()
  }

  async fn save_period_snapshot(
    &self,
    gradebook_id: Uuid,
    subject_id: Uuid,
    grade: AssessmentPeriodGrade,
  ) -> Result<SubjectGradeRecord> {
    let now = encode_dt(Utc::now());
    let gradebook_str = encode_uuid(gradebook_id);
    let subject_str = encode_uuid(subject_id);
    let new_record_id = encode_uuid(Uuid::new_v4());
    let period_id = grade.period_id;

    let raw: RawRecord = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let (record_id, term_grades, stored_periods) =
          match read_record(&tx, &gradebook_str, &subject_str)? {
            Some(r) => (r.record_id, r.term_grades, r.assessment_period_grades),
            None => (new_record_id, None, None),
          };

        let (period_grades, _) =
          merge_grade(stored_periods.as_deref(), period_id, grade).map_err(json_failure)?;

        let record = RawRecord {
          record_id,
          gradebook_id: gradebook_str,
          subject_id: subject_str,
          term_grades,
          assessment_period_grades: Some(period_grades),
          updated_at: now,
        };
        write_record(&tx, &record)?;

        tx.commit()?;
        Ok(record)
      })
      .await?;

    raw.into_record()
  }

  // ── Results and audit ───────────────────────────────────────────────────

  async fn upsert_term_result(&self, result: TermResult) -> Result<TermResult> {
    let student_str = encode_uuid(result.student_id);
    let term_str = encode_uuid(result.term_id);
    let (gpa, total, earned) = (result.gpa, result.total_credits, result.earned_credits);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO term_results (
             student_id, term_id, gpa, total_credits, earned_credits
           ) VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (student_id, term_id) DO UPDATE SET
             gpa            = excluded.gpa,
             total_credits  = excluded.total_credits,
             earned_credits = excluded.earned_credits",
          params![student_str, term_str, gpa, total, earned],
        )?;
        Ok(())
      })
      .await?;

    Ok(result)
  }

  async fn get_term_result(
    &self,
    student_id: Uuid,
    term_id: Uuid,
  ) -> Result<Option<TermResult>> {
    let student_str = encode_uuid(student_id);
    let term_str = encode_uuid(term_id);

    let raw: Option<RawTermResult> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT student_id, term_id, gpa, total_credits, earned_credits
               FROM term_results WHERE student_id = ?1 AND term_id = ?2",
              params![student_str, term_str],
              |row| {
                Ok(RawTermResult {
                  student_id:     row.get(0)?,
                  term_id:        row.get(1)?,
                  gpa:            row.get(2)?,
                  total_credits:  row.get(3)?,
                  earned_credits: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTermResult::into_result).transpose()
  }

  async fn record_activity_grade(&self, entry: GradeEntry) -> Result<ActivitySubmission> {
    let now = encode_dt(Utc::now());
    let activity_str = encode_uuid(entry.activity_id);
    let student_str = encode_uuid(entry.student_id);
    let history_id = encode_uuid(Uuid::new_v4());
    let obtained = entry.obtained_marks;
    let modified_by = entry.modified_by;
    let reason = entry
      .reason
      .unwrap_or_else(|| ACTIVITY_GRADE_REASON.to_owned());
    let graded = SubmissionStatus::Graded.as_ref().to_owned();

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(subject_id) = tx
          .query_row(
            "SELECT subject_id FROM activities WHERE activity_id = ?1",
            params![activity_str],
            |row| row.get::<_, String>(0),
          )
          .optional()?
        else {
          return Ok(None);
        };

        let old_value = tx
          .query_row(
            "SELECT obtained_marks FROM activity_submissions
             WHERE activity_id = ?1 AND student_id = ?2",
            params![activity_str, student_str],
            |row| row.get::<_, Option<f64>>(0),
          )
          .optional()?
          .flatten();

        tx.execute(
          "INSERT INTO activity_submissions (
             activity_id, student_id, obtained_marks, total_marks,
             status, graded_at, graded_by
           ) VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6)
           ON CONFLICT (activity_id, student_id) DO UPDATE SET
             obtained_marks = excluded.obtained_marks,
             status         = excluded.status,
             graded_at      = excluded.graded_at,
             graded_by      = excluded.graded_by",
          params![activity_str, student_str, obtained, graded, now, modified_by],
        )?;

        let sql = format!(
          "SELECT {} FROM activity_submissions s
           WHERE s.activity_id = ?1 AND s.student_id = ?2",
          RawSubmission::COLUMNS
        );
        let submission =
          tx.query_row(&sql, params![activity_str, student_str], RawSubmission::from_row)?;

        append_history(&tx, &RawHistory {
          history_id,
          student_id: student_str,
          subject_id,
          assessment_id: activity_str,
          grade_value: obtained,
          old_value,
          modified_by,
          reason,
          recorded_at: now,
        })?;

        tx.commit()?;
        Ok(Some(submission))
      })
      .await?;

    match raw {
      Some(submission) => submission.into_submission(),
      None => Err(gradebook_core::Error::ActivityNotFound(entry.activity_id).into()),
    }
  }

  async fn grade_history(&self, student_id: Uuid) -> Result<Vec<GradeHistory>> {
    let id_str = encode_uuid(student_id);

    let raws: Vec<RawHistory> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT history_id, student_id, subject_id, assessment_id,
                  grade_value, old_value, modified_by, reason, recorded_at
           FROM grade_history WHERE student_id = ?1
           ORDER BY seq",
        )?;
        let rows = stmt
          .query_map(params![id_str], |row| {
            Ok(RawHistory {
              history_id:    row.get(0)?,
              student_id:    row.get(1)?,
              subject_id:    row.get(2)?,
              assessment_id: row.get(3)?,
              grade_value:   row.get(4)?,
              old_value:     row.get(5)?,
              modified_by:   row.get(6)?,
              reason:        row.get(7)?,
              recorded_at:   row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistory::into_history).collect()
  }
}
