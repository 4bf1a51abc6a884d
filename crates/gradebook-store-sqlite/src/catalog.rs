//! Writes for the reference data the engine only reads: assessment systems,
//! programs, term structures, subjects, classes, enrollments, activities and
//! submissions.
//!
//! In production these rows are owned by the surrounding school system. The
//! methods here exist so a deployment (or a test) can seed a database.

use rusqlite::params;
use uuid::Uuid;

use gradebook_core::{
  assessment::AssessmentSystem,
  catalog::{Activity, ActivitySubmission, Class, Program, Subject},
  term::TermStructure,
};

use crate::{
  Result, SqliteStore,
  encode::{encode_dt, encode_json, encode_uuid},
};

impl SqliteStore {
  pub async fn insert_assessment_system(&self, system: &AssessmentSystem) -> Result<()> {
    let id_str = encode_uuid(system.assessment_system_id);
    let program_str = encode_uuid(system.program_id);
    let name = system.name.clone();
    let kind = system.kind.to_string();
    let scale = encode_json(&system.gpa_scale)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO assessment_systems (
             assessment_system_id, program_id, name, kind, gpa_scale
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          params![id_str, program_str, name, kind, scale],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_program(&self, program: &Program) -> Result<()> {
    let id_str = encode_uuid(program.program_id);
    let name = program.name.clone();
    let system_str = program.assessment_system_id.map(encode_uuid);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO programs (program_id, name, assessment_system_id)
           VALUES (?1, ?2, ?3)",
          params![id_str, name, system_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a term structure with all of its terms and periods in one
  /// transaction.
  pub async fn insert_term_structure(&self, structure: &TermStructure) -> Result<()> {
    let structure_str = encode_uuid(structure.term_structure_id);
    let program_str = encode_uuid(structure.program_id);
    let name = structure.name.clone();
    let ord = structure.order;
    let status = structure.status.to_string();
    let terms: Vec<(String, String, i64, Vec<(String, String, i64, f64)>)> = structure
      .terms
      .iter()
      .map(|term| {
        let periods = term
          .periods
          .iter()
          .map(|p| (encode_uuid(p.period_id), p.name.clone(), p.order, p.weight))
          .collect();
        (encode_uuid(term.term_id), term.name.clone(), term.order, periods)
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO term_structures (
             term_structure_id, program_id, name, ord, status
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          params![structure_str, program_str, name, ord, status],
        )?;
        for (term_id, term_name, term_ord, periods) in &terms {
          tx.execute(
            "INSERT INTO academic_terms (term_id, term_structure_id, name, ord)
             VALUES (?1, ?2, ?3, ?4)",
            params![term_id, structure_str, term_name, term_ord],
          )?;
          for (period_id, period_name, period_ord, weight) in periods {
            tx.execute(
              "INSERT INTO assessment_periods (period_id, term_id, name, ord, weight)
               VALUES (?1, ?2, ?3, ?4, ?5)",
              params![period_id, term_id, period_name, period_ord, weight],
            )?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_subject(&self, subject: &Subject) -> Result<()> {
    let id_str = encode_uuid(subject.subject_id);
    let name = subject.name.clone();
    let credits = subject.credits;
    let config = subject.config.as_ref().map(encode_json).transpose()?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subject_id, name, credits, config_json)
           VALUES (?1, ?2, ?3, ?4)",
          params![id_str, name, credits, config],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a class together with its ordered subject list.
  pub async fn insert_class(&self, class: &Class) -> Result<()> {
    let id_str = encode_uuid(class.class_id);
    let program_str = encode_uuid(class.program_id);
    let name = class.name.clone();
    let structure_str = class.term_structure_id.map(encode_uuid);
    let subjects: Vec<String> = class.subject_ids.iter().copied().map(encode_uuid).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO classes (class_id, program_id, name, term_structure_id)
           VALUES (?1, ?2, ?3, ?4)",
          params![id_str, program_str, name, structure_str],
        )?;
        for (ord, subject_id) in subjects.iter().enumerate() {
          tx.execute(
            "INSERT INTO class_subjects (class_id, subject_id, ord)
             VALUES (?1, ?2, ?3)",
            params![id_str, subject_id, ord as i64],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Enroll students in a class. Already-enrolled students are skipped.
  pub async fn enroll_students(&self, class_id: Uuid, student_ids: &[Uuid]) -> Result<()> {
    let class_str = encode_uuid(class_id);
    let students: Vec<String> = student_ids.iter().copied().map(encode_uuid).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for student_id in &students {
          tx.execute(
            "INSERT OR IGNORE INTO enrollments (class_id, student_id) VALUES (?1, ?2)",
            params![class_str, student_id],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_activity(&self, activity: &Activity) -> Result<()> {
    let id_str = encode_uuid(activity.activity_id);
    let subject_str = encode_uuid(activity.subject_id);
    let period_str = encode_uuid(activity.period_id);
    let title = activity.title.clone();
    let kind = activity.assessment_type.clone();
    let total = activity.total_marks;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO activities (
             activity_id, subject_id, period_id, title, assessment_type, total_marks
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![id_str, subject_str, period_str, title, kind, total],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or replace a submission as-is, whatever its status. Grade entry
  /// goes through [`GradebookStore::record_activity_grade`] instead, which
  /// also writes the audit trail.
  ///
  /// [`GradebookStore::record_activity_grade`]:
  ///   gradebook_core::store::GradebookStore::record_activity_grade
  pub async fn put_submission(&self, submission: &ActivitySubmission) -> Result<()> {
    let activity_str = encode_uuid(submission.activity_id);
    let student_str = encode_uuid(submission.student_id);
    let obtained = submission.obtained_marks;
    let total = submission.total_marks;
    let status = submission.status.to_string();
    let graded_at = submission.graded_at.map(encode_dt);
    let graded_by = submission.graded_by.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO activity_submissions (
             activity_id, student_id, obtained_marks, total_marks,
             status, graded_at, graded_by
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![
            activity_str,
            student_str,
            obtained,
            total,
            status,
            graded_at,
            graded_by
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
