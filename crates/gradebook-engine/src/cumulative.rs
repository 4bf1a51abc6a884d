//! Cumulative (term-wide) grade calculation.

use std::collections::BTreeMap;

use gradebook_core::{
  Error, Result,
  assessment::AssessmentSystem,
  calc,
  catalog::Subject,
  grade::{CumulativeGrade, GradeBook},
  history::{Audit, TERM_GRADE_REASON},
  store::GradebookStore,
};
use tracing::warn;
use uuid::Uuid;

use crate::{GradebookEngine, store_err};

/// The inputs of a recomputation that do not vary per student.
pub(crate) struct GradingContext {
  pub gradebook: GradeBook,
  pub system:    AssessmentSystem,
  /// The class's subjects, in class order.
  pub subjects:  Vec<Subject>,
}

impl<S: GradebookStore> GradebookEngine<S> {
  /// Recompute a student's term: grade and persist every subject of the
  /// class, then upsert the credit-weighted term result. Each persisted
  /// subject grade is attributed to `modified_by` in the history.
  pub async fn cumulative_grade(
    &self,
    gradebook_id: Uuid,
    student_id: Uuid,
    term_id: Uuid,
    modified_by: &str,
  ) -> Result<CumulativeGrade> {
    let ctx = self.grading_context(gradebook_id, term_id).await?;
    self.recompute_student(&ctx, student_id, term_id, modified_by).await
  }

  /// Resolve the gradebook, check that `term_id` belongs to its term
  /// structure, and load the assessment system and subjects.
  pub(crate) async fn grading_context(
    &self,
    gradebook_id: Uuid,
    term_id: Uuid,
  ) -> Result<GradingContext> {
    let gradebook = self.gradebook(gradebook_id).await?;

    let structure = self
      .store
      .get_term_structure(gradebook.term_structure_id)
      .await
      .map_err(store_err)?
      .ok_or_else(|| {
        Error::MissingConfiguration(format!(
          "term structure {} does not exist",
          gradebook.term_structure_id
        ))
      })?;
    if !structure.terms.iter().any(|t| t.term_id == term_id) {
      return Err(Error::TermNotFound(term_id));
    }

    let class = self
      .store
      .get_class(gradebook.class_id)
      .await
      .map_err(store_err)?
      .ok_or(Error::ClassNotFound(gradebook.class_id))?;
    let system = self.assessment_system(gradebook.assessment_system_id).await?;

    let mut subjects = Vec::with_capacity(class.subject_ids.len());
    for subject_id in class.subject_ids {
      subjects.push(self.subject(subject_id).await?);
    }

    Ok(GradingContext { gradebook, system, subjects })
  }

  pub(crate) async fn recompute_student(
    &self,
    ctx: &GradingContext,
    student_id: Uuid,
    term_id: Uuid,
    modified_by: &str,
  ) -> Result<CumulativeGrade> {
    let mut subject_grades = BTreeMap::new();
    for subject in &ctx.subjects {
      let grade = self
        .grade_term(subject, term_id, student_id, &ctx.system)
        .await?;
      self
        .store
        .save_term_grade(
          ctx.gradebook.gradebook_id,
          subject.subject_id,
          grade.clone(),
          Audit::new(modified_by, TERM_GRADE_REASON),
        )
        .await
        .map_err(store_err)?;
      subject_grades.insert(subject.subject_id, grade);
    }

    let cumulative = calc::cumulative_grade(student_id, term_id, subject_grades);
    if !cumulative.uncredited_subjects.is_empty() {
      warn!(
        %student_id,
        %term_id,
        subjects = ?cumulative.uncredited_subjects,
        "subjects without credits do not count towards GPA"
      );
    }

    self
      .store
      .upsert_term_result(cumulative.term_result())
      .await
      .map_err(store_err)?;
    Ok(cumulative)
  }
}
