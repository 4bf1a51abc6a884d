//! Subject term grade aggregation.

use gradebook_core::{
  Error, Result,
  assessment::{AssessmentSystem, SubjectAssessmentConfig},
  calc,
  catalog::Subject,
  grade::SubjectTermGrade,
  store::GradebookStore,
};
use uuid::Uuid;

use crate::{GradebookEngine, store_err};

impl<S: GradebookStore> GradebookEngine<S> {
  /// Compute a subject's term grade for one student from every period of the
  /// term. Read-only.
  ///
  /// Fails with [`Error::MissingConfiguration`] if the subject has no
  /// assessment config.
  pub async fn term_grade(
    &self,
    subject_id: Uuid,
    term_id: Uuid,
    student_id: Uuid,
    assessment_system_id: Uuid,
  ) -> Result<SubjectTermGrade> {
    let subject = self.subject(subject_id).await?;
    let system = self.assessment_system(assessment_system_id).await?;
    self.grade_term(&subject, term_id, student_id, &system).await
  }

  pub(crate) async fn grade_term(
    &self,
    subject: &Subject,
    term_id: Uuid,
    student_id: Uuid,
    system: &AssessmentSystem,
  ) -> Result<SubjectTermGrade> {
    let config = subject_config(subject)?;
    let periods = self.store.list_periods(term_id).await.map_err(store_err)?;

    let mut grades = Vec::with_capacity(periods.len());
    for period in &periods {
      let grade = self
        .grade_period(subject.subject_id, period, student_id, config, system)
        .await?;
      grades.push(grade);
    }

    Ok(calc::term_grade(term_id, student_id, grades, subject, config, system))
  }

  pub(crate) async fn subject(&self, subject_id: Uuid) -> Result<Subject> {
    self
      .store
      .get_subject(subject_id)
      .await
      .map_err(store_err)?
      .ok_or(Error::SubjectNotFound(subject_id))
  }
}

pub(crate) fn subject_config(subject: &Subject) -> Result<&SubjectAssessmentConfig> {
  subject.config.as_ref().ok_or_else(|| {
    Error::MissingConfiguration(format!(
      "subject {:?} ({}) has no assessment configuration",
      subject.name, subject.subject_id
    ))
  })
}
