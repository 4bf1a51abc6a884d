//! Period grade calculation.

use gradebook_core::{
  Error, Result,
  assessment::{AssessmentSystem, SubjectAssessmentConfig},
  calc,
  grade::AssessmentPeriodGrade,
  store::GradebookStore,
  term::AssessmentPeriod,
};
use uuid::Uuid;

use crate::{GradebookEngine, store_err};

impl<S: GradebookStore> GradebookEngine<S> {
  /// One student's grade for one subject within one assessment period.
  ///
  /// Read-only: nothing is persisted.
  pub async fn period_grade(
    &self,
    subject_id: Uuid,
    period_id: Uuid,
    student_id: Uuid,
    assessment_system_id: Uuid,
    config: &SubjectAssessmentConfig,
  ) -> Result<AssessmentPeriodGrade> {
    let period = self
      .store
      .get_period(period_id)
      .await
      .map_err(store_err)?
      .ok_or(Error::PeriodNotFound(period_id))?;
    let system = self.assessment_system(assessment_system_id).await?;
    self
      .grade_period(subject_id, &period, student_id, config, &system)
      .await
  }

  pub(crate) async fn grade_period(
    &self,
    subject_id: Uuid,
    period: &AssessmentPeriod,
    student_id: Uuid,
    config: &SubjectAssessmentConfig,
    system: &AssessmentSystem,
  ) -> Result<AssessmentPeriodGrade> {
    let work = self
      .store
      .graded_submissions(subject_id, period.period_id, student_id)
      .await
      .map_err(store_err)?;
    Ok(calc::period_grade(period, &work, config, system))
  }

  pub(crate) async fn assessment_system(
    &self,
    assessment_system_id: Uuid,
  ) -> Result<AssessmentSystem> {
    self
      .store
      .get_assessment_system(assessment_system_id)
      .await
      .map_err(store_err)?
      .ok_or_else(|| {
        Error::MissingConfiguration(format!(
          "assessment system {assessment_system_id} does not exist"
        ))
      })
  }
}
