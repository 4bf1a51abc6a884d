//! Grade entry and single-subject refreshes.

use gradebook_core::{
  Error, Result,
  catalog::{ActivitySubmission, GradeEntry},
  grade::{SubjectGradeRecord, TermResult},
  history::{Audit, GradeHistory, TERM_GRADE_REASON},
  store::GradebookStore,
};
use tracing::info;
use uuid::Uuid;

use crate::{GradebookEngine, store_err, term::subject_config};

impl<S: GradebookStore> GradebookEngine<S> {
  /// Record a student's marks for an activity. The submission becomes GRADED
  /// and the change is appended to the student's grade history.
  pub async fn record_activity_grade(&self, entry: GradeEntry) -> Result<ActivitySubmission> {
    let (activity_id, student_id) = (entry.activity_id, entry.student_id);
    let modified_by = entry.modified_by.clone();
    let submission = self
      .store
      .record_activity_grade(entry)
      .await
      .map_err(store_err)?;
    info!(%activity_id, %student_id, %modified_by, "recorded activity grade");
    Ok(submission)
  }

  /// Recompute one subject's term grade for one student and merge it into
  /// the subject's record. `modified_by` is recorded on the history row.
  pub async fn refresh_subject_record(
    &self,
    gradebook_id: Uuid,
    subject_id: Uuid,
    term_id: Uuid,
    student_id: Uuid,
    modified_by: &str,
  ) -> Result<SubjectGradeRecord> {
    let gradebook = self.gradebook(gradebook_id).await?;
    if gradebook.record_for(subject_id).is_none() {
      return Err(Error::SubjectNotFound(subject_id));
    }
    let subject = self.subject(subject_id).await?;
    let system = self.assessment_system(gradebook.assessment_system_id).await?;

    let grade = self.grade_term(&subject, term_id, student_id, &system).await?;
    let audit = Audit::new(modified_by, TERM_GRADE_REASON);
    self
      .store
      .save_term_grade(gradebook_id, subject_id, grade, audit)
      .await
      .map_err(store_err)
  }

  /// Snapshot one student's in-progress period grade into the subject's
  /// record, ahead of the term closing.
  pub async fn snapshot_period_grade(
    &self,
    gradebook_id: Uuid,
    subject_id: Uuid,
    period_id: Uuid,
    student_id: Uuid,
  ) -> Result<SubjectGradeRecord> {
    let gradebook = self.gradebook(gradebook_id).await?;
    if gradebook.record_for(subject_id).is_none() {
      return Err(Error::SubjectNotFound(subject_id));
    }
    let subject = self.subject(subject_id).await?;
    let config = subject_config(&subject)?;

    let grade = self
      .period_grade(
        subject_id,
        period_id,
        student_id,
        gradebook.assessment_system_id,
        config,
      )
      .await?;
    self
      .store
      .save_period_snapshot(gradebook_id, subject_id, grade)
      .await
      .map_err(store_err)
  }

  /// The persisted cumulative result of a student's term, if it has been
  /// computed.
  pub async fn term_result(&self, student_id: Uuid, term_id: Uuid) -> Result<Option<TermResult>> {
    self
      .store
      .get_term_result(student_id, term_id)
      .await
      .map_err(store_err)
  }

  /// A student's grade audit trail, oldest first.
  pub async fn grade_history(&self, student_id: Uuid) -> Result<Vec<GradeHistory>> {
    self.store.grade_history(student_id).await.map_err(store_err)
  }
}
