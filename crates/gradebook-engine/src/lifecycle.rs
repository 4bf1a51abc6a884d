//! Gradebook creation, lookup, and class-wide batch recomputation.

use std::time::Duration;

use futures::future::join_all;
use gradebook_core::{
  Error, Result,
  grade::{GradeBook, GradeBookSnapshot, NewGradeBook},
  store::GradebookStore,
};
use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{GradebookEngine, store_err};

/// A student whose recomputation failed during a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentFailure {
  pub student_id: Uuid,
  pub error:      String,
}

/// Outcome of [`GradebookEngine::batch_recompute`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
  pub batches:   usize,
  pub succeeded: usize,
  pub failed:    Vec<StudentFailure>,
}

impl<S: GradebookStore> GradebookEngine<S> {
  /// Create the gradebook for a class: bind the program's assessment system
  /// and its first active term structure, and create one empty record per
  /// subject.
  ///
  /// # Errors
  /// - [`Error::ClassNotFound`] if the class does not exist.
  /// - [`Error::AlreadyExists`] if the class already has a gradebook, or
  ///   another initialisation wins a race for it.
  /// - [`Error::MissingConfiguration`] if the program has no assessment
  ///   system or no active term structure.
  pub async fn initialize_gradebook(&self, class_id: Uuid) -> Result<GradeBook> {
    let class = self
      .store
      .get_class(class_id)
      .await
      .map_err(store_err)?
      .ok_or(Error::ClassNotFound(class_id))?;

    if self
      .store
      .find_gradebook_for_class(class_id)
      .await
      .map_err(store_err)?
      .is_some()
    {
      return Err(Error::AlreadyExists(class_id));
    }

    let system = self
      .store
      .program_assessment_system(class.program_id)
      .await
      .map_err(store_err)?
      .ok_or_else(|| {
        Error::MissingConfiguration(format!(
          "program {} has no assessment system",
          class.program_id
        ))
      })?;

    let structure = self
      .store
      .first_active_term_structure(class.program_id)
      .await
      .map_err(store_err)?
      .ok_or_else(|| {
        Error::MissingConfiguration(format!(
          "program {} has no active term structure",
          class.program_id
        ))
      })?;

    let gradebook = self
      .store
      .create_gradebook(NewGradeBook {
        class_id,
        assessment_system_id: system.assessment_system_id,
        term_structure_id: structure.term_structure_id,
        subject_ids: class.subject_ids,
      })
      .await
      .map_err(store_err)?;

    info!(
      %class_id,
      gradebook_id = %gradebook.gradebook_id,
      subjects = gradebook.subject_records.len(),
      "initialized gradebook"
    );
    Ok(gradebook)
  }

  /// The class's gradebook together with its assessment system, or `None`
  /// if the class has no gradebook yet.
  pub async fn gradebook_snapshot(&self, class_id: Uuid) -> Result<Option<GradeBookSnapshot>> {
    let Some(gradebook) = self
      .store
      .find_gradebook_for_class(class_id)
      .await
      .map_err(store_err)?
    else {
      return Ok(None);
    };
    let assessment_system = self.assessment_system(gradebook.assessment_system_id).await?;
    Ok(Some(GradeBookSnapshot { gradebook, assessment_system }))
  }

  pub async fn gradebook_for_class(&self, class_id: Uuid) -> Result<GradeBook> {
    self
      .store
      .find_gradebook_for_class(class_id)
      .await
      .map_err(store_err)?
      .ok_or(Error::NoGradeBookForClass(class_id))
  }

  pub(crate) async fn gradebook(&self, gradebook_id: Uuid) -> Result<GradeBook> {
    self
      .store
      .get_gradebook(gradebook_id)
      .await
      .map_err(store_err)?
      .ok_or(Error::GradeBookNotFound(gradebook_id))
  }

  /// Recompute the cumulative grade of every student on the class roster.
  ///
  /// The roster is processed in batches of `batch_size` (falling back to the
  /// configured size); students within a batch run concurrently, and the
  /// configured delay separates consecutive batches. A student whose
  /// recomputation fails is logged and reported, and never aborts the run.
  ///
  /// Errors are returned only for problems shared by the whole class, such
  /// as an unknown gradebook or a term outside its term structure.
  pub async fn batch_recompute(
    &self,
    gradebook_id: Uuid,
    term_id: Uuid,
    batch_size: Option<usize>,
    modified_by: &str,
  ) -> Result<BatchReport> {
    let ctx = self.grading_context(gradebook_id, term_id).await?;
    let roster = self
      .store
      .list_roster(ctx.gradebook.class_id)
      .await
      .map_err(store_err)?;

    let batch_size = batch_size.unwrap_or(self.config.batch_size).max(1);
    let delay = Duration::from_millis(self.config.batch_delay_ms);
    info!(
      %gradebook_id,
      %term_id,
      students = roster.len(),
      batch_size,
      %modified_by,
      "starting batch recompute"
    );

    let mut report = BatchReport::default();
    for (index, batch) in roster.chunks(batch_size).enumerate() {
      if index > 0 && !delay.is_zero() {
        tokio::time::sleep(delay).await;
      }

      let ctx = &ctx;
      let pending: Vec<_> = batch
        .iter()
        .map(move |&student_id| async move {
          (student_id, self.recompute_student(ctx, student_id, term_id, modified_by).await)
        })
        .collect();

      for (student_id, outcome) in join_all(pending).await {
        match outcome {
          Ok(_) => report.succeeded += 1,
          Err(err) => {
            error!(%student_id, %term_id, error = %err, "student recompute failed");
            report.failed.push(StudentFailure { student_id, error: err.to_string() });
          }
        }
      }

      report.batches += 1;
      debug!(batch = index + 1, students = batch.len(), "batch complete");
    }

    info!(
      %gradebook_id,
      %term_id,
      batches = report.batches,
      succeeded = report.succeeded,
      failed = report.failed.len(),
      "batch recompute finished"
    );
    Ok(report)
  }
}
