//! Handlers for `/gradebook/{class_id}` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/gradebook/:class_id` | 201 + gradebook; 409 if one exists |
//! | `GET`  | `/gradebook/:class_id` | Gradebook with its assessment system |
//! | `POST` | `/gradebook/:class_id/recompute` | Body: [`RecomputeBody`]; returns the batch report |
//! | `POST` | `/gradebook/:class_id/students/:student_id/recompute` | Body: [`TermBody`] |
//! | `POST` | `/gradebook/:class_id/subjects/:subject_id/refresh` | Body: [`RefreshBody`] |
//! | `POST` | `/gradebook/:class_id/snapshots` | Body: [`SnapshotBody`] |
//! | `GET`  | `/gradebook/:class_id/issues` | Configuration problems, empty when none |
//!
//! Term grades written by the recompute and refresh routes are attributed to
//! the caller's [`Actor`] in the grade history.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use gradebook_core::{
  Error,
  grade::{CumulativeGrade, GradeBookSnapshot, SubjectGradeRecord},
  store::GradebookStore,
};
use gradebook_engine::{BatchReport, ConfigurationIssue, GradebookEngine};
use serde::Deserialize;
use uuid::Uuid;

use crate::{actor::Actor, error::ApiError};

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// `POST /gradebook/:class_id`
pub async fn initialize<S>(
  State(engine): State<GradebookEngine<S>>,
  Path(class_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GradebookStore,
{
  let gradebook = engine.initialize_gradebook(class_id).await?;
  Ok((StatusCode::CREATED, Json(gradebook)))
}

/// `GET /gradebook/:class_id`
pub async fn snapshot<S>(
  State(engine): State<GradebookEngine<S>>,
  Path(class_id): Path<Uuid>,
) -> Result<Json<GradeBookSnapshot>, ApiError>
where
  S: GradebookStore,
{
  let snapshot = engine
    .gradebook_snapshot(class_id)
    .await?
    .ok_or(Error::NoGradeBookForClass(class_id))?;
  Ok(Json(snapshot))
}

// ─── Recomputation ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecomputeBody {
  pub term_id:    Uuid,
  /// Overrides the configured batch size for this run.
  pub batch_size: Option<usize>,
}

/// `POST /gradebook/:class_id/recompute`
pub async fn recompute<S>(
  State(engine): State<GradebookEngine<S>>,
  Path(class_id): Path<Uuid>,
  actor: Actor,
  Json(body): Json<RecomputeBody>,
) -> Result<Json<BatchReport>, ApiError>
where
  S: GradebookStore,
{
  let gradebook = engine.gradebook_for_class(class_id).await?;
  let report = engine
    .batch_recompute(gradebook.gradebook_id, body.term_id, body.batch_size, actor.name())
    .await?;
  Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct TermBody {
  pub term_id: Uuid,
}

/// `POST /gradebook/:class_id/students/:student_id/recompute`
pub async fn recompute_student<S>(
  State(engine): State<GradebookEngine<S>>,
  Path((class_id, student_id)): Path<(Uuid, Uuid)>,
  actor: Actor,
  Json(body): Json<TermBody>,
) -> Result<Json<CumulativeGrade>, ApiError>
where
  S: GradebookStore,
{
  let gradebook = engine.gradebook_for_class(class_id).await?;
  let grade = engine
    .cumulative_grade(gradebook.gradebook_id, student_id, body.term_id, actor.name())
    .await?;
  Ok(Json(grade))
}

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
  pub term_id:    Uuid,
  pub student_id: Uuid,
}

/// `POST /gradebook/:class_id/subjects/:subject_id/refresh`
pub async fn refresh_subject<S>(
  State(engine): State<GradebookEngine<S>>,
  Path((class_id, subject_id)): Path<(Uuid, Uuid)>,
  actor: Actor,
  Json(body): Json<RefreshBody>,
) -> Result<Json<SubjectGradeRecord>, ApiError>
where
  S: GradebookStore,
{
  let gradebook = engine.gradebook_for_class(class_id).await?;
  let record = engine
    .refresh_subject_record(
      gradebook.gradebook_id,
      subject_id,
      body.term_id,
      body.student_id,
      actor.name(),
    )
    .await?;
  Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct SnapshotBody {
  pub subject_id: Uuid,
  pub period_id:  Uuid,
  pub student_id: Uuid,
}

/// `POST /gradebook/:class_id/snapshots`
pub async fn snapshot_period<S>(
  State(engine): State<GradebookEngine<S>>,
  Path(class_id): Path<Uuid>,
  Json(body): Json<SnapshotBody>,
) -> Result<Json<SubjectGradeRecord>, ApiError>
where
  S: GradebookStore,
{
  let gradebook = engine.gradebook_for_class(class_id).await?;
  let record = engine
    .snapshot_period_grade(
      gradebook.gradebook_id,
      body.subject_id,
      body.period_id,
      body.student_id,
    )
    .await?;
  Ok(Json(record))
}

// ─── Validation ───────────────────────────────────────────────────────────────

/// `GET /gradebook/:class_id/issues`
pub async fn issues<S>(
  State(engine): State<GradebookEngine<S>>,
  Path(class_id): Path<Uuid>,
) -> Result<Json<Vec<ConfigurationIssue>>, ApiError>
where
  S: GradebookStore,
{
  Ok(Json(engine.validate_class(class_id).await?))
}
