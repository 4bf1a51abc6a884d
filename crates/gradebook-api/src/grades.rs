//! Handlers for grade entry and per-student reads.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/grades` | Body: [`GradeBody`]; the caller is recorded as `modified_by` |
//! | `GET`  | `/students/:student_id/terms/:term_id` | 404 until the term is computed |
//! | `GET`  | `/students/:student_id/history` | Oldest first |

use axum::{
  Json,
  extract::{Path, State},
};
use gradebook_core::{
  catalog::{ActivitySubmission, GradeEntry},
  grade::TermResult,
  history::GradeHistory,
  store::GradebookStore,
};
use gradebook_engine::GradebookEngine;
use serde::Deserialize;
use uuid::Uuid;

use crate::{actor::Actor, error::ApiError};

// ─── Grade entry ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GradeBody {
  pub activity_id:    Uuid,
  pub student_id:     Uuid,
  pub obtained_marks: f64,
  pub reason:         Option<String>,
}

/// `POST /grades`
pub async fn record<S>(
  State(engine): State<GradebookEngine<S>>,
  actor: Actor,
  Json(body): Json<GradeBody>,
) -> Result<Json<ActivitySubmission>, ApiError>
where
  S: GradebookStore,
{
  if !body.obtained_marks.is_finite() || body.obtained_marks < 0.0 {
    return Err(ApiError::BadRequest(format!(
      "obtained_marks must be a non-negative number, got {}",
      body.obtained_marks
    )));
  }

  let submission = engine
    .record_activity_grade(GradeEntry {
      activity_id:    body.activity_id,
      student_id:     body.student_id,
      obtained_marks: body.obtained_marks,
      modified_by:    actor.0,
      reason:         body.reason,
    })
    .await?;
  Ok(Json(submission))
}

// ─── Student reads ────────────────────────────────────────────────────────────

/// `GET /students/:student_id/terms/:term_id`
pub async fn term_result<S>(
  State(engine): State<GradebookEngine<S>>,
  Path((student_id, term_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TermResult>, ApiError>
where
  S: GradebookStore,
{
  let result = engine
    .term_result(student_id, term_id)
    .await?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no result for student {student_id} in term {term_id}"))
    })?;
  Ok(Json(result))
}

/// `GET /students/:student_id/history`
pub async fn history<S>(
  State(engine): State<GradebookEngine<S>>,
  Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<GradeHistory>>, ApiError>
where
  S: GradebookStore,
{
  Ok(Json(engine.grade_history(student_id).await?))
}
