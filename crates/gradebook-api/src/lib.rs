//! JSON REST API for the gradebook engine.
//!
//! Exposes an axum [`Router`] backed by a [`GradebookEngine`] over any
//! [`gradebook_core::store::GradebookStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility; an auth layer identifies the
//! caller by inserting an [`Actor`] into the request extensions.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", gradebook_api::api_router(engine.clone()))
//! ```

pub mod actor;
pub mod error;
pub mod grades;
pub mod gradebooks;

use axum::{
  Router,
  routing::{get, post},
};
use gradebook_core::store::GradebookStore;
use gradebook_engine::GradebookEngine;

pub use actor::Actor;
pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: GradebookEngine<S>) -> Router<()>
where
  S: GradebookStore + 'static,
{
  Router::new()
    // Gradebooks
    .route(
      "/gradebook/{class_id}",
      get(gradebooks::snapshot::<S>).post(gradebooks::initialize::<S>),
    )
    .route("/gradebook/{class_id}/recompute", post(gradebooks::recompute::<S>))
    .route(
      "/gradebook/{class_id}/students/{student_id}/recompute",
      post(gradebooks::recompute_student::<S>),
    )
    .route(
      "/gradebook/{class_id}/subjects/{subject_id}/refresh",
      post(gradebooks::refresh_subject::<S>),
    )
    .route("/gradebook/{class_id}/snapshots", post(gradebooks::snapshot_period::<S>))
    .route("/gradebook/{class_id}/issues", get(gradebooks::issues::<S>))
    // Grades
    .route("/grades", post(grades::record::<S>))
    .route("/students/{student_id}/terms/{term_id}", get(grades::term_result::<S>))
    .route("/students/{student_id}/history", get(grades::history::<S>))
    .with_state(engine)
}
