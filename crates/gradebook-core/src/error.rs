//! Error types for `gradebook-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("class not found: {0}")]
  ClassNotFound(Uuid),

  #[error("gradebook not found: {0}")]
  GradeBookNotFound(Uuid),

  #[error("class {0} has no gradebook")]
  NoGradeBookForClass(Uuid),

  #[error("subject not found: {0}")]
  SubjectNotFound(Uuid),

  #[error("academic term not found: {0}")]
  TermNotFound(Uuid),

  #[error("assessment period not found: {0}")]
  PeriodNotFound(Uuid),

  #[error("activity not found: {0}")]
  ActivityNotFound(Uuid),

  /// A gradebook already exists for the class. Raised both by the explicit
  /// existence check and by the storage-level uniqueness constraint.
  #[error("gradebook already exists for class {0}")]
  AlreadyExists(Uuid),

  #[error("missing configuration: {0}")]
  MissingConfiguration(String),

  #[error("invalid GPA scale: {0}")]
  InvalidGpaScale(String),

  #[error("unsupported grade schema version {found} (newest known: {known})")]
  UnsupportedSchemaVersion { found: u32, known: u32 },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification used by outer layers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  AlreadyExists,
  MissingConfiguration,
  Internal,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::ClassNotFound(_)
      | Self::GradeBookNotFound(_)
      | Self::NoGradeBookForClass(_)
      | Self::SubjectNotFound(_)
      | Self::TermNotFound(_)
      | Self::PeriodNotFound(_)
      | Self::ActivityNotFound(_) => ErrorKind::NotFound,
      Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
      Self::MissingConfiguration(_) => ErrorKind::MissingConfiguration,
      Self::InvalidGpaScale(_)
      | Self::UnsupportedSchemaVersion { .. }
      | Self::Serialization(_)
      | Self::Store(_) => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
