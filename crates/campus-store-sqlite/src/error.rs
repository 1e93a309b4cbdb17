//! Error type for `campus-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] campus_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A UNIQUE constraint was violated (email, subject id, or course name).
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown role value: {0:?}")]
  UnknownRole(String),

  #[error("directory record not found: {0}")]
  RecordNotFound(Uuid),

  #[error("course not found: {0}")]
  CourseNotFound(Uuid),

  #[error("course {0} is still assigned to one or more records")]
  CourseInUse(Uuid),
}

/// Surface UNIQUE/FK violations as [`Error::Conflict`] so callers (the
/// sign-in orchestrator in particular) can tell a lost race from a fault.
impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
      f,
      ref msg,
    )) = e
      && f.code == rusqlite::ErrorCode::ConstraintViolation
    {
      return Error::Conflict(
        msg.clone().unwrap_or_else(|| "constraint violation".to_owned()),
      );
    }
    Error::Database(e)
  }
}

impl From<Error> for campus_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::Conflict(msg) => campus_core::Error::Conflict(msg),
      Error::RecordNotFound(_) => campus_core::Error::RecordNotFound,
      Error::CourseNotFound(id) => campus_core::Error::CourseNotFound(id),
      Error::CourseInUse(id) => campus_core::Error::CourseInUse(id),
      Error::Database(inner) => campus_core::Error::Store(inner.to_string()),
      Error::Uuid(inner) => campus_core::Error::Store(inner.to_string()),
      Error::DateParse(msg) => campus_core::Error::Store(msg),
      Error::UnknownRole(v) => {
        campus_core::Error::Store(format!("unknown role value: {v:?}"))
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
