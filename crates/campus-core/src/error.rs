//! Error types for `campus-core`.
//!
//! The taxonomy separates authentication failures (401 at the API layer),
//! authorization boundaries (403 — deliberate denials, not faults), missing
//! resources (404), uniqueness conflicts (recovered internally where the
//! sign-in race allows), and upstream identity-provider faults (500).

use thiserror::Error;
use uuid::Uuid;

use crate::role::Role;

/// Why a bearer credential was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
  /// No `Authorization: Bearer` header (and no body token) was presented.
  NoCredential,
  /// The identity provider rejected the credential.
  InvalidCredential,
}

impl std::fmt::Display for AuthFailure {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AuthFailure::NoCredential => write!(f, "no credential provided"),
      AuthFailure::InvalidCredential => write!(f, "credential rejected"),
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthenticated: {0}")]
  Unauthenticated(AuthFailure),

  /// The verified email does not belong to the institution.
  #[error("email domain is not allowed")]
  DomainNotAllowed,

  /// No pre-provisioned directory record and self-registration is off.
  #[error("email is not registered; contact the admin")]
  NotPreRegistered,

  #[error("identity provider error: {0}")]
  IdentityProvider(String),

  #[error("role {0:?} is not permitted to perform this action")]
  RoleNotPermitted(Role),

  #[error("resource is owned by a different record")]
  OwnershipMismatch,

  #[error("directory record not found")]
  RecordNotFound,

  #[error("course not found: {0}")]
  CourseNotFound(Uuid),

  /// A uniqueness constraint (email, subject id, course name) was violated.
  #[error("conflict: {0}")]
  Conflict(String),

  /// The course is still referenced by one or more directory records.
  #[error("course {0} is still assigned")]
  CourseInUse(Uuid),

  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  /// An opaque persistence-layer fault (500; detail stays server-side).
  #[error("persistence error: {0}")]
  Store(String),

  /// Faculty must hold between 1 and 4 courses; admin holds none.
  #[error("role {role:?} cannot hold {count} courses")]
  CourseCardinality { role: Role, count: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
