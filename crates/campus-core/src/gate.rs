//! The authorization gate: per-route role and ownership checks.
//!
//! Stateless. Ownership is always derived from the authenticated record —
//! a client-supplied owner id in a request body is never consulted.

use uuid::Uuid;

use crate::{
  error::{Error, Result},
  record::DirectoryRecord,
  role::Role,
};

/// A gated action. Ownership-scoped variants carry the id of the record
/// that owns the target resource, as read back from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  // Courses
  ListCourses,
  CreateCourse,
  EditCourse,
  DeleteCourse,
  // Directory administration
  ListDirectory,
  ProvisionRecord,
  EditRecord,
  DeleteRecord,
  ViewDashboard,
  // Collaborator resources (materials, previous-year papers)
  ViewResources,
  UploadResource,
  EditOwnResource { owner: Uuid },
  DeleteOwnResource { owner: Uuid },
}

impl Action {
  /// Roles permitted to perform this action at all.
  fn allowed_roles(self) -> &'static [Role] {
    use Role::*;
    match self {
      Action::ListCourses | Action::ViewResources => {
        &[Student, Faculty, Admin]
      }
      Action::UploadResource
      | Action::EditOwnResource { .. }
      | Action::DeleteOwnResource { .. } => &[Faculty],
      Action::CreateCourse
      | Action::EditCourse
      | Action::DeleteCourse
      | Action::ListDirectory
      | Action::ProvisionRecord
      | Action::EditRecord
      | Action::DeleteRecord
      | Action::ViewDashboard => &[Admin],
    }
  }

  fn owner(self) -> Option<Uuid> {
    match self {
      Action::EditOwnResource { owner } | Action::DeleteOwnResource { owner } => {
        Some(owner)
      }
      _ => None,
    }
  }
}

/// Check that `record` may perform `action`.
///
/// Role membership is checked first, then ownership for self-scoped
/// actions.
pub fn authorize(record: &DirectoryRecord, action: Action) -> Result<()> {
  if !action.allowed_roles().contains(&record.role) {
    return Err(Error::RoleNotPermitted(record.role));
  }
  if let Some(owner) = action.owner()
    && owner != record.record_id
  {
    return Err(Error::OwnershipMismatch);
  }
  Ok(())
}
