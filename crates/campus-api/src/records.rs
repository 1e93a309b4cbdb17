//! Handlers for directory-record administration and the faculty profile.
//!
//! | Method   | Path | Roles |
//! |----------|------|-------|
//! | `GET`    | `/api/records[?role=...]` | admin |
//! | `POST`   | `/api/records` | admin (pre-provisioning) |
//! | `PUT`    | `/api/records/:id` | admin |
//! | `DELETE` | `/api/records/:id` | admin; hard delete |
//! | `GET`    | `/api/faculty/profile` | faculty; derived from own identity |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use campus_core::{
  Error,
  gate::{Action, authorize},
  identity::IdentityProvider,
  record::{DirectoryRecord, NewDirectoryRecord, Profile, RecordPatch},
  role::Role,
  store::DirectoryStore,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

// ─── DTOs ─────────────────────────────────────────────────────────────────────

/// The admin-screen projection of one directory record.
#[derive(Debug, Serialize)]
pub struct RecordSummary {
  pub id:               Uuid,
  pub email:            String,
  pub role:             Role,
  pub display_name:     Option<String>,
  pub avatar_url:       Option<String>,
  pub course_ids:       Vec<Uuid>,
  pub join_date:        DateTime<Utc>,
  pub created_at:       DateTime<Utc>,
  /// Present for faculty records only.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub experience_years: Option<i64>,
}

impl RecordSummary {
  fn from_record(record: &DirectoryRecord, now: DateTime<Utc>) -> Self {
    Self {
      id:               record.record_id,
      email:            record.email.clone(),
      role:             record.role,
      display_name:     record.display_name.clone(),
      avatar_url:       record.avatar_url.clone(),
      course_ids:       record.course_ids.clone(),
      join_date:        record.join_date,
      created_at:       record.created_at,
      experience_years: (record.role == Role::Faculty)
        .then(|| record.experience_years(now)),
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub role: Option<Role>,
}

/// `GET /api/records[?role=<role>]`
pub async fn list<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<RecordSummary>>, ApiError>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  authorize(&user, Action::ListDirectory)?;
  let records = state
    .store
    .list_records(params.role)
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  let now = Utc::now();
  Ok(Json(
    records
      .iter()
      .map(|r| RecordSummary::from_record(r, now))
      .collect(),
  ))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /api/records` — admin pre-provisioning of email + role + courses.
pub async fn create<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<NewDirectoryRecord>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  authorize(&user, Action::ProvisionRecord)?;
  let record = state
    .store
    .create_record(body)
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  Ok((
    StatusCode::CREATED,
    Json(RecordSummary::from_record(&record, Utc::now())),
  ))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /api/records/:id` — body: [`RecordPatch`]; absent fields unchanged.
pub async fn update<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<RecordPatch>,
) -> Result<Json<RecordSummary>, ApiError>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  authorize(&user, Action::EditRecord)?;
  let record = state
    .store
    .get_record(id)
    .await
    .map_err(|e| ApiError::from(e.into()))?
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))?;
  let patched = patch.apply(record)?;
  let saved = state
    .store
    .save_record(patched)
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  Ok(Json(RecordSummary::from_record(&saved, Utc::now())))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/records/:id` — hard delete, no tombstone.
pub async fn delete_one<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  authorize(&user, Action::DeleteRecord)?;
  state
    .store
    .delete_record(id)
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Faculty profile ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FacultyProfileResponse {
  pub faculty:          Profile,
  pub join_date:        DateTime<Utc>,
  pub experience_years: i64,
}

/// `GET /api/faculty/profile`
///
/// The faculty record is derived from the verified identity; there is no
/// way to request another faculty member's profile through this route.
pub async fn faculty_profile<S, P>(
  State(_state): State<AppState<S, P>>,
  CurrentUser(record): CurrentUser,
) -> Result<Json<FacultyProfileResponse>, ApiError>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  if record.role != Role::Faculty {
    return Err(Error::RoleNotPermitted(record.role).into());
  }
  let now = Utc::now();
  Ok(Json(FacultyProfileResponse {
    faculty:          record.profile(),
    join_date:        record.join_date,
    experience_years: record.experience_years(now),
  }))
}

#[cfg(test)]
mod tests {
  use campus_core::gate::{Action, authorize};
  use chrono::Utc;

  use super::*;

  fn record(role: Role) -> DirectoryRecord {
    let now = Utc::now();
    DirectoryRecord {
      record_id:           Uuid::new_v4(),
      email:               "who@ddu.ac.in".into(),
      external_subject_id: Some("sub_1".into()),
      display_name:        Some("Who Ever".into()),
      avatar_url:          None,
      role,
      course_ids:          vec![],
      join_date:           now - chrono::Duration::days(400),
      created_at:          now,
      updated_at:          now,
    }
  }

  #[test]
  fn directory_listing_is_admin_only() {
    assert!(authorize(&record(Role::Admin), Action::ListDirectory).is_ok());
    assert!(authorize(&record(Role::Faculty), Action::ListDirectory).is_err());
    assert!(authorize(&record(Role::Student), Action::ListDirectory).is_err());
  }

  #[test]
  fn summary_derives_experience_for_faculty_only() {
    let now = Utc::now();
    let faculty = RecordSummary::from_record(&record(Role::Faculty), now);
    assert_eq!(faculty.experience_years, Some(1));

    let student = RecordSummary::from_record(&record(Role::Student), now);
    assert!(student.experience_years.is_none());
  }
}
