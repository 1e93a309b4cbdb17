//! Handlers for `/api/courses` endpoints.
//!
//! | Method   | Path | Roles |
//! |----------|------|-------|
//! | `GET`    | `/api/courses` | any signed-in record |
//! | `POST`   | `/api/courses` | admin |
//! | `PUT`    | `/api/courses/:id` | admin |
//! | `DELETE` | `/api/courses/:id` | admin; 409 while the course is assigned |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use campus_core::{
  course::{Course, NewCourse},
  gate::{Action, authorize},
  identity::IdentityProvider,
  store::DirectoryStore,
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// `GET /api/courses`
pub async fn list<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Course>>, ApiError>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  authorize(&user, Action::ListCourses)?;
  let courses = state
    .store
    .list_courses()
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  Ok(Json(courses))
}

/// `POST /api/courses` — body: `{"name":..., "description":...}`
pub async fn create<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<NewCourse>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  authorize(&user, Action::CreateCourse)?;
  let course = state
    .store
    .create_course(body)
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  Ok((StatusCode::CREATED, Json(course)))
}

/// `PUT /api/courses/:id`
pub async fn update<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<NewCourse>,
) -> Result<Json<Course>, ApiError>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  authorize(&user, Action::EditCourse)?;
  let mut course = state
    .store
    .get_course(id)
    .await
    .map_err(|e| ApiError::from(e.into()))?
    .ok_or_else(|| ApiError::NotFound(format!("course {id} not found")))?;
  course.name = body.name;
  course.description = body.description;
  let saved = state
    .store
    .save_course(course)
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  Ok(Json(saved))
}

/// `DELETE /api/courses/:id`
pub async fn delete_one<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  authorize(&user, Action::DeleteCourse)?;
  state
    .store
    .delete_course(id)
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  Ok(StatusCode::NO_CONTENT)
}
