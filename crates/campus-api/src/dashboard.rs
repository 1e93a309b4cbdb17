//! Handler for `GET /api/admin/dashboard` — portal-wide counts.

use axum::{Json, extract::State};
use campus_core::{
  gate::{Action, authorize},
  identity::IdentityProvider,
  role::Role,
  store::DirectoryStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

#[derive(Debug, Serialize)]
pub struct DashboardStats {
  pub total_students: u64,
  pub total_faculty:  u64,
  pub total_courses:  u64,
}

/// Per-course assignment counts, split by role.
#[derive(Debug, Serialize)]
pub struct CourseDistribution {
  pub course_id:     Uuid,
  pub name:          String,
  pub faculty_count: u64,
  pub student_count: u64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
  pub stats:               DashboardStats,
  pub course_distribution: Vec<CourseDistribution>,
}

/// `GET /api/admin/dashboard`
pub async fn handler<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<DashboardResponse>, ApiError>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  authorize(&user, Action::ViewDashboard)?;

  let store = &state.store;
  let total_students = store
    .count_records(Role::Student)
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  let total_faculty = store
    .count_records(Role::Faculty)
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  let courses = store
    .list_courses()
    .await
    .map_err(|e| ApiError::from(e.into()))?;

  let mut course_distribution = Vec::with_capacity(courses.len());
  for course in &courses {
    let faculty_count = store
      .count_course_members(course.course_id, Role::Faculty)
      .await
      .map_err(|e| ApiError::from(e.into()))?;
    let student_count = store
      .count_course_members(course.course_id, Role::Student)
      .await
      .map_err(|e| ApiError::from(e.into()))?;
    course_distribution.push(CourseDistribution {
      course_id: course.course_id,
      name: course.name.clone(),
      faculty_count,
      student_count,
    });
  }

  Ok(Json(DashboardResponse {
    stats: DashboardStats {
      total_students,
      total_faculty,
      total_courses: courses.len() as u64,
    },
    course_distribution,
  }))
}
