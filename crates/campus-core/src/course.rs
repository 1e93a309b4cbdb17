//! Course — the foreign-key target for directory course affiliations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
  pub course_id:   Uuid,
  /// Unique across all courses.
  pub name:        String,
  pub description: String,
  pub created_at:  DateTime<Utc>,
}

/// Input for `POST /api/courses`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
  pub name:        String,
  pub description: String,
}
