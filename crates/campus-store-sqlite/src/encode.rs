//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Roles are stored as their lowercase names.

use campus_core::{
  course::Course,
  record::DirectoryRecord,
  role::Role,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Student => "student",
    Role::Faculty => "faculty",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "student" => Ok(Role::Student),
    "faculty" => Ok(Role::Faculty),
    "admin" => Ok(Role::Admin),
    other => Err(Error::UnknownRole(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `directory_records` row, plus the
/// assignment ids gathered from `course_assignments`.
pub struct RawRecord {
  pub record_id:           String,
  pub email:               String,
  pub external_subject_id: Option<String>,
  pub display_name:        Option<String>,
  pub avatar_url:          Option<String>,
  pub role:                String,
  pub join_date:           String,
  pub created_at:          String,
  pub updated_at:          String,
  pub course_ids:          Vec<String>,
}

impl RawRecord {
  pub fn into_record(self) -> Result<DirectoryRecord> {
    Ok(DirectoryRecord {
      record_id:           decode_uuid(&self.record_id)?,
      email:               self.email,
      external_subject_id: self.external_subject_id,
      display_name:        self.display_name,
      avatar_url:          self.avatar_url,
      role:                decode_role(&self.role)?,
      course_ids:          self
        .course_ids
        .iter()
        .map(|s| decode_uuid(s))
        .collect::<Result<_>>()?,
      join_date:           decode_dt(&self.join_date)?,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `courses` row.
pub struct RawCourse {
  pub course_id:   String,
  pub name:        String,
  pub description: String,
  pub created_at:  String,
}

impl RawCourse {
  pub fn into_course(self) -> Result<Course> {
    Ok(Course {
      course_id:   decode_uuid(&self.course_id)?,
      name:        self.name,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
