//! DirectoryRecord — the authoritative row describing one person.
//!
//! A record is pre-provisioned by an admin (email + role + courses) before
//! the person ever signs in; the identity-provider fields are backfilled
//! exactly once at first successful sign-in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  role::Role,
};

/// Upper bound on course assignments for a faculty record.
pub const FACULTY_MAX_COURSES: usize = 4;

// ─── Persisted record ────────────────────────────────────────────────────────

/// One authorized person: identity, role, and course affiliations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryRecord {
  pub record_id:           Uuid,
  /// Stored and compared lower-cased; unique.
  pub email:               String,
  /// Identity-provider subject id; unique once set, `None` until the first
  /// successful sign-in.
  pub external_subject_id: Option<String>,
  pub display_name:        Option<String>,
  pub avatar_url:          Option<String>,
  pub role:                Role,
  pub course_ids:          Vec<Uuid>,
  /// Defaults to creation time; independently editable by admin, used for
  /// the derived years-of-experience display.
  pub join_date:           DateTime<Utc>,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

impl DirectoryRecord {
  /// True while any of the first-sign-in fields is still unset.
  pub fn needs_backfill(&self) -> bool {
    self.external_subject_id.is_none()
      || self.display_name.is_none()
      || self.avatar_url.is_none()
  }

  /// Whole years elapsed since `join_date`, floored at zero.
  pub fn experience_years(&self, now: DateTime<Utc>) -> i64 {
    (now - self.join_date).num_days().max(0) / 365
  }

  /// The public projection returned to clients. Audit fields stay internal.
  pub fn profile(&self) -> Profile {
    Profile {
      id:           self.record_id,
      email:        self.email.clone(),
      role:         self.role,
      display_name: self.display_name.clone(),
      avatar_url:   self.avatar_url.clone(),
      course_ids:   self.course_ids.clone(),
    }
  }

  /// Check the role/course cardinality invariant.
  pub fn validate(&self) -> Result<()> {
    validate_email(&self.email)?;
    validate_course_cardinality(self.role, self.course_ids.len())
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input for creating a directory record, either by admin pre-provisioning
/// or (when policy permits) self-registration at first sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDirectoryRecord {
  pub email:               String,
  pub role:                Role,
  #[serde(default)]
  pub course_ids:          Vec<Uuid>,
  /// Populated immediately for self-registration; `None` when an admin
  /// pre-provisions ahead of first sign-in.
  #[serde(default)]
  pub external_subject_id: Option<String>,
  #[serde(default)]
  pub display_name:        Option<String>,
  #[serde(default)]
  pub avatar_url:          Option<String>,
  /// Defaults to creation time when absent.
  #[serde(default)]
  pub join_date:           Option<DateTime<Utc>>,
}

impl NewDirectoryRecord {
  pub fn validate(&self) -> Result<()> {
    validate_email(&self.email)?;
    validate_course_cardinality(self.role, self.course_ids.len())
  }
}

/// Admin-editable fields of an existing record. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPatch {
  pub role:       Option<Role>,
  pub course_ids: Option<Vec<Uuid>>,
  pub join_date:  Option<DateTime<Utc>>,
}

impl RecordPatch {
  /// Apply the patch and re-check invariants on the result.
  pub fn apply(self, mut record: DirectoryRecord) -> Result<DirectoryRecord> {
    if let Some(role) = self.role {
      record.role = role;
    }
    if let Some(course_ids) = self.course_ids {
      record.course_ids = course_ids;
    }
    if let Some(join_date) = self.join_date {
      record.join_date = join_date;
    }
    record.validate()?;
    Ok(record)
  }
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// The profile shape consumed by every downstream screen and by the
/// authorization gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub id:           Uuid,
  pub email:        String,
  pub role:         Role,
  pub display_name: Option<String>,
  pub avatar_url:   Option<String>,
  pub course_ids:   Vec<Uuid>,
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn validate_email(email: &str) -> Result<()> {
  match email.split_once('@') {
    Some((local, domain))
      if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
    {
      Ok(())
    }
    _ => Err(Error::InvalidEmail(email.to_owned())),
  }
}

/// Faculty hold 1–4 courses; admin holds none; students any number.
pub fn validate_course_cardinality(role: Role, count: usize) -> Result<()> {
  let ok = match role {
    Role::Faculty => (1..=FACULTY_MAX_COURSES).contains(&count),
    Role::Admin => count == 0,
    Role::Student => true,
  };
  if ok {
    Ok(())
  } else {
    Err(Error::CourseCardinality { role, count })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(role: Role, courses: usize) -> DirectoryRecord {
    let now = Utc::now();
    DirectoryRecord {
      record_id:           Uuid::new_v4(),
      email:               "someone@ddu.ac.in".into(),
      external_subject_id: None,
      display_name:        None,
      avatar_url:          None,
      role,
      course_ids:          (0..courses).map(|_| Uuid::new_v4()).collect(),
      join_date:           now,
      created_at:          now,
      updated_at:          now,
    }
  }

  #[test]
  fn faculty_needs_one_to_four_courses() {
    assert!(record(Role::Faculty, 0).validate().is_err());
    assert!(record(Role::Faculty, 1).validate().is_ok());
    assert!(record(Role::Faculty, 4).validate().is_ok());
    assert!(record(Role::Faculty, 5).validate().is_err());
  }

  #[test]
  fn admin_holds_no_courses() {
    assert!(record(Role::Admin, 0).validate().is_ok());
    assert!(record(Role::Admin, 1).validate().is_err());
  }

  #[test]
  fn student_course_count_is_unconstrained() {
    assert!(record(Role::Student, 0).validate().is_ok());
    assert!(record(Role::Student, 9).validate().is_ok());
  }

  #[test]
  fn backfill_flag_clears_only_when_all_fields_set() {
    let mut r = record(Role::Student, 0);
    assert!(r.needs_backfill());
    r.external_subject_id = Some("sub_1".into());
    r.display_name = Some("Jane Doe".into());
    assert!(r.needs_backfill());
    r.avatar_url = Some("https://img.example/jane.png".into());
    assert!(!r.needs_backfill());
  }

  #[test]
  fn patch_reapplies_invariants() {
    let r = record(Role::Student, 0);
    let patch = RecordPatch {
      role: Some(Role::Faculty),
      ..Default::default()
    };
    // Promoting to faculty with zero courses violates cardinality.
    assert!(matches!(
      patch.apply(r),
      Err(Error::CourseCardinality { role: Role::Faculty, count: 0 })
    ));
  }

  #[test]
  fn experience_years_floors_at_zero() {
    let mut r = record(Role::Faculty, 1);
    let now = Utc::now();
    r.join_date = now + chrono::Duration::days(10);
    assert_eq!(r.experience_years(now), 0);
    r.join_date = now - chrono::Duration::days(800);
    assert_eq!(r.experience_years(now), 2);
  }
}
