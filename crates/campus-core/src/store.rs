//! The `DirectoryStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `campus-store-sqlite`). Higher layers (`campus-api`, the sign-in
//! orchestrator) depend on this abstraction, not on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  course::{Course, NewCourse},
  record::{DirectoryRecord, NewDirectoryRecord},
  role::Role,
};

/// Abstraction over a Campus directory backend.
///
/// Backends must enforce uniqueness of `email` and `external_subject_id`
/// (reporting violations as an error convertible to
/// [`Error::Conflict`](crate::Error::Conflict)) and referential integrity of
/// `course_ids` at write time. The sign-in orchestrator relies on the
/// uniqueness guarantee to resolve the concurrent first-sign-in race.
pub trait DirectoryStore: Send + Sync {
  type Error: std::error::Error
    + Into<crate::Error>
    + Send
    + Sync
    + 'static;

  // ── Directory records ─────────────────────────────────────────────────

  /// Persist a new record. The store assigns id and audit timestamps and
  /// lower-cases the email. Fails on duplicate email/subject id, invariant
  /// violations, or unknown course references.
  fn create_record(
    &self,
    input: NewDirectoryRecord,
  ) -> impl Future<Output = Result<DirectoryRecord, Self::Error>> + Send + '_;

  fn get_record(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<DirectoryRecord>, Self::Error>> + Send + '_;

  /// Lookup by email; comparison is lower-cased.
  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<DirectoryRecord>, Self::Error>> + Send + 'a;

  /// Lookup by identity-provider subject id.
  fn find_by_subject_id<'a>(
    &'a self,
    subject_id: &'a str,
  ) -> impl Future<Output = Result<Option<DirectoryRecord>, Self::Error>> + Send + 'a;

  /// List all records, optionally filtered by role.
  fn list_records(
    &self,
    role: Option<Role>,
  ) -> impl Future<Output = Result<Vec<DirectoryRecord>, Self::Error>> + Send + '_;

  /// Upsert-by-id. Re-checks invariants and course references, bumps
  /// `updated_at`, and returns the persisted state.
  fn save_record(
    &self,
    record: DirectoryRecord,
  ) -> impl Future<Output = Result<DirectoryRecord, Self::Error>> + Send + '_;

  /// Hard delete; no tombstone.
  fn delete_record(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn count_records(
    &self,
    role: Role,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Courses ───────────────────────────────────────────────────────────

  fn create_course(
    &self,
    input: NewCourse,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  fn get_course(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  fn list_courses(
    &self,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  fn save_course(
    &self,
    course: Course,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  /// Hard delete. Fails while any record still references the course, so
  /// "no record references a missing course" keeps holding.
  fn delete_course(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Number of records with `role` assigned to `course_id`; feeds the
  /// admin dashboard's per-course distribution.
  fn count_course_members(
    &self,
    course_id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
