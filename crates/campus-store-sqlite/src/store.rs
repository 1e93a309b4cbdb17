//! [`SqliteStore`] — the SQLite implementation of [`DirectoryStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use campus_core::{
  course::{Course, NewCourse},
  record::{DirectoryRecord, NewDirectoryRecord},
  role::Role,
  store::DirectoryStore,
};

use crate::{
  Error, Result,
  encode::{
    RawCourse, RawRecord, encode_dt, encode_role, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Campus directory store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Referential-integrity check for record writes: every referenced
  /// course must exist.
  async fn verify_courses(&self, course_ids: &[Uuid]) -> Result<()> {
    if course_ids.is_empty() {
      return Ok(());
    }
    let ids = course_ids.to_vec();
    let id_strs: Vec<String> = ids.iter().copied().map(encode_uuid).collect();

    let missing_idx: Option<usize> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT 1 FROM courses WHERE course_id = ?1")?;
        for (i, id) in id_strs.iter().enumerate() {
          let found: Option<bool> = stmt
            .query_row(rusqlite::params![id], |_| Ok(true))
            .optional()?;
          if found.is_none() {
            return Ok(Some(i));
          }
        }
        Ok(None)
      })
      .await?;

    match missing_idx {
      Some(i) => Err(Error::CourseNotFound(ids[i])),
      None => Ok(()),
    }
  }

  /// Fetch one record (plus its course assignments) by an exact-match
  /// column. `column` is a compile-time literal, never user input.
  async fn fetch_record(
    &self,
    column: &'static str,
    key: String,
  ) -> Result<Option<DirectoryRecord>> {
    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            &format!(
              "SELECT record_id, email, external_subject_id, display_name,
                      avatar_url, role, join_date, created_at, updated_at
               FROM directory_records WHERE {column} = ?1"
            ),
            rusqlite::params![key],
            |row| {
              Ok(RawRecord {
                record_id:           row.get(0)?,
                email:               row.get(1)?,
                external_subject_id: row.get(2)?,
                display_name:        row.get(3)?,
                avatar_url:          row.get(4)?,
                role:                row.get(5)?,
                join_date:           row.get(6)?,
                created_at:          row.get(7)?,
                updated_at:          row.get(8)?,
                course_ids:          vec![],
              })
            },
          )
          .optional()?;

        let Some(mut raw) = row else { return Ok(None) };

        let mut stmt = conn.prepare(
          "SELECT course_id FROM course_assignments WHERE record_id = ?1",
        )?;
        raw.course_ids = stmt
          .query_map(rusqlite::params![raw.record_id.clone()], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(Some(raw))
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  /// Write the full record state: row upsert plus assignment rewrite, in
  /// one transaction.
  async fn write_record(&self, record: &DirectoryRecord) -> Result<()> {
    let record_id_str  = encode_uuid(record.record_id);
    let email          = record.email.clone();
    let subject_id     = record.external_subject_id.clone();
    let display_name   = record.display_name.clone();
    let avatar_url     = record.avatar_url.clone();
    let role_str       = encode_role(record.role).to_owned();
    let join_date_str  = encode_dt(record.join_date);
    let created_at_str = encode_dt(record.created_at);
    let updated_at_str = encode_dt(record.updated_at);
    let course_id_strs: Vec<String> =
      record.course_ids.iter().copied().map(encode_uuid).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO directory_records (
             record_id, email, external_subject_id, display_name, avatar_url,
             role, join_date, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
           ON CONFLICT(record_id) DO UPDATE SET
             email = ?2, external_subject_id = ?3, display_name = ?4,
             avatar_url = ?5, role = ?6, join_date = ?7, updated_at = ?9",
          rusqlite::params![
            record_id_str,
            email,
            subject_id,
            display_name,
            avatar_url,
            role_str,
            join_date_str,
            created_at_str,
            updated_at_str,
          ],
        )?;
        tx.execute(
          "DELETE FROM course_assignments WHERE record_id = ?1",
          rusqlite::params![record_id_str],
        )?;
        for course_id in &course_id_strs {
          tx.execute(
            "INSERT INTO course_assignments (record_id, course_id) VALUES (?1, ?2)",
            rusqlite::params![record_id_str, course_id],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── DirectoryStore impl ─────────────────────────────────────────────────────

impl DirectoryStore for SqliteStore {
  type Error = Error;

  // ── Directory records ─────────────────────────────────────────────────────

  async fn create_record(
    &self,
    input: NewDirectoryRecord,
  ) -> Result<DirectoryRecord> {
    input.validate().map_err(Error::Core)?;
    self.verify_courses(&input.course_ids).await?;

    let now = Utc::now();
    let record = DirectoryRecord {
      record_id:           Uuid::new_v4(),
      email:               input.email.trim().to_ascii_lowercase(),
      external_subject_id: input.external_subject_id,
      display_name:        input.display_name,
      avatar_url:          input.avatar_url,
      role:                input.role,
      course_ids:          input.course_ids,
      join_date:           input.join_date.unwrap_or(now),
      created_at:          now,
      updated_at:          now,
    };

    self.write_record(&record).await?;
    Ok(record)
  }

  async fn get_record(&self, id: Uuid) -> Result<Option<DirectoryRecord>> {
    self.fetch_record("record_id", encode_uuid(id)).await
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<DirectoryRecord>> {
    self
      .fetch_record("email", email.trim().to_ascii_lowercase())
      .await
  }

  async fn find_by_subject_id(
    &self,
    subject_id: &str,
  ) -> Result<Option<DirectoryRecord>> {
    self
      .fetch_record("external_subject_id", subject_id.to_owned())
      .await
  }

  async fn list_records(&self, role: Option<Role>) -> Result<Vec<DirectoryRecord>> {
    let role_str = role.map(encode_role).map(str::to_owned);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let map_row = |row: &rusqlite::Row<'_>| {
          Ok(RawRecord {
            record_id:           row.get(0)?,
            email:               row.get(1)?,
            external_subject_id: row.get(2)?,
            display_name:        row.get(3)?,
            avatar_url:          row.get(4)?,
            role:                row.get(5)?,
            join_date:           row.get(6)?,
            created_at:          row.get(7)?,
            updated_at:          row.get(8)?,
            course_ids:          vec![],
          })
        };

        let mut rows = if let Some(r) = role_str {
          let mut stmt = conn.prepare(
            "SELECT record_id, email, external_subject_id, display_name,
                    avatar_url, role, join_date, created_at, updated_at
             FROM directory_records WHERE role = ?1 ORDER BY created_at DESC",
          )?;
          let rows = stmt
            .query_map(rusqlite::params![r], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        } else {
          let mut stmt = conn.prepare(
            "SELECT record_id, email, external_subject_id, display_name,
                    avatar_url, role, join_date, created_at, updated_at
             FROM directory_records ORDER BY created_at DESC",
          )?;
          let rows = stmt
            .query_map([], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        };

        let mut stmt = conn.prepare(
          "SELECT course_id FROM course_assignments WHERE record_id = ?1",
        )?;
        for raw in &mut rows {
          raw.course_ids = stmt
            .query_map(rusqlite::params![raw.record_id.clone()], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        }

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn save_record(&self, record: DirectoryRecord) -> Result<DirectoryRecord> {
    record.validate().map_err(Error::Core)?;
    self.verify_courses(&record.course_ids).await?;

    let mut record = record;
    record.email = record.email.trim().to_ascii_lowercase();
    record.updated_at = Utc::now();

    self.write_record(&record).await?;
    Ok(record)
  }

  async fn delete_record(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM course_assignments WHERE record_id = ?1",
          rusqlite::params![id_str],
        )?;
        let n = tx.execute(
          "DELETE FROM directory_records WHERE record_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RecordNotFound(id));
    }
    Ok(())
  }

  async fn count_records(&self, role: Role) -> Result<u64> {
    let role_str = encode_role(role).to_owned();
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM directory_records WHERE role = ?1",
          rusqlite::params![role_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }

  // ── Courses ───────────────────────────────────────────────────────────────

  async fn create_course(&self, input: NewCourse) -> Result<Course> {
    let course = Course {
      course_id:   Uuid::new_v4(),
      name:        input.name,
      description: input.description,
      created_at:  Utc::now(),
    };

    let id_str   = encode_uuid(course.course_id);
    let name     = course.name.clone();
    let desc     = course.description.clone();
    let at_str   = encode_dt(course.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO courses (course_id, name, description, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, desc, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(course)
  }

  async fn get_course(&self, id: Uuid) -> Result<Option<Course>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCourse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT course_id, name, description, created_at
               FROM courses WHERE course_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawCourse {
                  course_id:   row.get(0)?,
                  name:        row.get(1)?,
                  description: row.get(2)?,
                  created_at:  row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCourse::into_course).transpose()
  }

  async fn list_courses(&self) -> Result<Vec<Course>> {
    let raws: Vec<RawCourse> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT course_id, name, description, created_at
           FROM courses ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawCourse {
              course_id:   row.get(0)?,
              name:        row.get(1)?,
              description: row.get(2)?,
              created_at:  row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCourse::into_course).collect()
  }

  async fn save_course(&self, course: Course) -> Result<Course> {
    let id_str = encode_uuid(course.course_id);
    let name   = course.name.clone();
    let desc   = course.description.clone();

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE courses SET name = ?2, description = ?3 WHERE course_id = ?1",
          rusqlite::params![id_str, name, desc],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::CourseNotFound(course.course_id));
    }
    Ok(course)
  }

  async fn delete_course(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let assigned: i64 = self
      .conn
      .call({
        let id_str = id_str.clone();
        move |conn| {
          Ok(conn.query_row(
            "SELECT COUNT(*) FROM course_assignments WHERE course_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )?)
        }
      })
      .await?;

    if assigned > 0 {
      return Err(Error::CourseInUse(id));
    }

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM courses WHERE course_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::CourseNotFound(id));
    }
    Ok(())
  }

  async fn count_course_members(
    &self,
    course_id: Uuid,
    role: Role,
  ) -> Result<u64> {
    let id_str   = encode_uuid(course_id);
    let role_str = encode_role(role).to_owned();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*)
           FROM course_assignments a
           JOIN directory_records r ON r.record_id = a.record_id
           WHERE a.course_id = ?1 AND r.role = ?2",
          rusqlite::params![id_str, role_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }
}
