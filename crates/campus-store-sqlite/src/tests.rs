//! Integration tests for `SqliteStore` against an in-memory database.

use campus_core::{
  course::NewCourse,
  record::{NewDirectoryRecord, RecordPatch},
  role::Role,
  store::DirectoryStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn student(email: &str) -> NewDirectoryRecord {
  NewDirectoryRecord {
    email:               email.into(),
    role:                Role::Student,
    course_ids:          vec![],
    external_subject_id: None,
    display_name:        None,
    avatar_url:          None,
    join_date:           None,
  }
}

fn faculty(email: &str, course_ids: Vec<Uuid>) -> NewDirectoryRecord {
  NewDirectoryRecord {
    email: email.into(),
    role: Role::Faculty,
    course_ids,
    external_subject_id: None,
    display_name: None,
    avatar_url: None,
    join_date: None,
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_record() {
  let s = store().await;

  let created = s.create_record(student("jane@ddu.ac.in")).await.unwrap();
  assert_eq!(created.email, "jane@ddu.ac.in");
  assert_eq!(created.role, Role::Student);
  assert!(created.external_subject_id.is_none());

  let fetched = s.get_record(created.record_id).await.unwrap().unwrap();
  assert_eq!(fetched.record_id, created.record_id);
  assert_eq!(fetched.email, created.email);
}

#[tokio::test]
async fn email_is_stored_lower_cased() {
  let s = store().await;

  let created = s.create_record(student("Jane@DDU.AC.IN")).await.unwrap();
  assert_eq!(created.email, "jane@ddu.ac.in");

  let found = s.find_by_email("JANE@ddu.ac.in").await.unwrap();
  assert!(found.is_some());
}

#[tokio::test]
async fn duplicate_email_conflicts() {
  let s = store().await;
  s.create_record(student("jane@ddu.ac.in")).await.unwrap();

  let err = s
    .create_record(student("jane@ddu.ac.in"))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Conflict(_)));

  // Exactly one record persisted.
  assert_eq!(s.list_records(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_subject_id_conflicts() {
  let s = store().await;

  let mut a = student("a@ddu.ac.in");
  a.external_subject_id = Some("sub_1".into());
  s.create_record(a).await.unwrap();

  let mut b = student("b@ddu.ac.in");
  b.external_subject_id = Some("sub_1".into());
  let err = s.create_record(b).await.unwrap_err();
  assert!(matches!(err, crate::Error::Conflict(_)));
}

#[tokio::test]
async fn find_by_subject_id() {
  let s = store().await;

  let mut input = student("jane@ddu.ac.in");
  input.external_subject_id = Some("sub_jane".into());
  let created = s.create_record(input).await.unwrap();

  let found = s.find_by_subject_id("sub_jane").await.unwrap().unwrap();
  assert_eq!(found.record_id, created.record_id);

  assert!(s.find_by_subject_id("sub_other").await.unwrap().is_none());
}

#[tokio::test]
async fn save_backfills_and_bumps_updated_at() {
  let s = store().await;
  let created = s.create_record(student("jane@ddu.ac.in")).await.unwrap();

  let mut record = created.clone();
  record.external_subject_id = Some("sub_jane".into());
  record.display_name = Some("Jane Doe".into());
  record.avatar_url = Some("https://img.example/jane.png".into());

  let saved = s.save_record(record).await.unwrap();
  assert!(saved.updated_at >= created.updated_at);

  let fetched = s.get_record(created.record_id).await.unwrap().unwrap();
  assert_eq!(fetched.external_subject_id.as_deref(), Some("sub_jane"));
  assert_eq!(fetched.display_name.as_deref(), Some("Jane Doe"));
  assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn list_records_filtered_by_role() {
  let s = store().await;
  let course = s
    .create_course(NewCourse {
      name:        "Operating Systems".into(),
      description: "Processes, scheduling, memory".into(),
    })
    .await
    .unwrap();

  s.create_record(student("s1@ddu.ac.in")).await.unwrap();
  s.create_record(student("s2@ddu.ac.in")).await.unwrap();
  s.create_record(faculty("prof.os@ddu.ac.in", vec![course.course_id]))
    .await
    .unwrap();

  let students = s.list_records(Some(Role::Student)).await.unwrap();
  assert_eq!(students.len(), 2);
  assert!(students.iter().all(|r| r.role == Role::Student));

  let all = s.list_records(None).await.unwrap();
  assert_eq!(all.len(), 3);

  assert_eq!(s.count_records(Role::Student).await.unwrap(), 2);
  assert_eq!(s.count_records(Role::Faculty).await.unwrap(), 1);
  assert_eq!(s.count_records(Role::Admin).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_record_is_hard() {
  let s = store().await;
  let created = s.create_record(student("jane@ddu.ac.in")).await.unwrap();

  s.delete_record(created.record_id).await.unwrap();
  assert!(s.get_record(created.record_id).await.unwrap().is_none());

  let err = s.delete_record(created.record_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::RecordNotFound(_)));
}

// ─── Invariants ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn faculty_course_cardinality_rejected_before_persistence() {
  let s = store().await;

  let err = s
    .create_record(faculty("prof.x@ddu.ac.in", vec![]))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(campus_core::Error::CourseCardinality { .. })
  ));

  let five: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
  let err = s
    .create_record(faculty("prof.x@ddu.ac.in", five))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(campus_core::Error::CourseCardinality { .. })
  ));

  assert!(s.list_records(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_course_reference_is_rejected() {
  let s = store().await;
  let ghost = Uuid::new_v4();

  let err = s
    .create_record(faculty("prof.x@ddu.ac.in", vec![ghost]))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::CourseNotFound(id) if id == ghost));
}

#[tokio::test]
async fn record_patch_roundtrip_through_save() {
  let s = store().await;
  let c1 = s
    .create_course(NewCourse {
      name:        "Databases".into(),
      description: "Relational models and SQL".into(),
    })
    .await
    .unwrap();
  let c2 = s
    .create_course(NewCourse {
      name:        "Networks".into(),
      description: "Protocol stacks".into(),
    })
    .await
    .unwrap();

  let created = s
    .create_record(faculty("prof.db@ddu.ac.in", vec![c1.course_id]))
    .await
    .unwrap();

  let patch = RecordPatch {
    course_ids: Some(vec![c1.course_id, c2.course_id]),
    ..Default::default()
  };
  let patched = patch.apply(created.clone()).unwrap();
  s.save_record(patched).await.unwrap();

  let fetched = s.get_record(created.record_id).await.unwrap().unwrap();
  assert_eq!(fetched.course_ids.len(), 2);
}

// ─── Courses ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn course_crud() {
  let s = store().await;

  let created = s
    .create_course(NewCourse {
      name:        "Compilers".into(),
      description: "Lexing to codegen".into(),
    })
    .await
    .unwrap();

  let fetched = s.get_course(created.course_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Compilers");

  let mut updated = fetched;
  updated.description = "Front and back ends".into();
  s.save_course(updated).await.unwrap();

  let listed = s.list_courses().await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].description, "Front and back ends");

  s.delete_course(created.course_id).await.unwrap();
  assert!(s.get_course(created.course_id).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_course_name_conflicts() {
  let s = store().await;
  let input = NewCourse {
    name:        "Algorithms".into(),
    description: "Sorting and searching".into(),
  };
  s.create_course(input.clone()).await.unwrap();

  let err = s.create_course(input).await.unwrap_err();
  assert!(matches!(err, crate::Error::Conflict(_)));
}

#[tokio::test]
async fn assigned_course_cannot_be_deleted() {
  let s = store().await;
  let course = s
    .create_course(NewCourse {
      name:        "Graphics".into(),
      description: "Rasters and shaders".into(),
    })
    .await
    .unwrap();
  s.create_record(faculty("prof.gfx@ddu.ac.in", vec![course.course_id]))
    .await
    .unwrap();

  let err = s.delete_course(course.course_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::CourseInUse(id) if id == course.course_id));
}

#[tokio::test]
async fn count_course_members_by_role() {
  let s = store().await;
  let course = s
    .create_course(NewCourse {
      name:        "AI".into(),
      description: "Search and learning".into(),
    })
    .await
    .unwrap();

  s.create_record(faculty("prof.ai@ddu.ac.in", vec![course.course_id]))
    .await
    .unwrap();
  let mut enrolled = student("s1@ddu.ac.in");
  enrolled.course_ids = vec![course.course_id];
  s.create_record(enrolled).await.unwrap();

  assert_eq!(
    s.count_course_members(course.course_id, Role::Faculty)
      .await
      .unwrap(),
    1
  );
  assert_eq!(
    s.count_course_members(course.course_id, Role::Student)
      .await
      .unwrap(),
    1
  );
}
