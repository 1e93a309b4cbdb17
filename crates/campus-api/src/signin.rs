//! Handlers for the sign-in workflow endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/auth/google-signin` | Credential from `Authorization` header, or `{"token":...}` body |
//! | `GET`  | `/api/auth/get-user` | 404 if the verified subject has no directory record |

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use campus_core::{
  identity::IdentityProvider,
  record::Profile,
  role::Role,
  signin::sign_in,
  store::DirectoryStore,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{CurrentUser, bearer_token},
  error::ApiError,
};

// ─── Sign-in ──────────────────────────────────────────────────────────────────

/// Body variant for deployments that post the credential instead of (or in
/// addition to) the `Authorization` header.
#[derive(Debug, Deserialize)]
pub struct SignInBody {
  pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
  pub message: String,
  pub user:    Profile,
}

/// `POST /api/auth/google-signin`
///
/// The credential is read from the `Authorization: Bearer` header first,
/// then from the optional JSON body. 400 only when neither carries a token;
/// a present-but-rejected credential is 401.
pub async fn google_signin<S, P>(
  State(state): State<AppState<S, P>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<SignInResponse>, ApiError>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  let header_token = bearer_token(&headers).ok().map(str::to_owned);
  let body_token = serde_json::from_slice::<SignInBody>(&body)
    .ok()
    .and_then(|b| b.token)
    .filter(|t| !t.is_empty());

  let token = header_token
    .or(body_token)
    .ok_or_else(|| ApiError::BadRequest("token is required".into()))?;

  let profile =
    sign_in(&*state.store, &*state.provider, &state.rules, &token).await?;

  tracing::info!(email = %profile.email, "sign-in completed");
  Ok(Json(SignInResponse {
    message: "user authenticated".into(),
    user:    profile,
  }))
}

// ─── Get user ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UserResponse {
  pub user:             Profile,
  pub join_date:        DateTime<Utc>,
  /// Present for faculty records only.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub experience_years: Option<i64>,
}

/// `GET /api/auth/get-user`
pub async fn get_user<S, P>(
  State(_state): State<AppState<S, P>>,
  CurrentUser(record): CurrentUser,
) -> Result<Json<UserResponse>, ApiError>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  let now = Utc::now();
  let experience_years = (record.role == Role::Faculty)
    .then(|| record.experience_years(now));
  Ok(Json(UserResponse {
    user: record.profile(),
    join_date: record.join_date,
    experience_years,
  }))
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use campus_core::{
    Error, Result,
    error::AuthFailure,
    identity::ProviderProfile,
    record::NewDirectoryRecord,
    role::RoleRules,
  };
  use campus_store_sqlite::SqliteStore;

  use super::*;

  /// Identity provider that accepts exactly one token.
  struct FakeProvider {
    token:   String,
    subject: String,
    email:   String,
  }

  impl IdentityProvider for FakeProvider {
    async fn verify_token(&self, token: &str) -> Result<String> {
      if token == self.token {
        Ok(self.subject.clone())
      } else {
        Err(Error::Unauthenticated(AuthFailure::InvalidCredential))
      }
    }

    async fn fetch_profile(&self, _subject_id: &str) -> Result<ProviderProfile> {
      Ok(ProviderProfile {
        email:      self.email.clone(),
        first_name: Some("Jane".into()),
        last_name:  Some("Doe".into()),
        image_url:  Some("https://img.example/jane.png".into()),
      })
    }
  }

  async fn state(
    token: &str,
    subject: &str,
    email: &str,
  ) -> AppState<SqliteStore, FakeProvider> {
    AppState {
      store:    Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      provider: Arc::new(FakeProvider {
        token:   token.into(),
        subject: subject.into(),
        email:   email.into(),
      }),
      rules:    Arc::new(RoleRules {
        institution_domain:      "ddu.ac.in".into(),
        faculty_subdomains:      vec![],
        faculty_local_prefixes:  vec!["prof.".into()],
        allow_self_registration: false,
      }),
    }
  }

  fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
      axum::http::header::AUTHORIZATION,
      format!("Bearer {token}").parse().unwrap(),
    );
    headers
  }

  async fn seed_student(state: &AppState<SqliteStore, FakeProvider>, email: &str) {
    state
      .store
      .create_record(NewDirectoryRecord {
        email:               email.into(),
        role:                Role::Student,
        course_ids:          vec![],
        external_subject_id: None,
        display_name:        None,
        avatar_url:          None,
        join_date:           None,
      })
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn missing_token_everywhere_is_bad_request() {
    let state = state("tok", "sub_jane", "jane@ddu.ac.in").await;
    let result = google_signin(
      State(state),
      HeaderMap::new(),
      Bytes::new(),
    )
    .await;
    assert!(matches!(result, Err(ApiError::BadRequest(_))));
  }

  #[tokio::test]
  async fn token_accepted_from_json_body() {
    let state = state("tok", "sub_jane", "jane@ddu.ac.in").await;
    seed_student(&state, "jane@ddu.ac.in").await;

    let body = Bytes::from(r#"{"token":"tok"}"#);
    let Json(resp) = google_signin(State(state), HeaderMap::new(), body)
      .await
      .unwrap();
    assert_eq!(resp.user.email, "jane@ddu.ac.in");
  }

  #[tokio::test]
  async fn first_signin_backfills_then_repeats_unchanged() {
    let state = state("tok", "sub_jane", "jane@ddu.ac.in").await;
    seed_student(&state, "jane@ddu.ac.in").await;

    let Json(first) =
      google_signin(State(state.clone()), bearer("tok"), Bytes::new())
        .await
        .unwrap();
    assert_eq!(first.user.display_name.as_deref(), Some("Jane Doe"));

    let Json(second) =
      google_signin(State(state.clone()), bearer("tok"), Bytes::new())
        .await
        .unwrap();
    assert_eq!(first.user, second.user);

    let stored = state
      .store
      .find_by_subject_id("sub_jane")
      .await
      .unwrap()
      .unwrap();
    assert_eq!(stored.email, "jane@ddu.ac.in");
  }

  #[tokio::test]
  async fn outsider_email_is_forbidden() {
    let state = state("tok", "sub_x", "outsider@gmail.com").await;
    let result =
      google_signin(State(state), bearer("tok"), Bytes::new()).await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
  }

  #[tokio::test]
  async fn unregistered_institution_email_is_forbidden() {
    let state = state("tok", "sub_new", "new@ddu.ac.in").await;
    let result =
      google_signin(State(state), bearer("tok"), Bytes::new()).await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
  }

  #[tokio::test]
  async fn invalid_credential_is_unauthenticated() {
    let state = state("tok", "sub_jane", "jane@ddu.ac.in").await;
    let result =
      google_signin(State(state), bearer("wrong"), Bytes::new()).await;
    assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
  }
}
