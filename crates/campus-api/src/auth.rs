//! Bearer-credential extractors.
//!
//! [`SubjectId`] runs the session-authentication check: it validates the
//! `Authorization: Bearer` credential against the identity provider and
//! yields the verified subject id. It never touches the directory.
//!
//! [`CurrentUser`] additionally resolves the directory record for the
//! verified subject, for routes that gate on role or ownership.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use campus_core::{
  Error, error::AuthFailure, identity::IdentityProvider,
  record::DirectoryRecord, store::DirectoryStore,
};

use crate::{AppState, error::ApiError};

/// Pull the bearer token out of the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .filter(|t| !t.is_empty())
    .ok_or(Error::Unauthenticated(AuthFailure::NoCredential))
}

/// The verified identity-provider subject id for this request.
pub struct SubjectId(pub String);

impl<S, P> FromRequestParts<AppState<S, P>> for SubjectId
where
  S: DirectoryStore + 'static,
  P: IdentityProvider + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, P>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)?;
    let subject_id = state.provider.verify_token(token).await?;
    Ok(SubjectId(subject_id))
  }
}

/// The directory record matching the verified subject id.
///
/// Rejects with 404 when the subject has no record — the caller is
/// authenticated but unknown to the directory (sign-in has not linked them
/// yet, or the record was deleted).
pub struct CurrentUser(pub DirectoryRecord);

impl<S, P> FromRequestParts<AppState<S, P>> for CurrentUser
where
  S: DirectoryStore + 'static,
  P: IdentityProvider + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, P>,
  ) -> Result<Self, Self::Rejection> {
    let SubjectId(subject_id) =
      SubjectId::from_request_parts(parts, state).await?;
    let record = state
      .store
      .find_by_subject_id(&subject_id)
      .await
      .map_err(|e| ApiError::from(e.into()))?
      .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    Ok(CurrentUser(record))
  }
}
