//! HTTP client for the external identity provider.
//!
//! Implements [`IdentityProvider`] over the provider's token-introspection
//! and user endpoints. The request timeout is bounded so a provider outage
//! surfaces as an [`IdentityProvider`](campus_core::Error::IdentityProvider)
//! fault instead of hanging the sign-in workflow.

use std::time::Duration;

use campus_core::{
  Error, Result,
  error::AuthFailure,
  identity::{IdentityProvider, ProviderProfile},
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Connection settings for the identity provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
  /// e.g. `https://api.clerk.com/v1`
  pub base_url: String,
  /// Server-side API key sent as a bearer credential on provider calls.
  pub api_key:  String,
  /// Per-request deadline. Defaults to 5 seconds via [`Default`].
  pub timeout:  Duration,
}

impl Default for ProviderConfig {
  fn default() -> Self {
    Self {
      base_url: String::new(),
      api_key:  String::new(),
      timeout:  Duration::from_secs(5),
    }
  }
}

/// Async HTTP implementation of [`IdentityProvider`].
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpIdentityProvider {
  client: Client,
  config: ProviderConfig,
}

#[derive(Deserialize)]
struct VerifyResponse {
  /// The verified subject id.
  sub: String,
}

#[derive(Deserialize)]
struct UserResponse {
  email:      String,
  first_name: Option<String>,
  last_name:  Option<String>,
  image_url:  Option<String>,
}

impl HttpIdentityProvider {
  pub fn new(config: ProviderConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| Error::IdentityProvider(e.to_string()))?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.config.base_url.trim_end_matches('/'))
  }
}

impl IdentityProvider for HttpIdentityProvider {
  async fn verify_token(&self, token: &str) -> Result<String> {
    let resp = self
      .client
      .post(self.url("/tokens/verify"))
      .bearer_auth(&self.config.api_key)
      .json(&serde_json::json!({ "token": token }))
      .send()
      .await
      .map_err(|e| Error::IdentityProvider(e.to_string()))?;

    match resp.status() {
      s if s.is_success() => {
        let body: VerifyResponse = resp
          .json()
          .await
          .map_err(|e| Error::IdentityProvider(e.to_string()))?;
        Ok(body.sub)
      }
      // Any provider-side rejection of the credential itself.
      StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
        tracing::debug!("identity provider rejected credential");
        Err(Error::Unauthenticated(AuthFailure::InvalidCredential))
      }
      s => Err(Error::IdentityProvider(format!(
        "token verification failed with status {s}"
      ))),
    }
  }

  async fn fetch_profile(&self, subject_id: &str) -> Result<ProviderProfile> {
    let resp = self
      .client
      .get(self.url(&format!("/users/{subject_id}")))
      .bearer_auth(&self.config.api_key)
      .send()
      .await
      .map_err(|e| Error::IdentityProvider(e.to_string()))?;

    if !resp.status().is_success() {
      return Err(Error::IdentityProvider(format!(
        "user lookup failed with status {}",
        resp.status()
      )));
    }

    let body: UserResponse = resp
      .json()
      .await
      .map_err(|e| Error::IdentityProvider(e.to_string()))?;

    Ok(ProviderProfile {
      email:      body.email,
      first_name: body.first_name,
      last_name:  body.last_name,
      image_url:  body.image_url,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn url_join_trims_trailing_slash() {
    let provider = HttpIdentityProvider::new(ProviderConfig {
      base_url: "https://api.example.com/v1/".into(),
      api_key:  "sk_test".into(),
      ..Default::default()
    })
    .unwrap();
    assert_eq!(
      provider.url("/users/sub_1"),
      "https://api.example.com/v1/users/sub_1"
    );
  }
}
