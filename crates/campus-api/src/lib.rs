//! JSON REST API for the Campus portal.
//!
//! Exposes an axum [`Router`] backed by any
//! [`campus_core::store::DirectoryStore`] and
//! [`campus_core::identity::IdentityProvider`]. Every route except sign-in
//! itself authenticates the bearer credential and gates the resolved
//! directory record through the authorization gate.

pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod error;
pub mod records;
pub mod signin;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use campus_core::{identity::IdentityProvider, role::RoleRules, store::DirectoryStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Identity-provider settings, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ProviderSettings {
  pub base_url:     String,
  pub api_key:      String,
  /// Per-request deadline for provider calls, in seconds.
  #[serde(default = "default_provider_timeout")]
  pub timeout_secs: u64,
}

fn default_provider_timeout() -> u64 { 5 }

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub provider:   ProviderSettings,
  /// Institutional domain conventions; see [`RoleRules`].
  pub rules:      RoleRules,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, P> {
  pub store:    Arc<S>,
  pub provider: Arc<P>,
  pub rules:    Arc<RoleRules>,
}

// Manual impl: `S`/`P` need not be `Clone` themselves.
impl<S, P> Clone for AppState<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      provider: Arc::clone(&self.provider),
      rules:    Arc::clone(&self.rules),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised router for the portal API.
pub fn router<S, P>(state: AppState<S, P>) -> Router
where
  S: DirectoryStore + 'static,
  P: IdentityProvider + 'static,
{
  Router::new()
    // Sign-in workflow
    .route("/api/auth/google-signin", post(signin::google_signin::<S, P>))
    .route("/api/auth/get-user", get(signin::get_user::<S, P>))
    // Courses
    .route(
      "/api/courses",
      get(courses::list::<S, P>).post(courses::create::<S, P>),
    )
    .route(
      "/api/courses/{id}",
      put(courses::update::<S, P>).delete(courses::delete_one::<S, P>),
    )
    // Directory administration
    .route(
      "/api/records",
      get(records::list::<S, P>).post(records::create::<S, P>),
    )
    .route(
      "/api/records/{id}",
      put(records::update::<S, P>).delete(records::delete_one::<S, P>),
    )
    // Profiles and dashboard
    .route("/api/faculty/profile", get(records::faculty_profile::<S, P>))
    .route("/api/admin/dashboard", get(dashboard::handler::<S, P>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
