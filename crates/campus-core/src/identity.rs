//! The external identity-provider seam.
//!
//! The portal never verifies credentials itself: it delegates token
//! introspection and profile lookup to the federated provider. The trait is
//! implemented over HTTP by `campus-identity` and by in-process fakes in
//! tests.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The profile the provider holds for a verified subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
  pub email:      String,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub image_url:  Option<String>,
}

impl ProviderProfile {
  /// `"First Last"`, or whichever half exists, or `None`.
  pub fn display_name(&self) -> Option<String> {
    match (self.first_name.as_deref(), self.last_name.as_deref()) {
      (Some(f), Some(l)) => Some(format!("{f} {l}")),
      (Some(f), None) => Some(f.to_owned()),
      (None, Some(l)) => Some(l.to_owned()),
      (None, None) => None,
    }
  }
}

/// Token introspection and profile lookup against the identity provider.
///
/// Failures map into the core taxonomy: a rejected credential is
/// [`Error::Unauthenticated`], transport faults and timeouts are
/// [`Error::IdentityProvider`].
///
/// [`Error::Unauthenticated`]: crate::Error::Unauthenticated
/// [`Error::IdentityProvider`]: crate::Error::IdentityProvider
pub trait IdentityProvider: Send + Sync {
  /// Validate a bearer credential, returning the verified subject id.
  fn verify_token<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<String>> + Send + 'a;

  /// Fetch the provider profile for a verified subject id.
  fn fetch_profile<'a>(
    &'a self,
    subject_id: &'a str,
  ) -> impl Future<Output = Result<ProviderProfile>> + Send + 'a;
}
