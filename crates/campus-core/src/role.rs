//! Access tiers and the email-domain role resolver.
//!
//! The resolver is a pure function over an injected [`RoleRules`] value, so
//! deployments (and tests) substitute their own institutional domains
//! instead of editing constants.

use serde::{Deserialize, Serialize};

/// Authorization tier held by a directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Student,
  Faculty,
  Admin,
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// Institutional domain conventions used to admit and classify sign-ins.
///
/// `resolve` returning `None` is a hard rejection signal consumed by the
/// sign-in orchestrator; it is never a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRules {
  /// The broad institutional domain, e.g. `ddu.ac.in`.
  pub institution_domain:      String,
  /// Department-qualified subdomains whose addresses are faculty,
  /// e.g. `it.ddu.ac.in`.
  #[serde(default)]
  pub faculty_subdomains:      Vec<String>,
  /// Local-part prefixes marking faculty addresses on the broad domain,
  /// e.g. `prof.`.
  #[serde(default)]
  pub faculty_local_prefixes:  Vec<String>,
  /// Whether an unknown institutional address may create its own record at
  /// first sign-in. Off by default: pre-provisioning is required.
  #[serde(default)]
  pub allow_self_registration: bool,
}

impl RoleRules {
  /// Map a verified email address to a role, or `None` for outsiders.
  ///
  /// Deterministic and total: every string maps to exactly one of
  /// `Some(Faculty)`, `Some(Student)`, `None`. Comparison is lower-cased.
  pub fn resolve(&self, email: &str) -> Option<Role> {
    let email = email.trim().to_ascii_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
      return None;
    }

    let institution = self.institution_domain.to_ascii_lowercase();
    let in_institution = domain == institution
      || domain.ends_with(&format!(".{institution}"));

    if self
      .faculty_subdomains
      .iter()
      .any(|s| domain == s.to_ascii_lowercase())
    {
      return Some(Role::Faculty);
    }

    if !in_institution {
      return None;
    }

    if self
      .faculty_local_prefixes
      .iter()
      .any(|p| local.starts_with(&p.to_ascii_lowercase()))
    {
      return Some(Role::Faculty);
    }

    Some(Role::Student)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rules() -> RoleRules {
    RoleRules {
      institution_domain:      "ddu.ac.in".into(),
      faculty_subdomains:      vec!["it.ddu.ac.in".into()],
      faculty_local_prefixes:  vec!["prof.".into()],
      allow_self_registration: false,
    }
  }

  #[test]
  fn faculty_prefix_on_broad_domain() {
    assert_eq!(rules().resolve("prof.it@ddu.ac.in"), Some(Role::Faculty));
  }

  #[test]
  fn faculty_subdomain() {
    assert_eq!(rules().resolve("sharma@it.ddu.ac.in"), Some(Role::Faculty));
  }

  #[test]
  fn student_on_broad_domain() {
    assert_eq!(rules().resolve("student1@ddu.ac.in"), Some(Role::Student));
  }

  #[test]
  fn outsider_is_rejected() {
    assert_eq!(rules().resolve("outsider@gmail.com"), None);
  }

  #[test]
  fn comparison_is_case_insensitive() {
    assert_eq!(rules().resolve("Prof.IT@DDU.AC.IN"), Some(Role::Faculty));
    assert_eq!(rules().resolve("Student1@Ddu.Ac.In"), Some(Role::Student));
  }

  #[test]
  fn lookalike_suffix_does_not_match() {
    // `evilddu.ac.in` is not a subdomain of `ddu.ac.in`.
    assert_eq!(rules().resolve("x@evilddu.ac.in"), None);
  }

  #[test]
  fn malformed_addresses_resolve_to_none() {
    assert_eq!(rules().resolve(""), None);
    assert_eq!(rules().resolve("no-at-sign"), None);
    assert_eq!(rules().resolve("@ddu.ac.in"), None);
    assert_eq!(rules().resolve("a@b@ddu.ac.in"), None);
  }
}
