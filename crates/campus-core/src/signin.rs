//! The sign-in orchestrator.
//!
//! Walks the workflow: verify credential → fetch the verified email →
//! resolve a role from the domain rules → reconcile the directory record →
//! return the public profile. Repeating the workflow with the same verified
//! identity converges to the same record state (the backfill is one-time).

use crate::{
  error::{Error, Result},
  identity::{IdentityProvider, ProviderProfile},
  record::{DirectoryRecord, NewDirectoryRecord, Profile},
  role::{Role, RoleRules},
  store::DirectoryStore,
};

/// Run the full sign-in workflow for a presented bearer credential.
///
/// Outcomes:
/// - `Ok(profile)` — matched (and possibly backfilled) or, when policy
///   allows, freshly self-registered;
/// - `Err(Unauthenticated)` — the provider rejected the credential;
/// - `Err(DomainNotAllowed)` — the verified email is an outsider's;
/// - `Err(NotPreRegistered)` — no record and self-registration is off;
/// - `Err(IdentityProvider)` — the provider could not be reached.
pub async fn sign_in<S, P>(
  store: &S,
  provider: &P,
  rules: &RoleRules,
  token: &str,
) -> Result<Profile>
where
  S: DirectoryStore,
  P: IdentityProvider,
{
  let subject_id = provider.verify_token(token).await?;
  let profile = provider.fetch_profile(&subject_id).await?;
  let email = profile.email.trim().to_ascii_lowercase();

  // Hard admission boundary: outsiders never touch the directory.
  let resolved = rules.resolve(&email).ok_or(Error::DomainNotAllowed)?;

  match store.find_by_email(&email).await.map_err(Into::into)? {
    Some(record) => backfill(store, record, &subject_id, &profile).await,
    None => {
      if !rules.allow_self_registration {
        return Err(Error::NotPreRegistered);
      }
      // A faculty record cannot exist without course assignments, so a
      // resolver-faculty address still requires pre-provisioning.
      if resolved == Role::Faculty {
        return Err(Error::NotPreRegistered);
      }
      let input = NewDirectoryRecord {
        email:               email.clone(),
        role:                resolved,
        course_ids:          vec![],
        external_subject_id: Some(subject_id.clone()),
        display_name:        profile.display_name(),
        avatar_url:          profile.image_url.clone(),
        join_date:           None,
      };
      match store.create_record(input).await {
        Ok(record) => Ok(record.profile()),
        // Lost the concurrent first-sign-in race: the other writer created
        // the record. Re-read and continue as a backfill.
        Err(e) => match e.into() {
          Error::Conflict(_) => {
            let record = store
              .find_by_email(&email)
              .await
              .map_err(Into::into)?
              .ok_or(Error::RecordNotFound)?;
            backfill(store, record, &subject_id, &profile).await
          }
          other => Err(other),
        },
      }
    }
  }
}

/// One-time population of the identity-provider fields. Saves only when
/// something was actually missing, so a repeat sign-in is a pure read.
async fn backfill<S: DirectoryStore>(
  store: &S,
  mut record: DirectoryRecord,
  subject_id: &str,
  profile: &ProviderProfile,
) -> Result<Profile> {
  if !record.needs_backfill() {
    return Ok(record.profile());
  }
  if record.external_subject_id.is_none() {
    record.external_subject_id = Some(subject_id.to_owned());
  }
  if record.display_name.is_none() {
    record.display_name = profile.display_name();
  }
  if record.avatar_url.is_none() {
    record.avatar_url = profile.image_url.clone();
  }
  let saved = store.save_record(record).await.map_err(Into::into)?;
  Ok(saved.profile())
}
