//! Stage 3: decide whether the request adds a contact row, and write it.

use tracing::debug;

use crate::{
  Error, Result,
  contact::{Contact, ContactId, NewContact},
  identity::IdentifyRequest,
  pipeline::resolver::parent_of,
  repository::ContactRepository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
  /// Nothing matched; the request started a new cluster.
  CreatedPrimary,
  /// The request carried a value the cluster did not know yet.
  CreatedSecondary,
  /// Every value was already known; nothing was written.
  Existing,
}

#[derive(Debug, Clone)]
pub struct Link {
  /// The primary of the cluster the request belongs to.
  pub primary: Contact,
  /// The contact created for the request, or the existing contact that
  /// already carries its values (may equal `primary`).
  pub contact: Contact,
  pub outcome: LinkOutcome,
}

pub fn link<R>(
  repo: &R,
  request: &IdentifyRequest,
  primary: Option<Contact>,
  matches: &[Contact],
) -> Result<Link>
where
  R: ContactRepository,
{
  let email = request.email().map(str::to_owned);
  let phone_number = request.phone_number().map(str::to_owned);

  let Some(primary) = primary else {
    if !matches.is_empty() {
      return Err(Error::consistency(format!(
        "{} matching contacts but no primary among them",
        matches.len()
      )));
    }
    let created = repo
      .create(NewContact::primary(email, phone_number))
      .map_err(Error::storage)?;
    debug!(contact_id = created.id, "created primary contact");
    return Ok(Link {
      primary: created.clone(),
      contact: created,
      outcome: LinkOutcome::CreatedPrimary,
    });
  };

  if is_repeat_of(request, &primary) {
    return Ok(Link {
      contact: primary.clone(),
      primary,
      outcome: LinkOutcome::Existing,
    });
  }

  if carries_new_information(request, matches) {
    ensure_link_target(repo, primary.id, None)?;
    let created = repo
      .create(NewContact::secondary(email, phone_number, primary.id))
      .map_err(Error::storage)?;
    debug!(
      contact_id = created.id,
      primary_id = primary.id,
      "created secondary contact"
    );
    return Ok(Link {
      primary,
      contact: created,
      outcome: LinkOutcome::CreatedSecondary,
    });
  }

  let existing = repo
    .find_excluding(request.key(), primary.id)
    .map_err(Error::storage)?;
  let contact = match existing {
    Some(c) if c.is_primary() => {
      return Err(Error::consistency(format!(
        "contact {} is still primary after resolving to {}",
        c.id, primary.id
      )));
    }
    Some(c) => c,
    None => primary.clone(),
  };
  Ok(Link {
    primary,
    contact,
    outcome: LinkOutcome::Existing,
  })
}

/// Every value the request provides equals the primary's own.
fn is_repeat_of(request: &IdentifyRequest, primary: &Contact) -> bool {
  request.email().is_none_or(|e| primary.has_email(e))
    && request.phone_number().is_none_or(|p| primary.has_phone_number(p))
}

/// The request provides a value no matched contact carries. Every contact
/// carrying one of the request's values is in `matches`, so this is exactly
/// "new to the resolved cluster".
fn carries_new_information(request: &IdentifyRequest, matches: &[Contact]) -> bool {
  let unseen_email = request
    .email()
    .is_some_and(|e| !matches.iter().any(|c| c.has_email(e)));
  let unseen_phone = request
    .phone_number()
    .is_some_and(|p| !matches.iter().any(|c| c.has_phone_number(p)));
  unseen_email || unseen_phone
}

/// Re-read `target_id` before any write that points a contact at it. Links
/// always land on a live primary, never on a secondary and never on the
/// contact itself, which keeps every secondary's parent a primary at the
/// moment it is written.
pub(crate) fn ensure_link_target<R>(
  repo: &R,
  target_id: ContactId,
  source_id: Option<ContactId>,
) -> Result<Contact>
where
  R: ContactRepository,
{
  if source_id == Some(target_id) {
    return Err(Error::consistency(format!(
      "refusing to link contact {target_id} to itself"
    )));
  }
  let target = repo
    .get(target_id)
    .map_err(Error::storage)?
    .ok_or_else(|| {
      Error::consistency(format!("link target {target_id} does not exist"))
    })?;
  if parent_of(&target)?.is_some() {
    return Err(Error::consistency(format!(
      "link target {target_id} is not a primary"
    )));
  }
  Ok(target)
}
