//! Stage 2: pick the canonical primary among the matched clusters and merge
//! the others into it.
//!
//! A matched contact may be a secondary whose primary did not match, so each
//! match is first climbed to its root. When the matches span several roots,
//! the oldest survives and every other root is demoted to point straight at
//! it. Contacts still attached to a demoted root keep their `linked_id`; the
//! aggregator reaches them by traversal, so a merge costs one write per
//! demoted root rather than one per cluster member.

use std::collections::HashSet;

use tracing::info;

use crate::{
  Error, Result,
  contact::{Contact, ContactId, ContactPatch, LinkPrecedence},
  pipeline::linker::ensure_link_target,
  repository::ContactRepository,
};

/// Returns the surviving primary, or `None` when `matches` is empty.
pub fn resolve<R>(repo: &R, matches: &[Contact]) -> Result<Option<Contact>>
where
  R: ContactRepository,
{
  let mut roots: Vec<Contact> = Vec::new();
  for contact in matches {
    let root = root_of(repo, contact.clone())?;
    if !roots.iter().any(|r| r.id == root.id) {
      roots.push(root);
    }
  }

  let Some(survivor) = roots.iter().min_by_key(|c| c.age_key()).cloned() else {
    return Ok(None);
  };

  for other in roots.iter().filter(|c| c.id != survivor.id) {
    ensure_link_target(repo, survivor.id, Some(other.id))?;
    repo
      .update(other.id, ContactPatch::demote_to(survivor.id))
      .map_err(Error::storage)?;
    info!(
      demoted_id = other.id,
      primary_id = survivor.id,
      "merged clusters"
    );
  }

  Ok(Some(survivor))
}

/// Follow `linked_id` from `contact` up to its cluster's primary.
pub fn root_of<R>(repo: &R, contact: Contact) -> Result<Contact>
where
  R: ContactRepository,
{
  let mut current = contact;
  let mut seen = HashSet::new();
  while let Some(parent_id) = parent_of(&current)? {
    if !seen.insert(current.id) {
      return Err(Error::consistency(format!(
        "linkage cycle through contact {}",
        current.id
      )));
    }
    current = repo.get(parent_id).map_err(Error::storage)?.ok_or_else(|| {
      Error::consistency(format!(
        "contact {} links to missing contact {parent_id}",
        current.id
      ))
    })?;
  }
  Ok(current)
}

/// The contact a secondary points at, or `None` for a primary.
///
/// A primary never carries a link; a secondary always does, and never to
/// itself.
pub(crate) fn parent_of(contact: &Contact) -> Result<Option<ContactId>> {
  match (contact.link_precedence, contact.linked_id) {
    (LinkPrecedence::Primary, None) => Ok(None),
    (LinkPrecedence::Primary, Some(linked)) => Err(Error::consistency(format!(
      "primary contact {} links to {linked}",
      contact.id
    ))),
    (LinkPrecedence::Secondary, None) => Err(Error::consistency(format!(
      "secondary contact {} has no linked id",
      contact.id
    ))),
    (LinkPrecedence::Secondary, Some(linked)) if linked == contact.id => Err(
      Error::consistency(format!("contact {linked} links to itself")),
    ),
    (LinkPrecedence::Secondary, Some(linked)) => Ok(Some(linked)),
  }
}
