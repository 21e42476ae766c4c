//! The identify pipeline: Matcher → Resolver → Linker → Aggregator.
//!
//! Every stage runs against one [`ContactRepository`] bound to the caller's
//! transaction. Any error aborts the pipeline; the caller rolls back.

pub mod aggregator;
pub mod linker;
pub mod matcher;
pub mod resolver;

use tracing::debug;

use crate::{
  Result,
  contact::ContactId,
  identity::{IdentifyRequest, Identity},
  repository::ContactRepository,
};

/// Resolve `request` into its consolidated identity, writing whatever
/// contacts the request implies.
pub fn identify<R>(repo: &R, request: &IdentifyRequest) -> Result<Identity>
where
  R: ContactRepository,
{
  let matches = matcher::find_matches(repo, request.key())?;
  let primary = resolver::resolve(repo, &matches)?;
  let link = linker::link(repo, request, primary, &matches)?;
  debug!(
    primary_id = link.primary.id,
    contact_id = link.contact.id,
    outcome = ?link.outcome,
    "linked request",
  );
  aggregator::aggregate(repo, &link.primary)
}

/// Aggregate the cluster containing contact `id`, read-only.
pub fn identity_of<R>(repo: &R, id: ContactId) -> Result<Option<Identity>>
where
  R: ContactRepository,
{
  let Some(contact) = repo.get(id).map_err(crate::Error::storage)? else {
    return Ok(None);
  };
  let primary = resolver::root_of(repo, contact)?;
  aggregator::aggregate(repo, &primary).map(Some)
}

#[cfg(test)]
mod memory;
