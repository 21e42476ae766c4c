//! Stage 1: find every contact touching the request's email or phone number.

use tracing::debug;

use crate::{
  Error, Result,
  contact::Contact,
  repository::{ContactRepository, MatchKey},
};

pub fn find_matches<R>(repo: &R, key: MatchKey<'_>) -> Result<Vec<Contact>>
where
  R: ContactRepository,
{
  let matches = repo.find_matching(key).map_err(Error::storage)?;
  debug!(count = matches.len(), "matched existing contacts");
  Ok(matches)
}
