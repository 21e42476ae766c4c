//! Stage 4: walk the cluster rooted at the primary and fold it into an
//! [`Identity`].

use std::collections::{HashSet, VecDeque};

use crate::{
  Error, Result,
  contact::Contact,
  identity::Identity,
  pipeline::resolver::parent_of,
  repository::ContactRepository,
};

pub fn aggregate<R>(repo: &R, primary: &Contact) -> Result<Identity>
where
  R: ContactRepository,
{
  let secondaries = collect_cluster(repo, primary)?;

  let mut emails = Vec::new();
  let mut phone_numbers = Vec::new();
  for contact in std::iter::once(primary).chain(&secondaries) {
    push_distinct(&mut emails, contact.email.as_deref());
    push_distinct(&mut phone_numbers, contact.phone_number.as_deref());
  }

  Ok(Identity {
    primary_contact_id: primary.id,
    emails,
    phone_numbers,
    secondary_contact_ids: secondaries.iter().map(|c| c.id).collect(),
  })
}

/// Every contact below `primary`, oldest first.
///
/// Breadth-first over `linked_id`: contacts attached to a demoted primary sit
/// one level further down and are picked up without rewriting their links.
fn collect_cluster<R>(repo: &R, primary: &Contact) -> Result<Vec<Contact>>
where
  R: ContactRepository,
{
  if parent_of(primary)?.is_some() {
    return Err(Error::consistency(format!(
      "cannot aggregate from secondary contact {}",
      primary.id
    )));
  }

  let mut seen = HashSet::from([primary.id]);
  let mut frontier = VecDeque::from([primary.id]);
  let mut members = Vec::new();

  while let Some(parent_id) = frontier.pop_front() {
    let rows = repo
      .find_by_primary_or_linked(parent_id)
      .map_err(Error::storage)?;
    for contact in rows.into_iter().filter(|c| c.id != parent_id) {
      if parent_of(&contact)? != Some(parent_id) {
        return Err(Error::consistency(format!(
          "contact {} returned as linked to {parent_id} but is not its secondary",
          contact.id
        )));
      }
      if !seen.insert(contact.id) {
        return Err(Error::consistency(format!(
          "contact {} reached twice while walking cluster {}",
          contact.id, primary.id
        )));
      }
      frontier.push_back(contact.id);
      members.push(contact);
    }
  }

  members.sort_by_key(Contact::age_key);
  Ok(members)
}

fn push_distinct(values: &mut Vec<String>, value: Option<&str>) {
  if let Some(v) = value.filter(|v| !v.is_empty())
    && !values.iter().any(|existing| existing == v)
  {
    values.push(v.to_owned());
  }
}
