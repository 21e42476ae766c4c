//! In-memory [`ContactRepository`] for pipeline tests.
//!
//! Each write advances a logical clock by one second so creation order is
//! visible in `created_at`.

use std::cell::{Cell, RefCell};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
  contact::{Contact, ContactId, ContactPatch, LinkPrecedence, NewContact},
  repository::{ContactRepository, MatchKey},
};

#[derive(Debug, thiserror::Error)]
#[error("no contact with id {0}")]
pub struct Missing(ContactId);

#[derive(Debug, Default)]
pub struct MemoryRepository {
  rows:  RefCell<Vec<Contact>>,
  ticks: Cell<i64>,
}

impl MemoryRepository {
  pub fn new() -> Self { Self::default() }

  fn now(&self) -> DateTime<Utc> {
    let tick = self.ticks.get() + 1;
    self.ticks.set(tick);
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(tick)
  }

  /// Insert a row verbatim, bypassing every check. For arranging broken or
  /// hand-shaped states.
  pub fn seed(&self, contact: Contact) { self.rows.borrow_mut().push(contact); }

  pub fn primary(&self, email: Option<&str>, phone: Option<&str>) -> Contact {
    self
      .create(NewContact::primary(
        email.map(str::to_owned),
        phone.map(str::to_owned),
      ))
      .unwrap()
  }

  pub fn secondary(
    &self,
    email: Option<&str>,
    phone: Option<&str>,
    linked_id: ContactId,
  ) -> Contact {
    self
      .create(NewContact::secondary(
        email.map(str::to_owned),
        phone.map(str::to_owned),
        linked_id,
      ))
      .unwrap()
  }

  pub fn all(&self) -> Vec<Contact> { self.rows.borrow().clone() }

  pub fn count(&self) -> usize { self.rows.borrow().len() }

  pub fn fetch(&self, id: ContactId) -> Contact { self.get(id).unwrap().unwrap() }
}

impl ContactRepository for MemoryRepository {
  type Error = Missing;

  fn find_matching(&self, key: MatchKey<'_>) -> Result<Vec<Contact>, Missing> {
    let mut found: Vec<Contact> =
      self.rows.borrow().iter().filter(|c| key.matches(c)).cloned().collect();
    found.sort_by_key(|c| c.id);
    Ok(found)
  }

  fn find_excluding(
    &self,
    key: MatchKey<'_>,
    exclude_id: ContactId,
  ) -> Result<Option<Contact>, Missing> {
    Ok(
      self
        .find_matching(key)?
        .into_iter()
        .find(|c| c.id != exclude_id),
    )
  }

  fn get(&self, id: ContactId) -> Result<Option<Contact>, Missing> {
    Ok(self.rows.borrow().iter().find(|c| c.id == id).cloned())
  }

  fn create(&self, input: NewContact) -> Result<Contact, Missing> {
    let now = self.now();
    let id = self.rows.borrow().iter().map(|c| c.id).max().unwrap_or(0) + 1;
    let contact = Contact {
      id,
      email: input.email,
      phone_number: input.phone_number,
      linked_id: input.linked_id,
      link_precedence: input.link_precedence,
      created_at: now,
      updated_at: now,
      deleted_at: None,
    };
    self.rows.borrow_mut().push(contact.clone());
    Ok(contact)
  }

  fn update(&self, id: ContactId, patch: ContactPatch) -> Result<Contact, Missing> {
    let now = self.now();
    let mut rows = self.rows.borrow_mut();
    let contact = rows.iter_mut().find(|c| c.id == id).ok_or(Missing(id))?;
    patch.apply(contact, now);
    Ok(contact.clone())
  }

  fn find_by_primary_or_linked(
    &self,
    primary_id: ContactId,
  ) -> Result<Vec<Contact>, Missing> {
    Ok(
      self
        .rows
        .borrow()
        .iter()
        .filter(|c| c.id == primary_id || c.linked_id == Some(primary_id))
        .cloned()
        .collect(),
    )
  }
}

/// A contact built by hand, for [`MemoryRepository::seed`].
pub fn raw(
  id: ContactId,
  email: Option<&str>,
  precedence: LinkPrecedence,
  linked_id: Option<ContactId>,
) -> Contact {
  let at = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
  Contact {
    id,
    email: email.map(str::to_owned),
    phone_number: None,
    linked_id,
    link_precedence: precedence,
    created_at: at,
    updated_at: at,
    deleted_at: None,
  }
}
