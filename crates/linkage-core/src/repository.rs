//! The `ContactRepository` trait — the storage collaborator the pipeline runs
//! against.
//!
//! Methods are synchronous: a backend hands the pipeline a repository bound
//! to one open transaction, and commits only if the whole pipeline succeeds.
//! The pipeline never builds query syntax; it passes semantic filter values.

use crate::contact::{Contact, ContactId, ContactPatch, NewContact};

/// Filter values for the match lookups. A `None` field never matches
/// anything, including stored `NULL`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchKey<'a> {
  pub email:        Option<&'a str>,
  pub phone_number: Option<&'a str>,
}

impl MatchKey<'_> {
  /// Whether `contact` carries the key's email or its phone number.
  pub fn matches(&self, contact: &Contact) -> bool {
    self.email.is_some_and(|e| contact.has_email(e))
      || self.phone_number.is_some_and(|p| contact.has_phone_number(p))
  }
}

pub trait ContactRepository {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All contacts whose email equals `key.email` or whose phone number
  /// equals `key.phone_number`, ordered by id.
  fn find_matching(&self, key: MatchKey<'_>) -> Result<Vec<Contact>, Self::Error>;

  /// The lowest-id contact other than `exclude_id` that matches `key`.
  fn find_excluding(
    &self,
    key: MatchKey<'_>,
    exclude_id: ContactId,
  ) -> Result<Option<Contact>, Self::Error>;

  fn get(&self, id: ContactId) -> Result<Option<Contact>, Self::Error>;

  /// Persist a new contact; the store assigns `id`, `created_at` and
  /// `updated_at`.
  fn create(&self, contact: NewContact) -> Result<Contact, Self::Error>;

  /// Apply `patch` to an existing contact and refresh its `updated_at`.
  fn update(&self, id: ContactId, patch: ContactPatch) -> Result<Contact, Self::Error>;

  /// The contact `primary_id` itself plus every contact whose `linked_id` is
  /// `primary_id`.
  fn find_by_primary_or_linked(
    &self,
    primary_id: ContactId,
  ) -> Result<Vec<Contact>, Self::Error>;
}
