//! Contact — the sole persisted entity.
//!
//! Every row records one (email, phone number) observation. Rows are grouped
//! into clusters: exactly one `primary` per cluster, every other row a
//! `secondary` carrying a `linked_id` back-reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage-assigned row identifier. Never reused, never mutated.
pub type ContactId = i64;

// ─── Precedence ──────────────────────────────────────────────────────────────

/// Whether a contact is the canonical record of its cluster.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkPrecedence {
  Primary,
  Secondary,
}

// ─── Contact ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:              ContactId,
  pub email:           Option<String>,
  pub phone_number:    Option<String>,
  /// Set only on secondaries; the id of the contact this one was linked to.
  pub linked_id:       Option<ContactId>,
  pub link_precedence: LinkPrecedence,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
  /// Reserved. Stored and returned, never written by the pipeline.
  pub deleted_at:      Option<DateTime<Utc>>,
}

impl Contact {
  pub fn is_primary(&self) -> bool {
    self.link_precedence == LinkPrecedence::Primary
  }

  /// Ordering key for "oldest": creation time, ties broken by lowest id.
  pub fn age_key(&self) -> (DateTime<Utc>, ContactId) {
    (self.created_at, self.id)
  }

  pub fn has_email(&self, email: &str) -> bool {
    self.email.as_deref() == Some(email)
  }

  pub fn has_phone_number(&self, phone_number: &str) -> bool {
    self.phone_number.as_deref() == Some(phone_number)
  }
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Input to [`crate::repository::ContactRepository::create`].
/// `id` and the timestamps are always assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
  pub email:           Option<String>,
  pub phone_number:    Option<String>,
  pub linked_id:       Option<ContactId>,
  pub link_precedence: LinkPrecedence,
}

impl NewContact {
  pub fn primary(email: Option<String>, phone_number: Option<String>) -> Self {
    Self {
      email,
      phone_number,
      linked_id: None,
      link_precedence: LinkPrecedence::Primary,
    }
  }

  pub fn secondary(
    email: Option<String>,
    phone_number: Option<String>,
    primary_id: ContactId,
  ) -> Self {
    Self {
      email,
      phone_number,
      linked_id: Some(primary_id),
      link_precedence: LinkPrecedence::Secondary,
    }
  }
}

/// Fields changed by [`crate::repository::ContactRepository::update`]. The
/// store refreshes `updated_at` on every applied patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContactPatch {
  pub link_precedence: Option<LinkPrecedence>,
  pub linked_id:       Option<ContactId>,
}

impl ContactPatch {
  /// Turn a primary into a secondary of `primary_id`.
  pub fn demote_to(primary_id: ContactId) -> Self {
    Self {
      link_precedence: Some(LinkPrecedence::Secondary),
      linked_id:       Some(primary_id),
    }
  }

  /// Apply the patch to an in-memory copy.
  pub fn apply(&self, contact: &mut Contact, now: DateTime<Utc>) {
    if let Some(precedence) = self.link_precedence {
      contact.link_precedence = precedence;
    }
    if let Some(linked_id) = self.linked_id {
      contact.linked_id = Some(linked_id);
    }
    contact.updated_at = now;
  }
}
