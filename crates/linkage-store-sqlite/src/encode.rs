//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Link precedence is stored
//! as its lowercase name.

use std::str::FromStr as _;

use chrono::{DateTime, Utc};
use linkage_core::contact::{Contact, LinkPrecedence};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LinkPrecedence ──────────────────────────────────────────────────────────

pub fn encode_precedence(p: &LinkPrecedence) -> &str { p.as_ref() }

pub fn decode_precedence(s: &str) -> Result<LinkPrecedence> {
  LinkPrecedence::from_str(s).map_err(|_| Error::UnknownPrecedence(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `contacts` row.
pub struct RawContact {
  pub id:              i64,
  pub email:           Option<String>,
  pub phone_number:    Option<String>,
  pub linked_id:       Option<i64>,
  pub link_precedence: String,
  pub created_at:      String,
  pub updated_at:      String,
  pub deleted_at:      Option<String>,
}

/// Row mapper for `SELECT` statements using
/// [`crate::schema::CONTACT_COLUMNS`].
pub fn raw_contact(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawContact> {
  Ok(RawContact {
    id:              row.get(0)?,
    email:           row.get(1)?,
    phone_number:    row.get(2)?,
    linked_id:       row.get(3)?,
    link_precedence: row.get(4)?,
    created_at:      row.get(5)?,
    updated_at:      row.get(6)?,
    deleted_at:      row.get(7)?,
  })
}

impl RawContact {
  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:              self.id,
      email:           self.email,
      phone_number:    self.phone_number,
      linked_id:       self.linked_id,
      link_precedence: decode_precedence(&self.link_precedence)?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
      deleted_at:      self.deleted_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn precedence_round_trips_through_column_text() {
    for p in [LinkPrecedence::Primary, LinkPrecedence::Secondary] {
      assert_eq!(decode_precedence(encode_precedence(&p)).unwrap(), p);
    }
    assert_eq!(encode_precedence(&LinkPrecedence::Secondary), "secondary");
    assert!(matches!(
      decode_precedence("PRIMARY"),
      Err(Error::UnknownPrecedence(_))
    ));
  }

  #[test]
  fn timestamps_keep_subsecond_precision() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
    assert!(decode_dt("yesterday").is_err());
  }
}
