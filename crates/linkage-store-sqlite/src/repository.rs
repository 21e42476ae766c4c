//! [`ConnRepository`] — the pipeline's view of one open SQLite connection.
//!
//! The store binds it to a transaction, so every read sees the writes made
//! earlier in the same request.

use chrono::Utc;
use linkage_core::{
  contact::{Contact, ContactId, ContactPatch, NewContact},
  repository::{ContactRepository, MatchKey},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{encode_dt, encode_precedence, raw_contact},
  schema::CONTACT_COLUMNS,
};

pub struct ConnRepository<'a> {
  conn: &'a rusqlite::Connection,
}

impl<'a> ConnRepository<'a> {
  pub fn new(conn: &'a rusqlite::Connection) -> Self { Self { conn } }

  fn query(
    &self,
    sql: &str,
    params: impl rusqlite::Params,
  ) -> Result<Vec<Contact>> {
    let mut stmt = self.conn.prepare_cached(sql)?;
    let raws = stmt
      .query_map(params, raw_contact)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(|r| r.into_contact()).collect()
  }

  /// Every contact, ordered by id.
  pub fn all(&self) -> Result<Vec<Contact>> {
    self.query(
      &format!("SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY id"),
      rusqlite::params![],
    )
  }
}

// A NULL parameter compares as NULL in `email = ?1`, so an absent value never
// matches, not even rows whose column is NULL.
impl ContactRepository for ConnRepository<'_> {
  type Error = Error;

  fn find_matching(&self, key: MatchKey<'_>) -> Result<Vec<Contact>> {
    self.query(
      &format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE email = ?1 OR phone_number = ?2
         ORDER BY id"
      ),
      rusqlite::params![key.email, key.phone_number],
    )
  }

  fn find_excluding(
    &self,
    key: MatchKey<'_>,
    exclude_id: ContactId,
  ) -> Result<Option<Contact>> {
    let found = self.query(
      &format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE (email = ?1 OR phone_number = ?2) AND id != ?3
         ORDER BY id
         LIMIT 1"
      ),
      rusqlite::params![key.email, key.phone_number, exclude_id],
    )?;
    Ok(found.into_iter().next())
  }

  fn get(&self, id: ContactId) -> Result<Option<Contact>> {
    let raw = self
      .conn
      .prepare_cached(&format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"
      ))?
      .query_row(rusqlite::params![id], raw_contact)
      .optional()?;
    raw.map(|r| r.into_contact()).transpose()
  }

  fn create(&self, input: NewContact) -> Result<Contact> {
    let now = Utc::now();
    let now_str = encode_dt(now);

    self.conn.execute(
      "INSERT INTO contacts (
         email, phone_number, linked_id, link_precedence, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
      rusqlite::params![
        input.email,
        input.phone_number,
        input.linked_id,
        encode_precedence(&input.link_precedence),
        now_str,
      ],
    )?;

    Ok(Contact {
      id:              self.conn.last_insert_rowid(),
      email:           input.email,
      phone_number:    input.phone_number,
      linked_id:       input.linked_id,
      link_precedence: input.link_precedence,
      created_at:      now,
      updated_at:      now,
      deleted_at:      None,
    })
  }

  fn update(&self, id: ContactId, patch: ContactPatch) -> Result<Contact> {
    let mut contact = self.get(id)?.ok_or(Error::ContactNotFound(id))?;
    patch.apply(&mut contact, Utc::now());

    self.conn.execute(
      "UPDATE contacts
       SET link_precedence = ?1, linked_id = ?2, updated_at = ?3
       WHERE id = ?4",
      rusqlite::params![
        encode_precedence(&contact.link_precedence),
        contact.linked_id,
        encode_dt(contact.updated_at),
        id,
      ],
    )?;
    Ok(contact)
  }

  fn find_by_primary_or_linked(&self, primary_id: ContactId) -> Result<Vec<Contact>> {
    self.query(
      &format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE id = ?1 OR linked_id = ?1
         ORDER BY id"
      ),
      rusqlite::params![primary_id],
    )
  }
}
