//! Request and response types of the identify operation.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, contact::ContactId, repository::MatchKey};

// ─── Request ─────────────────────────────────────────────────────────────────

/// A validated (email, phone number) pair. At least one value is present and
/// non-empty; construct through [`IdentifyRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifyRequest {
  email:        Option<String>,
  phone_number: Option<String>,
}

impl IdentifyRequest {
  /// Empty strings count as absent. Values are otherwise kept verbatim:
  /// matching is exact and case-sensitive.
  pub fn new(email: Option<String>, phone_number: Option<String>) -> Result<Self> {
    let email = email.filter(|e| !e.is_empty());
    let phone_number = phone_number.filter(|p| !p.is_empty());

    if email.is_none() && phone_number.is_none() {
      return Err(Error::InvalidInput(
        "at least one of email or phoneNumber is required".into(),
      ));
    }
    Ok(Self { email, phone_number })
  }

  pub fn email(&self) -> Option<&str> { self.email.as_deref() }

  pub fn phone_number(&self) -> Option<&str> { self.phone_number.as_deref() }

  pub fn key(&self) -> MatchKey<'_> {
    MatchKey {
      email:        self.email(),
      phone_number: self.phone_number(),
    }
  }

  /// Keys of the serialization guard: one per provided value. Any two
  /// requests sharing an email or a phone number contend on the same key.
  pub fn lock_keys(&self) -> Vec<String> {
    let mut keys = Vec::with_capacity(2);
    if let Some(email) = self.email() {
      keys.push(format!("email:{email}"));
    }
    if let Some(phone_number) = self.phone_number() {
      keys.push(format!("phone:{phone_number}"));
    }
    keys
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

/// The consolidated view of one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
  pub primary_contact_id:    ContactId,
  /// Distinct emails in first-occurrence order; the primary's comes first.
  pub emails:                Vec<String>,
  /// Distinct phone numbers in first-occurrence order; the primary's first.
  pub phone_numbers:         Vec<String>,
  pub secondary_contact_ids: Vec<ContactId>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_missing_values() {
    let err = IdentifyRequest::new(None, None).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);

    let err = IdentifyRequest::new(Some(String::new()), Some(String::new()))
      .unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
  }

  #[test]
  fn empty_value_is_dropped() {
    let request =
      IdentifyRequest::new(Some("a@x.com".into()), Some(String::new())).unwrap();
    assert_eq!(request.email(), Some("a@x.com"));
    assert_eq!(request.phone_number(), None);
    assert_eq!(request.lock_keys(), vec!["email:a@x.com".to_string()]);
  }

  #[test]
  fn values_are_kept_verbatim() {
    let request =
      IdentifyRequest::new(Some(" A@x.com".into()), Some("123".into())).unwrap();
    assert_eq!(request.email(), Some(" A@x.com"));
    assert_eq!(
      request.lock_keys(),
      vec!["email: A@x.com".to_string(), "phone:123".to_string()]
    );
  }

  #[test]
  fn identity_uses_wire_field_names() {
    let identity = Identity {
      primary_contact_id:    1,
      emails:                vec!["a@x.com".into()],
      phone_numbers:         vec!["123".into()],
      secondary_contact_ids: vec![2],
    };
    let json = serde_json::to_value(&identity).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "primaryContactId": 1,
        "emails": ["a@x.com"],
        "phoneNumbers": ["123"],
        "secondaryContactIds": [2],
      })
    );
  }
}
