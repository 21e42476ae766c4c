//! The `IdentityStore` trait — the async surface the transport layer calls.
//!
//! Implemented by storage backends (e.g. `linkage-store-sqlite`). Higher
//! layers (`linkage-api`, `linkage-server`) depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use crate::{
  contact::{Contact, ContactId},
  identity::{IdentifyRequest, Identity},
};

/// Abstraction over a Linkage store backend.
///
/// [`IdentityStore::identify`] must run the whole match → resolve → link →
/// aggregate pipeline as one atomic unit with respect to any other request
/// sharing an email or phone number: either every write commits or none does.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait IdentityStore: Send + Sync {
  /// Backend error; converts into the core [`crate::Error`] so the transport
  /// can read its [`crate::ErrorKind`].
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Resolve `request` into its consolidated identity, creating, linking or
  /// merging contacts as needed.
  fn identify(
    &self,
    request: IdentifyRequest,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  /// Retrieve a contact by id. Returns `None` if not found.
  fn get_contact(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// List every contact, ordered by id.
  fn list_contacts(
    &self,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  /// Aggregate the cluster containing contact `id` without writing anything.
  /// Returns `None` if the contact does not exist.
  fn identity_of(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;
}
