//! Handlers for `/contacts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/contacts` | Every contact, ordered by id |
//! | `GET`  | `/contacts/:id` | 404 if not found |
//! | `GET`  | `/contacts/:id/identity` | Aggregated cluster containing the contact |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::PathRejection},
};
use linkage_core::{
  contact::{Contact, ContactId},
  identity::Identity,
  store::IdentityStore,
};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Contact>>, ApiError>
where
  S: IdentityStore,
{
  let contacts = store.list_contacts().await.map_err(ApiError::store)?;
  Ok(Json(contacts))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contacts/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<ContactId>, PathRejection>,
) -> Result<Json<Contact>, ApiError>
where
  S: IdentityStore,
{
  let Path(id) = id.map_err(|r| ApiError::BadRequest(r.body_text()))?;
  let contact = store
    .get_contact(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(linkage_core::Error::ContactNotFound(id))?;
  Ok(Json(contact))
}

// ─── Identity ─────────────────────────────────────────────────────────────────

/// `GET /contacts/:id/identity`
pub async fn identity<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<ContactId>, PathRejection>,
) -> Result<Json<Identity>, ApiError>
where
  S: IdentityStore,
{
  let Path(id) = id.map_err(|r| ApiError::BadRequest(r.body_text()))?;
  let identity = store
    .identity_of(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(linkage_core::Error::ContactNotFound(id))?;
  Ok(Json(identity))
}
