//! Handler for `POST /identify`.
//!
//! Body: `{"email": "...", "phoneNumber": "..."}`; either field may be
//! omitted or `null`, but not both. Returns the consolidated [`Identity`].

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use linkage_core::{
  identity::{IdentifyRequest, Identity},
  store::IdentityStore,
};
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyBody {
  #[serde(default)]
  pub email:        Option<String>,
  /// Accepted as a JSON string or a JSON number.
  #[serde(default, deserialize_with = "string_or_number")]
  pub phone_number: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Text(String),
    Number(serde_json::Number),
  }

  Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
    Raw::Text(s) => s,
    Raw::Number(n) => n.to_string(),
  }))
}

/// `POST /identify`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<IdentifyBody>, JsonRejection>,
) -> Result<Json<Identity>, ApiError>
where
  S: IdentityStore,
{
  let Json(body) = body.map_err(|r| ApiError::BadRequest(r.body_text()))?;
  let request = IdentifyRequest::new(body.email, body.phone_number)?;

  let identity = store.identify(request).await.map_err(ApiError::store)?;
  Ok(Json(identity))
}
