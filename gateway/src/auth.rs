use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, extracted from a `Bearer <jwt>` header.
/// Token issuance lives outside this service; only HS256 verification
/// and the `sub` claim (the user uuid) matter here.
pub struct AuthedUser {
  pub user_id: Uuid,
}

#[derive(Deserialize)]
struct Claims {
  sub: String,
  #[allow(dead_code)]
  exp: usize,
}

impl FromRequestParts<Arc<AppState>> for AuthedUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &Arc<AppState>,
  ) -> Result<Self, Self::Rejection> {
    let header = parts
      .headers
      .get(AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthorized)?;
    let token = header
      .strip_prefix("Bearer ")
      .ok_or(ApiError::Unauthorized)?;

    let data = decode::<Claims>(
      token,
      &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
      &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;

    let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| ApiError::Forbidden)?;
    Ok(AuthedUser { user_id })
  }
}
