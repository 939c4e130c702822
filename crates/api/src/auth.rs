//! Actor extraction for administrative routes.
//!
//! Authentication lives in an external service; this only verifies the
//! bearer token it issued and hands the actor id to the engine. Public
//! routes never use this extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated administrative actor.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub Uuid);

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;

        let key = DecodingKey::from_secret(state.config().jwt_secret.as_bytes());
        let data = decode::<Claims>(token, &key, &Validation::default())
            .map_err(|_| ApiError::Unauthorized)?;

        let id = data
            .claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| ApiError::Unauthorized)?;
        Ok(Actor(id))
    }
}
