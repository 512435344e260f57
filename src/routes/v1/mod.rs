mod blueprints;
pub use blueprints::*;

use actix_web::{http::header, web, FromRequest, HttpRequest};
use anyhow::anyhow;
use futures::future::{ready, Ready};

use crate::{
    auth::{Principal, TokenIssuer, SCOPE_READ, SCOPE_WRITE},
    util::{ApiError, Result},
};

pub fn config(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(
        actix_web::web::scope("api/v1")
            .configure(blueprints::config)
            .configure(blueprints::public_config),
    );
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Verifies the bearer token and requires at least one of `scopes`.
fn authorize(req: &HttpRequest, scopes: &[&str]) -> Result<Principal> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| anyhow!("token issuer is not registered"))?;
    let token = bearer_token(req)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
    let principal = issuer
        .verify(token)
        .map_err(|e| ApiError::Unauthorized(format!("invalid token: {}", e)))?;

    if !scopes.iter().any(|scope| principal.has_scope(scope)) {
        return Err(ApiError::Forbidden(scopes.join(" or ")));
    }
    Ok(principal)
}

/// A caller holding the `blueprints.read` scope.
pub struct ReadAccess(pub Principal);

impl FromRequest for ReadAccess {
    type Error = ApiError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(authorize(req, &[SCOPE_READ]).map(ReadAccess))
    }
}

/// A caller holding the `blueprints.write` scope.
pub struct WriteAccess(pub Principal);

impl FromRequest for WriteAccess {
    type Error = ApiError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(authorize(req, &[SCOPE_WRITE]).map(WriteAccess))
    }
}

/// A caller holding either blueprint scope. Guards the public route set.
pub struct ScopedAccess(pub Principal);

impl FromRequest for ScopedAccess {
    type Error = ApiError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(authorize(req, &[SCOPE_READ, SCOPE_WRITE]).map(ScopedAccess))
    }
}
