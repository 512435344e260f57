use actix_web::{post, web, HttpResponse, Responder};

use crate::{
    auth::{CredentialStore, TokenIssuer},
    models::{LoginRequest, TokenResponse},
    util::{ApiError, Result},
};

pub fn config(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(login);
}

#[post("/auth/login")]
pub async fn login(
    credentials: web::Data<CredentialStore>,
    issuer: web::Data<TokenIssuer>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder> {
    let LoginRequest { username, password } = body.into_inner();
    if !credentials.is_valid(&username, &password) {
        log::info!("rejected login for {}", username);
        return Err(ApiError::InvalidCredentials);
    }

    let token = issuer
        .issue(&username)
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token, issuer.ttl_seconds())))
}
