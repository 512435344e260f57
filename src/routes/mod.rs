pub mod auth;
pub mod util;
pub mod v1;

use actix_web::{error::InternalError, http::StatusCode, web, HttpResponse, Responder};
use serde_json::json;

use self::util::ApiResponse;

async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "UP" }))
}

/// Malformed JSON bodies are answered with the usual envelope.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = ApiResponse::<()>::error(StatusCode::BAD_REQUEST, err.to_string());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health))
        .route("/actuator/health", web::get().to(health))
        .configure(auth::config)
        .configure(v1::config);
}
