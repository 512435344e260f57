use actix_web::{http::header, http::StatusCode, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

/// Envelope shared by every blueprint response.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data,
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message, None)
    }
}

pub fn ok(message: &str, body: impl Serialize) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(StatusCode::OK, message, Some(body)))
}

pub fn created(req: &HttpRequest, path: &str, body: impl Serialize) -> HttpResponse {
    let location = req.uri().path().trim_end_matches('/').to_string() + "/" + path;
    HttpResponse::Created()
        .append_header((header::LOCATION, location))
        .json(ApiResponse::new(StatusCode::CREATED, "created", Some(body)))
}

pub fn accepted(message: &str) -> HttpResponse {
    HttpResponse::Accepted().json(ApiResponse::<()>::new(StatusCode::ACCEPTED, message, None))
}

pub fn ok_empty(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::<()>::new(StatusCode::OK, message, None))
}
