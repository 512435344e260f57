use actix_web::{web, FromRequest, HttpRequest, Responder};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    blueprint::BlueprintService,
    models::{Blueprint, Point},
    routes::util::{accepted, created, ok, ok_empty},
    util::Result,
};

use super::{ReadAccess, ScopedAccess, WriteAccess};

/// Blueprint routes gated by bearer token scopes.
pub fn config(cfg: &mut actix_web::web::ServiceConfig) {
    register::<ReadAccess, WriteAccess>(cfg, "blueprints");
}

/// The same routes for any authenticated caller, whichever blueprint scope
/// the token carries.
pub fn public_config(cfg: &mut actix_web::web::ServiceConfig) {
    register::<ScopedAccess, ScopedAccess>(cfg, "public/blueprints");
}

fn register<R, W>(cfg: &mut actix_web::web::ServiceConfig, path: &str)
where
    R: FromRequest + 'static,
    W: FromRequest + 'static,
{
    cfg.service(
        web::scope(path)
            .route("", web::get().to(list_blueprints::<R>))
            .route("", web::post().to(create_blueprint::<W>))
            .route("/{author}", web::get().to(blueprints_by_author::<R>))
            .route("/{author}/{name}", web::get().to(get_blueprint::<R>))
            .route("/{author}/{name}", web::put().to(update_blueprint::<W>))
            .route("/{author}/{name}", web::delete().to(delete_blueprint::<W>))
            .route("/{author}/{name}/points", web::put().to(add_point::<W>)),
    );
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct NewBlueprintRequest {
    #[validate(custom = "not_blank")]
    pub author: String,
    #[validate(custom = "not_blank")]
    pub name: String,
    #[serde(default)]
    pub points: Vec<Point>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct UpdateBlueprintRequest {
    #[validate(custom = "not_blank")]
    pub author: String,
    #[validate(custom = "not_blank")]
    pub name: String,
    #[serde(default)]
    pub points: Vec<Point>,
}

impl From<NewBlueprintRequest> for Blueprint {
    fn from(value: NewBlueprintRequest) -> Self {
        Blueprint::new(value.author, value.name, value.points)
    }
}

impl From<UpdateBlueprintRequest> for Blueprint {
    fn from(value: UpdateBlueprintRequest) -> Self {
        Blueprint::new(value.author, value.name, value.points)
    }
}

async fn list_blueprints<A>(_: A, service: web::Data<BlueprintService>) -> Result<impl Responder> {
    let blueprints = service.get_all().await?;
    Ok(ok("execute ok", blueprints))
}

async fn blueprints_by_author<A>(
    _: A,
    service: web::Data<BlueprintService>,
    author: web::Path<String>,
) -> Result<impl Responder> {
    let blueprints = service.get_by_author(&author).await?;
    Ok(ok("execute ok", blueprints))
}

async fn get_blueprint<A>(
    _: A,
    service: web::Data<BlueprintService>,
    path: web::Path<(String, String)>,
) -> Result<impl Responder> {
    let (author, name) = path.into_inner();
    let blueprint = service.get(&author, &name).await?;
    Ok(ok("execute ok", blueprint))
}

async fn create_blueprint<A>(
    _: A,
    req: HttpRequest,
    service: web::Data<BlueprintService>,
    body: web::Json<NewBlueprintRequest>,
) -> Result<impl Responder> {
    let body = body.into_inner();
    body.validate()?;

    let blueprint = service.add_new(body.into()).await?;
    let location = format!("{}/{}", blueprint.author, blueprint.name);
    Ok(created(&req, &location, blueprint))
}

async fn add_point<A>(
    _: A,
    service: web::Data<BlueprintService>,
    path: web::Path<(String, String)>,
    point: web::Json<Point>,
) -> Result<impl Responder> {
    let (author, name) = path.into_inner();
    let Point { x, y } = point.into_inner();
    service.add_point(&author, &name, x, y).await?;
    Ok(accepted("point added"))
}

async fn update_blueprint<A>(
    _: A,
    service: web::Data<BlueprintService>,
    path: web::Path<(String, String)>,
    body: web::Json<UpdateBlueprintRequest>,
) -> Result<impl Responder> {
    let (author, name) = path.into_inner();
    let body = body.into_inner();
    body.validate()?;

    let updated = service.update(&author, &name, body.into()).await?;
    Ok(ok("updated", updated))
}

async fn delete_blueprint<A>(
    _: A,
    service: web::Data<BlueprintService>,
    path: web::Path<(String, String)>,
) -> Result<impl Responder> {
    let (author, name) = path.into_inner();
    service.delete(&author, &name).await?;
    Ok(ok_empty("deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_fail_validation() {
        let request = NewBlueprintRequest {
            author: "  ".to_string(),
            name: "house".to_string(),
            points: vec![],
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("author"));

        let request = UpdateBlueprintRequest {
            author: "john".to_string(),
            name: String::new(),
            points: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn points_default_to_empty() {
        let request: NewBlueprintRequest =
            serde_json::from_str(r#"{"author":"john","name":"house"}"#).unwrap();
        assert!(request.validate().is_ok());
        assert!(Blueprint::from(request).points.is_empty());
    }
}
