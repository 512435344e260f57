use actix_cors::Cors;
use actix_web::{
    middleware::{self, Logger},
    web, App, HttpServer,
};
use anyhow::Context;

use blueprints_api::{
    auth::{CredentialStore, TokenIssuer},
    blueprint::BlueprintService,
    config::Settings,
    db, routes,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::load().context("failed to load configuration")?;

    let persistence = db::connect(&settings.database).await;
    log::info!("active blueprint filter: {}", settings.filter);
    let service = web::Data::new(BlueprintService::new(persistence, settings.filter));

    let credentials = web::Data::new(CredentialStore::from_plaintext(
        &settings.security.credentials,
    )?);
    let issuer = web::Data::new(TokenIssuer::new(&settings.security));

    let cors_origin = settings.server.cors_origin.clone();
    let address = (settings.server.address.clone(), settings.server.port);
    log::info!("listening on {}:{}", address.0, address.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(cors)
            .app_data(service.clone())
            .app_data(credentials.clone())
            .app_data(issuer.clone())
            .configure(routes::config)
    })
    .bind(address)?
    .run()
    .await?;

    log::info!("bye!");
    Ok(())
}
