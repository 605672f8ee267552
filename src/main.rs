use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;

use skygate::auth::{AuthMiddleware, JwtSessionProvider, SessionConfig, SessionProvider};
use skygate::bluesky::PublicApiClient;
use skygate::config::Config;
use skygate::db;
use skygate::moderation::{ContentModerator, HttpModerator, RuleModerator};
use skygate::routes::{self, health};
use skygate::ContentIngestor;

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    log::error!("Startup failed: {}", err);
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(startup_error)?;

    let pool = db::connect(&config.database_url).await.map_err(startup_error)?;
    db::migrate(&pool).await.map_err(startup_error)?;

    let provider = PublicApiClient::new(&config.bsky_public_api_url, config.request_timeout)
        .map_err(startup_error)?;
    let moderator: Arc<dyn ContentModerator> = match &config.moderation_api_url {
        Some(url) => {
            log::info!("Using remote moderation service at {}", url);
            Arc::new(HttpModerator::new(url, config.request_timeout).map_err(startup_error)?)
        }
        None => {
            log::info!(
                "Using local moderation rules ({} muted words)",
                config.muted_words.len()
            );
            Arc::new(RuleModerator::new(&config.muted_words))
        }
    };
    let ingestor = web::Data::new(ContentIngestor::new(
        Arc::new(provider),
        moderator,
        config.bsky_web_url.clone(),
    ));

    let sessions: Arc<dyn SessionProvider> =
        Arc::new(JwtSessionProvider::new(pool.clone(), config.jwt_secret.clone()));
    let sessions = web::Data::from(sessions);
    let session_config = web::Data::new(SessionConfig {
        jwt_secret: config.jwt_secret.clone(),
        cookie_secure: config.session_cookie_secure,
    });
    let pool = web::Data::new(pool);
    let jwt_secret = config.jwt_secret.clone();

    log::info!("Starting skygate at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(sessions.clone())
            .app_data(session_config.clone())
            .app_data(ingestor.clone())
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::page_config)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(&jwt_secret))
                    .wrap(
                        Cors::default()
                            .allow_any_origin()
                            .allow_any_method()
                            .allow_any_header()
                            .max_age(3600),
                    )
                    .configure(routes::api_config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
