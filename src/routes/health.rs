use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use std::time::Duration;

/// How long the database check may take before the instance counts as degraded.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Health check endpoint
///
/// Reports whether the database answers. Responds `503` when it does not, so load
/// balancers stop routing sign-ins to an instance that cannot serve them.
#[get("/health")]
pub async fn health(pool: web::Data<PgPool>) -> impl Responder {
    let ping = sqlx::query("SELECT 1").execute(pool.get_ref());
    let healthy = match tokio::time::timeout(CHECK_TIMEOUT, ping).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            log::warn!("Health check could not reach the database: {}", e);
            false
        }
        Err(_) => {
            log::warn!("Health check timed out after {:?}", CHECK_TIMEOUT);
            false
        }
    };

    let mut response = if healthy {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response.json(json!({
        "status": if healthy { "ok" } else { "degraded" },
        "database": if healthy { "ok" } else { "unavailable" },
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}
