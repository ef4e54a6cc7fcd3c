use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, Responder, get, middleware::from_fn, web};
use anyhow::{Result, anyhow};
use serde_json::json;

use crate::{
    api::{department, employee, job, user},
    auth::{
        handlers,
        middleware::{hr_guard, require_signin},
    },
    config::Config,
    error::ApiError,
    store::Store,
};

type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter state, built once and shared by every worker.
#[derive(Clone)]
pub struct RateLimits {
    signin: LimiterConfig,
    register: LimiterConfig,
}

impl RateLimits {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            signin: build_limiter(config.rate_signin_per_min)?,
            register: build_limiter(config.rate_register_per_min)?,
        })
    }
}

// Replenishes one request every 60_000 / n ms with a burst of n.
fn build_limiter(requests_per_min: u32) -> Result<LimiterConfig> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {} requests per minute", requests_per_min))
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "HR API is running" }))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::Validation(format!("Invalid request body: {}", err)).into()
    })
}

pub fn configure<S: Store>(cfg: &mut web::ServiceConfig, limits: &RateLimits) {
    cfg.app_data(json_config()).service(index);

    cfg.service(
        web::scope("/api")
            // authentication
            .service(
                web::resource("/signin")
                    .wrap(Governor::new(&limits.signin))
                    .route(web::post().to(handlers::signin::<S>)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&limits.register))
                    .route(web::post().to(handlers::register::<S>)),
            )
            .service(web::resource("/signout").route(web::get().to(handlers::signout)))
            // /users
            .service(
                web::scope("/users")
                    .wrap(from_fn(require_signin))
                    .configure(user::configure::<S>),
            )
            // HR resources
            .service(
                web::scope("/employees")
                    .wrap(from_fn(hr_guard))
                    .configure(employee::configure::<S>),
            )
            .service(
                web::scope("/jobs")
                    .wrap(from_fn(hr_guard))
                    .configure(job::configure::<S>),
            )
            .service(
                web::scope("/departments")
                    .wrap(from_fn(hr_guard))
                    .configure(department::configure::<S>),
            ),
    );
}
