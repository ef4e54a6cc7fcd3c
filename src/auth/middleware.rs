use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::middleware::Next;
use actix_web::{Error, HttpMessage, web::Data};
use tracing::debug;

use crate::auth::auth::AuthUser;
use crate::auth::jwt::{rejection_reason, verify_token};
use crate::config::Config;
use crate::error::ApiError;

/// Name of the cookie carrying the token.
pub const TOKEN_COOKIE: &str = "t";

/// Bearer header first, then the `t` cookie.
fn extract_token(req: &ServiceRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    bearer.or_else(|| {
        req.request()
            .cookie(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    })
}

fn authenticate(req: &ServiceRequest) -> Result<AuthUser, ApiError> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| ApiError::Internal("App config missing".to_string()))?;

    let token = extract_token(req)
        .ok_or_else(|| ApiError::Unauthorized("No authorization token was found".to_string()))?;

    let claims = verify_token(&token, &config.jwt_secret).map_err(|e| {
        debug!(error = %e, "Token rejected");
        ApiError::Unauthorized(rejection_reason(&e).to_string())
    })?;

    AuthUser::try_from(claims)
}

pub async fn require_signin(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let auth_user = authenticate(&req)?;
    req.extensions_mut().insert(auth_user);

    next.call(req).await
}

/// Must run inside `require_signin`.
pub async fn require_admin(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let is_admin = req
        .extensions()
        .get::<AuthUser>()
        .map(AuthUser::is_admin);

    match is_admin {
        Some(true) => next.call(req).await,
        Some(false) => Err(ApiError::Forbidden.into()),
        None => Err(ApiError::Unauthorized("No authorization token was found".to_string()).into()),
    }
}

/// Access policy for the HR resources: open unless `hr_routes_require_auth`
/// is set, in which case reads need a signed-in user and writes an admin.
pub async fn hr_guard(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let enforced = req
        .app_data::<Data<Config>>()
        .is_some_and(|c| c.hr_routes_require_auth);

    if enforced {
        let auth_user = authenticate(&req)?;
        if *req.method() != Method::GET && !auth_user.is_admin() {
            return Err(ApiError::Forbidden.into());
        }
        req.extensions_mut().insert(auth_user);
    }

    next.call(req).await
}
