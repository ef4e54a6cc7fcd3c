use actix_web::cookie::{Cookie, time::Duration};
use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::auth::jwt::generate_token;
use crate::auth::middleware::TOKEN_COOKIE;
use crate::auth::password::{hash_password_off_thread, verify_password_off_thread};
use crate::config::Config;
use crate::error::ApiError;
use crate::model::Resource;
use crate::model::role::Role;
use crate::model::user::{User, UserCredentials, Users};
use crate::models::{RegisterReq, SigninReq};
use crate::store::{Store, StoreError};
use crate::utils::db_utils::{Insert, Select, SqlValue};

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Register
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "User registered", body = Object, example = json!({
            "user": { "user_id": 1, "email": "kevon@example.com", "username": "kmitchell", "role": "user" },
            "message": "User registered successfully."
        })),
        (status = 400, description = "All fields are required."),
        (status = 409, description = "User with this email already exists.")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip(store, body))]
pub async fn register<S: Store>(
    store: web::Data<S>,
    body: web::Json<RegisterReq>,
) -> Result<HttpResponse, ApiError> {
    let (Some(username), Some(email), Some(_)) = (
        present(&body.username),
        present(&body.email),
        present(&body.password),
    ) else {
        return Err(ApiError::Validation("All fields are required.".to_string()));
    };
    let password = body.password.clone().unwrap_or_default();

    let by_email = Select::from(Users::TABLE, Users::COLUMNS).filter_by("email");
    let existing = store
        .select_one::<User>(&by_email, &SqlValue::from(email))
        .await
        .map_err(|e| ApiError::storage("Registration failed", e))?;

    if existing.is_some() {
        info!("Registration rejected: email already in use");
        return Err(ApiError::Conflict(
            "User with this email already exists.".to_string(),
        ));
    }

    let password_hash = hash_password_off_thread(password).await?;
    let role = Role::User;

    let insert = Insert::into_table(Users::TABLE)
        .generated_key(Users::PRIMARY_KEY)
        .value("username", username)
        .value("email", email)
        .value("password_hash", password_hash)
        .value("role", role.as_ref());

    let user_id = store.insert(&insert).await.map_err(|e| match e {
        // lost a race with a concurrent registration
        StoreError::Duplicate(_) => {
            ApiError::Conflict("User with this email already exists.".to_string())
        }
        other => ApiError::storage("Registration failed", other),
    })?;

    info!(user_id, "User registered");

    Ok(HttpResponse::Created().json(json!({
        "user": {
            "user_id": user_id,
            "email": email,
            "username": username,
            "role": role.as_ref(),
        },
        "message": "User registered successfully."
    })))
}

/// Sign In
///
/// Returns the token and also sets it as the `t` cookie.
#[utoipa::path(
    post,
    path = "/api/signin",
    request_body = SigninReq,
    responses(
        (status = 200, description = "Signed in", body = Object, example = json!({
            "token": "eyJhbGciOiJIUzI1NiJ9...",
            "user": { "user_id": 1, "username": "kmitchell", "email": "kevon@example.com", "role": "user" }
        })),
        (status = 400, description = "Email and password are required."),
        (status = 401, description = "Unknown email or wrong password")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_signin", skip(store, config, body))]
pub async fn signin<S: Store>(
    store: web::Data<S>,
    config: web::Data<Config>,
    body: web::Json<SigninReq>,
) -> Result<HttpResponse, ApiError> {
    info!("Signin request received");

    let (Some(email), Some(password)) = (present(&body.email), body.password.as_deref()) else {
        return Err(ApiError::Validation(
            "Email and password are required.".to_string(),
        ));
    };
    if password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required.".to_string(),
        ));
    }

    debug!("Fetching user from database");

    let by_email = Select::from(Users::TABLE, UserCredentials::COLUMNS).filter_by("email");
    let Some(user) = store
        .select_one::<UserCredentials>(&by_email, &SqlValue::from(email))
        .await
        .map_err(|e| ApiError::storage("Could not sign in", e))?
    else {
        info!("Invalid credentials: user not found");
        return Err(ApiError::Unauthorized("User not found".to_string()));
    };

    let matches =
        verify_password_off_thread(password.to_string(), user.password_hash.clone()).await?;
    if !matches {
        info!(user_id = user.user_id, "Invalid credentials: password mismatch");
        return Err(ApiError::Unauthorized(
            "Email and password don't match.".to_string(),
        ));
    }

    let token = generate_token(
        user.user_id,
        &user.role,
        &user.email,
        &config.jwt_secret,
        config.token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign token");
        ApiError::Internal("Could not sign in: token generation failed".to_string())
    })?;

    let cookie = Cookie::build(TOKEN_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(config.token_ttl as i64))
        .finish();

    info!(user_id = user.user_id, "Signin successful");

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "token": token,
        "user": {
            "user_id": user.user_id,
            "username": user.username,
            "email": user.email,
            "role": user.role,
        }
    })))
}

/// Clears the token cookie whether or not the caller was signed in.
#[utoipa::path(
    get,
    path = "/api/signout",
    responses((status = 200, description = "Signed out", body = Object, example = json!({
        "message": "signed out"
    }))),
    tag = "Auth"
)]
pub async fn signout() -> HttpResponse {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "message": "signed out" }))
}
