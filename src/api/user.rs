use actix_web::{HttpResponse, middleware::from_fn, web};
use serde_json::{Map, Value};
use tracing::info;

use crate::api::resource::{self, Loaded, apply_update, collect_changes, delete_row, no_fields};
use crate::auth::auth::{AuthUser, Authorized};
use crate::auth::middleware::require_admin;
use crate::auth::password::hash_password_off_thread;
use crate::error::ApiError;
use crate::model::user::{UserField, Users};
use crate::model::{Resource, UpdateField};
use crate::store::Store;
use crate::utils::db_utils::{PartialUpdate, SqlValue};

/// Users are only created through registration.
#[utoipa::path(
    post,
    path = "/api/users",
    responses((status = 405, description = "Not supported", body = Object, example = json!({
        "error": "Use the /api/register endpoint for user creation."
    }))),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn create_user() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed(
        "Use the /api/register endpoint for user creation.".to_string(),
    ))
}

/// List Users (admin)
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [crate::model::user::User]),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin")
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn list_users<S: Store>(store: web::Data<S>) -> Result<HttpResponse, ApiError> {
    resource::list::<Users, S>(store).await
}

/// Get User
#[utoipa::path(
    get,
    path = "/api/users/{userId}",
    params(("userId" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = crate::model::user::User),
        (status = 404, description = "User not found")
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn get_user<S: Store>(user: Loaded<Users, S>) -> HttpResponse {
    resource::read(user).await
}

/// Update User
///
/// Accepts `username`, `email` and `password`; the owner or an admin only.
#[utoipa::path(
    put,
    path = "/api/users/{userId}",
    params(("userId" = u64, Path, description = "User id")),
    request_body = Object,
    responses(
        (status = 200, description = "Updated user", body = crate::model::user::User),
        (status = 400, description = "No valid fields provided for update."),
        (status = 403, description = "User is not authorized"),
        (status = 404, description = "User not found")
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn update_user<S: Store>(
    store: web::Data<S>,
    auth: AuthUser,
    user: Authorized<Users, S>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    let changes = collect_changes::<UserField>(&body)?;

    let password = match body.get("password") {
        None | Some(Value::Null) => None,
        Some(Value::String(p)) if !p.is_empty() => Some(p.clone()),
        Some(_) => {
            return Err(ApiError::Validation(
                "Invalid value for field 'password'.".to_string(),
            ));
        }
    };

    let mut update = PartialUpdate::new(Users::TABLE, Users::PRIMARY_KEY, user.row.user_id);
    for (field, value) in changes {
        update.set(field.column(), value);
    }
    if let Some(password) = password {
        let hash = hash_password_off_thread(password).await?;
        update.set("password_hash", SqlValue::String(hash));
    }
    if !update.has_changes() {
        return Err(no_fields());
    }
    update.touch("updated_at");

    let row = apply_update::<Users, S>(store.get_ref(), update).await?;
    info!(user_id = row.user_id, by = auth.user_id, "User updated");

    Ok(HttpResponse::Ok().json(row))
}

/// Delete User
#[utoipa::path(
    delete,
    path = "/api/users/{userId}",
    params(("userId" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "User is not authorized"),
        (status = 404, description = "User not found")
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn delete_user<S: Store>(
    store: web::Data<S>,
    user: Authorized<Users, S>,
) -> Result<HttpResponse, ApiError> {
    delete_row::<Users, S>(store.get_ref(), user.row.user_id).await
}

/// Delete All Users (admin)
#[utoipa::path(
    delete,
    path = "/api/users",
    responses((status = 200, description = "Users deleted")),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn delete_all_users<S: Store>(store: web::Data<S>) -> Result<HttpResponse, ApiError> {
    resource::remove_all::<Users, S>(store).await
}

/// Routes under `/api/users`; the enclosing scope must require sign-in.
pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .wrap(from_fn(require_admin))
            .route(web::get().to(list_users::<S>))
            .route(web::post().to(create_user))
            .route(web::delete().to(delete_all_users::<S>)),
    )
    .service(
        web::resource("/{userId}")
            .route(web::get().to(get_user::<S>))
            .route(web::put().to(update_user::<S>))
            .route(web::delete().to(delete_user::<S>)),
    );
}
