use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;
use utoipa::ToSchema;

use crate::api::resource::{self, Loaded, created};
use crate::api::{lenient_u64, required};
use crate::error::ApiError;
use crate::model::Resource;
use crate::model::department::Departments;
use crate::store::Store;
use crate::utils::db_utils::Insert;

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[serde(default, alias = "departmentId", deserialize_with = "lenient_u64")]
    #[schema(example = 280)]
    pub department_id: Option<u64>,
    #[serde(alias = "departmentName")]
    #[schema(example = "Research")]
    pub department_name: Option<String>,
    #[serde(default, alias = "managerId", deserialize_with = "lenient_u64")]
    pub manager_id: Option<u64>,
    #[serde(default, alias = "locationId", deserialize_with = "lenient_u64")]
    #[schema(example = 1700)]
    pub location_id: Option<u64>,
}

/// Create Department
#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Object, example = json!({
            "message": "Department created successfully.",
            "department_id": 280
        })),
        (status = 400, description = "Missing field"),
        (status = 409, description = "Department id already in use")
    ),
    tag = "Department"
)]
pub async fn create_department<S: Store>(
    store: web::Data<S>,
    body: web::Json<CreateDepartment>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let department_id = body
        .department_id
        .ok_or_else(|| ApiError::Validation("department_id is required.".to_string()))?;
    let department_name = required(body.department_name, "department_name")?;

    let insert = Insert::into_table(Departments::TABLE)
        .value("department_id", department_id)
        .value("department_name", department_name)
        .value("manager_id", body.manager_id)
        .value("location_id", body.location_id);

    store
        .insert(&insert)
        .await
        .map_err(|e| ApiError::storage("Could not create department", e))?;

    info!(department_id, "Department created");
    Ok(created::<Departments>(department_id))
}

/// List Departments
#[utoipa::path(
    get,
    path = "/api/departments",
    responses((status = 200, description = "All departments ordered by id", body = [crate::model::department::Department])),
    tag = "Department"
)]
pub async fn list_departments<S: Store>(store: web::Data<S>) -> Result<HttpResponse, ApiError> {
    resource::list::<Departments, S>(store).await
}

/// Get Department
#[utoipa::path(
    get,
    path = "/api/departments/{departmentId}",
    params(("departmentId" = u64, Path, description = "Department id", example = 60)),
    responses(
        (status = 200, description = "Department found", body = crate::model::department::Department),
        (status = 404, description = "Department not found")
    ),
    tag = "Department"
)]
pub async fn get_department<S: Store>(department: Loaded<Departments, S>) -> HttpResponse {
    resource::read(department).await
}

/// Update Department
#[utoipa::path(
    put,
    path = "/api/departments/{departmentId}",
    params(("departmentId" = u64, Path, description = "Department id")),
    request_body = Object,
    responses(
        (status = 200, description = "Updated department", body = crate::model::department::Department),
        (status = 400, description = "No valid fields provided for update."),
        (status = 404, description = "Department not found")
    ),
    tag = "Department"
)]
pub async fn update_department<S: Store>(
    store: web::Data<S>,
    department: Loaded<Departments, S>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    resource::update(store, department, body).await
}

/// Delete Department
#[utoipa::path(
    delete,
    path = "/api/departments/{departmentId}",
    params(("departmentId" = u64, Path, description = "Department id")),
    responses(
        (status = 200, description = "Department deleted"),
        (status = 404, description = "Department not found")
    ),
    tag = "Department"
)]
pub async fn delete_department<S: Store>(
    store: web::Data<S>,
    department: Loaded<Departments, S>,
) -> Result<HttpResponse, ApiError> {
    resource::remove(store, department).await
}

/// Delete All Departments
#[utoipa::path(
    delete,
    path = "/api/departments",
    responses((status = 200, description = "Departments deleted")),
    tag = "Department"
)]
pub async fn delete_all_departments<S: Store>(
    store: web::Data<S>,
) -> Result<HttpResponse, ApiError> {
    resource::remove_all::<Departments, S>(store).await
}

pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_departments::<S>))
            .route(web::post().to(create_department::<S>))
            .route(web::delete().to(delete_all_departments::<S>)),
    )
    .service(
        web::resource("/{departmentId}")
            .route(web::get().to(get_department::<S>))
            .route(web::put().to(update_department::<S>))
            .route(web::delete().to(delete_department::<S>)),
    );
}
