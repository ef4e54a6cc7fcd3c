use actix_web::{HttpResponse, web};
use chrono::Local;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;
use utoipa::ToSchema;

use crate::api::resource::{self, Loaded, created, persist_new};
use crate::api::{lenient_f64, lenient_u64, required};
use crate::config::Config;
use crate::error::ApiError;
use crate::model::employee::Employees;
use crate::model::{Resource, parse_date};
use crate::store::Store;
use crate::utils::db_utils::Insert;

const NEW_EMPLOYEE_PROCEDURE: &str = "sp_new_employee";

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[serde(default, alias = "employeeId", deserialize_with = "lenient_u64")]
    #[schema(example = 207)]
    pub employee_id: Option<u64>,
    #[serde(alias = "firstName")]
    #[schema(example = "Kevon")]
    pub first_name: Option<String>,
    #[serde(alias = "lastName")]
    #[schema(example = "Mitchell")]
    pub last_name: Option<String>,
    #[schema(example = "KMITCHELL")]
    pub email: Option<String>,
    #[serde(alias = "phoneNumber")]
    #[schema(example = "515.123.4444")]
    pub phone_number: Option<String>,
    /// Defaults to today.
    #[serde(alias = "hireDate")]
    #[schema(example = "2026-01-01", format = "date")]
    pub hire_date: Option<String>,
    #[serde(alias = "jobId")]
    #[schema(example = "IT_PROG")]
    pub job_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    #[schema(example = 6000.0)]
    pub salary: Option<f64>,
    #[serde(default, alias = "commissionPct", deserialize_with = "lenient_f64")]
    pub commission_pct: Option<f64>,
    #[serde(default, alias = "managerId", deserialize_with = "lenient_u64")]
    #[schema(example = 103)]
    pub manager_id: Option<u64>,
    #[serde(default, alias = "departmentId", deserialize_with = "lenient_u64")]
    #[schema(example = 60)]
    pub department_id: Option<u64>,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Object, example = json!({
            "message": "Employee created successfully.",
            "employee_id": 207
        })),
        (status = 400, description = "Missing field or rule violation", body = Object, example = json!({
            "error": "Validation Error",
            "details": "Salary is out of range for job IT_PROG"
        })),
        (status = 409, description = "Employee id or email already in use")
    ),
    tag = "Employee"
)]
pub async fn create_employee<S: Store>(
    store: web::Data<S>,
    config: web::Data<Config>,
    body: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let employee_id = body
        .employee_id
        .ok_or_else(|| ApiError::Validation("employee_id is required.".to_string()))?;
    let last_name = required(body.last_name, "last_name")?;
    let email = required(body.email, "email")?;
    let job_id = required(body.job_id, "job_id")?;

    let hire_date = match body.hire_date.as_deref().map(str::trim) {
        None | Some("") => Local::now().date_naive(),
        Some(raw) => parse_date(raw).ok_or_else(|| {
            ApiError::Validation("Invalid value for field 'hire_date'.".to_string())
        })?,
    };

    let insert = Insert::into_table(Employees::TABLE)
        .value("employee_id", employee_id)
        .value("first_name", body.first_name)
        .value("last_name", last_name)
        .value("email", email)
        .value("phone_number", body.phone_number)
        .value("hire_date", hire_date)
        .value("job_id", job_id)
        .value("salary", body.salary)
        .value("commission_pct", body.commission_pct)
        .value("manager_id", body.manager_id)
        .value("department_id", body.department_id);

    let procedure = config
        .create_via_procedures
        .then_some(NEW_EMPLOYEE_PROCEDURE);
    persist_new(store.get_ref(), insert, procedure)
        .await
        .map_err(|e| ApiError::storage("Could not create employee", e))?;

    info!(employee_id, "Employee created");
    Ok(created::<Employees>(employee_id))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/api/employees",
    responses((status = 200, description = "All employees ordered by id", body = [crate::model::employee::Employee])),
    tag = "Employee"
)]
pub async fn list_employees<S: Store>(store: web::Data<S>) -> Result<HttpResponse, ApiError> {
    resource::list::<Employees, S>(store).await
}

/// Get Employee
#[utoipa::path(
    get,
    path = "/api/employees/{employeeId}",
    params(("employeeId" = u64, Path, description = "Employee id", example = 103)),
    responses(
        (status = 200, description = "Employee found", body = crate::model::employee::Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee<S: Store>(employee: Loaded<Employees, S>) -> HttpResponse {
    resource::read(employee).await
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{employeeId}",
    params(("employeeId" = u64, Path, description = "Employee id")),
    request_body = Object,
    responses(
        (status = 200, description = "Updated employee", body = crate::model::employee::Employee),
        (status = 400, description = "No valid fields provided for update."),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn update_employee<S: Store>(
    store: web::Data<S>,
    employee: Loaded<Employees, S>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    resource::update(store, employee, body).await
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/employees/{employeeId}",
    params(("employeeId" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deleted"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn delete_employee<S: Store>(
    store: web::Data<S>,
    employee: Loaded<Employees, S>,
) -> Result<HttpResponse, ApiError> {
    resource::remove(store, employee).await
}

/// Delete All Employees
#[utoipa::path(
    delete,
    path = "/api/employees",
    responses((status = 200, description = "Employees deleted")),
    tag = "Employee"
)]
pub async fn delete_all_employees<S: Store>(
    store: web::Data<S>,
) -> Result<HttpResponse, ApiError> {
    resource::remove_all::<Employees, S>(store).await
}

pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_employees::<S>))
            .route(web::post().to(create_employee::<S>))
            .route(web::delete().to(delete_all_employees::<S>)),
    )
    .service(
        web::resource("/{employeeId}")
            .route(web::get().to(get_employee::<S>))
            .route(web::put().to(update_employee::<S>))
            .route(web::delete().to(delete_employee::<S>)),
    );
}
