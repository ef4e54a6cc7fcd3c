use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;
use utoipa::ToSchema;

use crate::api::resource::{self, Loaded, created, persist_new};
use crate::api::{lenient_f64, required};
use crate::config::Config;
use crate::error::ApiError;
use crate::model::Resource;
use crate::model::job::Jobs;
use crate::store::Store;
use crate::utils::db_utils::Insert;

const NEW_JOB_PROCEDURE: &str = "sp_new_job";

#[derive(Deserialize, ToSchema)]
pub struct CreateJob {
    #[serde(alias = "jobId")]
    #[schema(example = "IT_PROG")]
    pub job_id: Option<String>,
    #[serde(alias = "jobTitle")]
    #[schema(example = "Programmer")]
    pub job_title: Option<String>,
    #[serde(default, alias = "minSalary", deserialize_with = "lenient_f64")]
    #[schema(example = 4000.0)]
    pub min_salary: Option<f64>,
    #[serde(default, alias = "maxSalary", deserialize_with = "lenient_f64")]
    #[schema(example = 10000.0)]
    pub max_salary: Option<f64>,
}

/// Create Job
#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJob,
    responses(
        (status = 201, description = "Job created", body = Object, example = json!({
            "message": "Job created successfully.",
            "job_id": "IT_PROG"
        })),
        (status = 400, description = "Missing field or rule violation", body = Object, example = json!({
            "error": "Validation Error",
            "details": "Minimum salary cannot exceed maximum salary"
        })),
        (status = 409, description = "Job id already in use")
    ),
    tag = "Job"
)]
pub async fn create_job<S: Store>(
    store: web::Data<S>,
    config: web::Data<Config>,
    body: web::Json<CreateJob>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let job_id = required(body.job_id, "job_id")?;
    let job_title = required(body.job_title, "job_title")?;

    let insert = Insert::into_table(Jobs::TABLE)
        .value("job_id", job_id.clone())
        .value("job_title", job_title)
        .value("min_salary", body.min_salary)
        .value("max_salary", body.max_salary);

    let procedure = config.create_via_procedures.then_some(NEW_JOB_PROCEDURE);
    persist_new(store.get_ref(), insert, procedure)
        .await
        .map_err(|e| ApiError::storage("Could not create job", e))?;

    info!(job_id = %job_id, "Job created");
    Ok(created::<Jobs>(job_id))
}

/// List Jobs
#[utoipa::path(
    get,
    path = "/api/jobs",
    responses((status = 200, description = "All jobs ordered by id", body = [crate::model::job::Job])),
    tag = "Job"
)]
pub async fn list_jobs<S: Store>(store: web::Data<S>) -> Result<HttpResponse, ApiError> {
    resource::list::<Jobs, S>(store).await
}

/// Get Job
#[utoipa::path(
    get,
    path = "/api/jobs/{jobId}",
    params(("jobId" = String, Path, description = "Job id", example = "IT_PROG")),
    responses(
        (status = 200, description = "Job found", body = crate::model::job::Job),
        (status = 404, description = "Job not found")
    ),
    tag = "Job"
)]
pub async fn get_job<S: Store>(job: Loaded<Jobs, S>) -> HttpResponse {
    resource::read(job).await
}

/// Update Job
///
/// Only `job_title`, `min_salary` and `max_salary` are applied; the id is fixed.
#[utoipa::path(
    put,
    path = "/api/jobs/{jobId}",
    params(("jobId" = String, Path, description = "Job id")),
    request_body = Object,
    responses(
        (status = 200, description = "Updated job", body = crate::model::job::Job),
        (status = 400, description = "No valid fields provided for update."),
        (status = 404, description = "Job not found")
    ),
    tag = "Job"
)]
pub async fn update_job<S: Store>(
    store: web::Data<S>,
    job: Loaded<Jobs, S>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    resource::update(store, job, body).await
}

/// Delete Job
#[utoipa::path(
    delete,
    path = "/api/jobs/{jobId}",
    params(("jobId" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job deleted"),
        (status = 404, description = "Job not found")
    ),
    tag = "Job"
)]
pub async fn delete_job<S: Store>(
    store: web::Data<S>,
    job: Loaded<Jobs, S>,
) -> Result<HttpResponse, ApiError> {
    resource::remove(store, job).await
}

/// Delete All Jobs
#[utoipa::path(
    delete,
    path = "/api/jobs",
    responses((status = 200, description = "Jobs deleted", body = Object, example = json!({
        "message": "Successfully deleted 19 job(s)."
    }))),
    tag = "Job"
)]
pub async fn delete_all_jobs<S: Store>(store: web::Data<S>) -> Result<HttpResponse, ApiError> {
    resource::remove_all::<Jobs, S>(store).await
}

pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_jobs::<S>))
            .route(web::post().to(create_job::<S>))
            .route(web::delete().to(delete_all_jobs::<S>)),
    )
    .service(
        web::resource("/{jobId}")
            .route(web::get().to(get_job::<S>))
            .route(web::put().to(update_job::<S>))
            .route(web::delete().to(delete_job::<S>)),
    );
}
