use serde::{Deserialize, Serialize};
use strum::EnumIter;
use utoipa::ToSchema;

use super::{FieldKind, Resource, UpdateField};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Job {
    #[schema(example = "IT_PROG")]
    pub job_id: String,
    #[schema(example = "Programmer")]
    pub job_title: String,
    #[schema(example = 4000.0)]
    pub min_salary: Option<f64>,
    #[schema(example = 10000.0)]
    pub max_salary: Option<f64>,
}

#[derive(Debug, Clone, Copy, EnumIter)]
pub enum JobField {
    JobTitle,
    MinSalary,
    MaxSalary,
}

impl UpdateField for JobField {
    fn column(self) -> &'static str {
        match self {
            JobField::JobTitle => "job_title",
            JobField::MinSalary => "min_salary",
            JobField::MaxSalary => "max_salary",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            JobField::JobTitle => FieldKind::Text,
            JobField::MinSalary | JobField::MaxSalary => FieldKind::Decimal,
        }
    }
}

pub struct Jobs;

impl Resource for Jobs {
    type Row = Job;
    type Key = String;
    type Field = JobField;

    const NOUN: &'static str = "job";
    const TITLE: &'static str = "Job";
    const PARAM: &'static str = "jobId";
    const TABLE: &'static str = "jobs";
    const PRIMARY_KEY: &'static str = "job_id";
    const COLUMNS: &'static [&'static str] = &["job_id", "job_title", "min_salary", "max_salary"];

    fn key(row: &Job) -> String {
        row.job_id.clone()
    }
}
