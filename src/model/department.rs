use serde::{Deserialize, Serialize};
use strum::EnumIter;
use utoipa::ToSchema;

use super::{FieldKind, Resource, UpdateField};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    #[schema(example = 60)]
    pub department_id: u64,
    #[schema(example = "IT")]
    pub department_name: String,
    #[schema(example = 103)]
    pub manager_id: Option<u64>,
    #[schema(example = 1400)]
    pub location_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, EnumIter)]
pub enum DepartmentField {
    DepartmentName,
    ManagerId,
    LocationId,
}

impl UpdateField for DepartmentField {
    fn column(self) -> &'static str {
        match self {
            DepartmentField::DepartmentName => "department_name",
            DepartmentField::ManagerId => "manager_id",
            DepartmentField::LocationId => "location_id",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            DepartmentField::DepartmentName => FieldKind::Text,
            DepartmentField::ManagerId | DepartmentField::LocationId => FieldKind::Integer,
        }
    }
}

pub struct Departments;

impl Resource for Departments {
    type Row = Department;
    type Key = u64;
    type Field = DepartmentField;

    const NOUN: &'static str = "department";
    const TITLE: &'static str = "Department";
    const PARAM: &'static str = "departmentId";
    const TABLE: &'static str = "departments";
    const PRIMARY_KEY: &'static str = "department_id";
    const COLUMNS: &'static [&'static str] =
        &["department_id", "department_name", "manager_id", "location_id"];

    fn key(row: &Department) -> u64 {
        row.department_id
    }
}
