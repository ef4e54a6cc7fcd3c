use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::EnumIter;
use utoipa::ToSchema;

use super::{FieldKind, Resource, UpdateField};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "employee_id": 103,
        "first_name": "Alexander",
        "last_name": "Hunold",
        "email": "AHUNOLD",
        "phone_number": "590.423.4567",
        "hire_date": "2006-01-03",
        "job_id": "IT_PROG",
        "salary": 9000.0,
        "commission_pct": null,
        "manager_id": 102,
        "department_id": 60
    })
)]
pub struct Employee {
    pub employee_id: u64,
    pub first_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    #[schema(value_type = String, format = "date")]
    pub hire_date: NaiveDate,
    pub job_id: String,
    pub salary: Option<f64>,
    pub commission_pct: Option<f64>,
    /// Another employee; `None` for the top of the hierarchy.
    pub manager_id: Option<u64>,
    pub department_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, EnumIter)]
pub enum EmployeeField {
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    HireDate,
    JobId,
    Salary,
    CommissionPct,
    ManagerId,
    DepartmentId,
}

impl UpdateField for EmployeeField {
    fn column(self) -> &'static str {
        match self {
            EmployeeField::FirstName => "first_name",
            EmployeeField::LastName => "last_name",
            EmployeeField::Email => "email",
            EmployeeField::PhoneNumber => "phone_number",
            EmployeeField::HireDate => "hire_date",
            EmployeeField::JobId => "job_id",
            EmployeeField::Salary => "salary",
            EmployeeField::CommissionPct => "commission_pct",
            EmployeeField::ManagerId => "manager_id",
            EmployeeField::DepartmentId => "department_id",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            EmployeeField::HireDate => FieldKind::Date,
            EmployeeField::Salary | EmployeeField::CommissionPct => FieldKind::Decimal,
            EmployeeField::ManagerId | EmployeeField::DepartmentId => FieldKind::Integer,
            _ => FieldKind::Text,
        }
    }
}

pub struct Employees;

impl Resource for Employees {
    type Row = Employee;
    type Key = u64;
    type Field = EmployeeField;

    const NOUN: &'static str = "employee";
    const TITLE: &'static str = "Employee";
    const PARAM: &'static str = "employeeId";
    const TABLE: &'static str = "employees";
    const PRIMARY_KEY: &'static str = "employee_id";
    const COLUMNS: &'static [&'static str] = &[
        "employee_id",
        "first_name",
        "last_name",
        "email",
        "phone_number",
        "hire_date",
        "job_id",
        "salary",
        "commission_pct",
        "manager_id",
        "department_id",
    ];

    fn key(row: &Employee) -> u64 {
        row.employee_id
    }
}
