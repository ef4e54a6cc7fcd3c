use crate::api::department::CreateDepartment;
use crate::api::employee::CreateEmployee;
use crate::api::job::CreateJob;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::job::Job;
use crate::model::user::User;
use crate::models::{RegisterReq, SigninReq};
use utoipa::Modify;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR API",
        version = "1.0.0",
        description = r#"
## HR Management API

Back end for a small HR administration tool over the classic
employees / jobs / departments schema.

### Resources
- **Employees**, **Jobs**, **Departments**
  - List, create, read, partially update, delete one, delete all
  - Jobs and employees are created through the `sp_new_job` /
    `sp_new_employee` stored procedures, which enforce business rules
- **Users**
  - Admin-only listing; owners or admins may update or delete an account

### Security
Sign in at `/api/signin` to receive a JWT. Send it as
`Authorization: Bearer <token>` or let the browser return the `t` cookie.
HR resources are public unless the server runs with `HR_ROUTES_REQUIRE_AUTH=true`.

### Errors
Every error body is JSON with an `error` key. Business-rule violations from
stored procedures answer 400 with `{"error": "Validation Error", "details": ...}`.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::signin,
        crate::auth::handlers::signout,

        crate::api::user::create_user,
        crate::api::user::list_users,
        crate::api::user::get_user,
        crate::api::user::update_user,
        crate::api::user::delete_user,
        crate::api::user::delete_all_users,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::delete_all_employees,

        crate::api::job::create_job,
        crate::api::job::list_jobs,
        crate::api::job::get_job,
        crate::api::job::update_job,
        crate::api::job::delete_job,
        crate::api::job::delete_all_jobs,

        crate::api::department::create_department,
        crate::api::department::list_departments,
        crate::api::department::get_department,
        crate::api::department::update_department,
        crate::api::department::delete_department,
        crate::api::department::delete_all_departments
    ),
    components(
        schemas(
            RegisterReq,
            SigninReq,
            User,
            Employee,
            CreateEmployee,
            Job,
            CreateJob,
            Department,
            CreateDepartment
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, sign-in and sign-out"),
        (name = "User", description = "User account administration"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Job", description = "Job management APIs"),
        (name = "Department", description = "Department management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("t"))),
        );
    }
}
