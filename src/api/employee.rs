use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::HrError;
use crate::model::employee::Employee;
use crate::utils::db_utils::{build_update_sql, execute_update};

/// Columns an update may touch; everything else is rejected.
const EMPLOYEE_UPDATE_COLS: &[&str] = &[
    "employee_code",
    "name",
    "email",
    "phone",
    "department",
    "designation",
    "join_date",
    "is_active",
];

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "Jane Doe")]
    pub name: String,

    #[schema(example = "jane.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678")]
    pub phone: Option<String>,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = "Software Engineer")]
    pub designation: String,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub join_date: NaiveDate,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    #[schema(example = "Engineering")]
    pub department: Option<String>,

    /// Filter on the active flag; omit to list everyone
    #[schema(example = true)]
    pub is_active: Option<bool>,

    /// Substring match on name or email
    #[schema(example = "jane")]
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedEmployeeResponse {
    pub data: Vec<Employee>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Create an employee record (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Validation failed, or duplicate employee code/email"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let payload = payload.into_inner();

    let name = payload.name.trim();
    let email = payload.email.trim().to_lowercase();
    let employee_code = payload.employee_code.trim();

    if name.is_empty() || employee_code.is_empty() {
        return Err(HrError::Validation("name and employee_code are required".into()).into());
    }
    if !email.contains('@') {
        return Err(HrError::Validation("invalid email address".into()).into());
    }

    let result = sqlx::query(
        "INSERT INTO employees \
         (employee_code, name, email, phone, department, designation, join_date, is_active) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 1)",
    )
    .bind(employee_code)
    .bind(name)
    .bind(&email)
    .bind(&payload.phone)
    .bind(&payload.department)
    .bind(&payload.designation)
    .bind(payload.join_date)
    .execute(pool.get_ref())
    .await;

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            // unique employee_code / email keys
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(HrError::Validation(
                        "employee code or email already exists".into(),
                    )
                    .into());
                }
            }
            return Err(HrError::Storage(e).into());
        }
    };

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(result.last_insert_id())
        .fetch_one(pool.get_ref())
        .await
        .map_err(HrError::Storage)?;

    tracing::info!(employee_id = employee.id, "Employee created");
    Ok(HttpResponse::Created().json(employee))
}

/// Paginated employee listing with optional filters (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee records", body = PaginatedEmployeeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // WHERE clause is assembled from fixed fragments; user input only ever
    // travels through binds.
    let mut conditions: Vec<&str> = Vec::new();
    if query.department.is_some() {
        conditions.push("department = ?");
    }
    if query.is_active.is_some() {
        conditions.push("is_active = ?");
    }
    if query.search.is_some() {
        conditions.push("(name LIKE ? OR email LIKE ?)");
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM employees{where_clause}");
    let data_sql = format!(
        "SELECT * FROM employees{where_clause} ORDER BY employee_code LIMIT ? OFFSET ?"
    );

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);

    if let Some(department) = &query.department {
        count_q = count_q.bind(department);
        data_q = data_q.bind(department);
    }
    if let Some(is_active) = query.is_active {
        count_q = count_q.bind(is_active);
        data_q = data_q.bind(is_active);
    }
    if let Some(search) = &query.search {
        let pattern = format!("%{}%", search.trim());
        count_q = count_q.bind(pattern.clone()).bind(pattern.clone());
        data_q = data_q.bind(pattern.clone()).bind(pattern);
    }

    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(HrError::Storage)?;

    let data = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(HrError::Storage)?;

    Ok(HttpResponse::Ok().json(PaginatedEmployeeResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Fetch one employee (HR/Admin, or the employee's own record)
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee record", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    if auth.require_hr_or_admin().is_err() && auth.employee_id != Some(employee_id) {
        return Err(HrError::Forbidden("you can only view your own profile".into()).into());
    }

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(HrError::Storage)?
        .ok_or(HrError::NotFound("employee"))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Partial update of an employee record (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let update = build_update_sql(
        "employees",
        &payload,
        EMPLOYEE_UPDATE_COLS,
        "id",
        employee_id,
    )?;

    let rows = execute_update(pool.get_ref(), update)
        .await
        .map_err(HrError::Storage)?;

    if rows == 0 {
        return Err(HrError::NotFound("employee").into());
    }

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(HrError::Storage)?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Deactivate an employee; the record is kept for history (HR/Admin)
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deactivated"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn deactivate_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let result = sqlx::query("UPDATE employees SET is_active = 0 WHERE id = ? AND is_active = 1")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(HrError::Storage)?;

    if result.rows_affected() == 0 {
        return Err(HrError::NotFound("active employee").into());
    }

    tracing::info!(employee_id, "Employee deactivated");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Employee deactivated"
    })))
}
