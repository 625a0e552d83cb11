use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::HrError;
use crate::model::payroll::{Payroll, SalaryBreakdown};

#[derive(Deserialize, ToSchema)]
pub struct GeneratePayroll {
    #[schema(example = 1000)]
    pub employee_id: u64,

    /// Salary month, `YYYY-MM`
    #[schema(example = "2026-01")]
    pub month: String,

    #[schema(example = 50000.0)]
    pub basic_salary: f64,

    #[schema(example = 8000.0)]
    pub allowances: Option<f64>,

    #[schema(example = 5000.0)]
    pub bonus: Option<f64>,

    #[schema(example = 10.0)]
    pub overtime_hours: Option<f64>,

    #[schema(example = 250.0)]
    pub overtime_rate: Option<f64>,

    #[schema(example = 2000.0)]
    pub deductions: Option<f64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedPayrollResponse {
    pub data: Vec<Payroll>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

fn validate_month(month: &str) -> Result<(), HrError> {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| HrError::Validation(format!("month must be YYYY-MM, got: {month}")))
}

/// Generate a salary slip, one per employee per month (Admin)
#[utoipa::path(
    post,
    path = "/api/v1/payroll/generate",
    request_body = GeneratePayroll,
    responses(
        (status = 201, description = "Salary slip created", body = Payroll),
        (status = 400, description = "Validation failed, or slip already exists for the month"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<GeneratePayroll>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let payload = payload.into_inner();

    validate_month(&payload.month)?;
    if payload.basic_salary <= 0.0 {
        return Err(HrError::Validation("basic_salary must be positive".into()).into());
    }

    let employee_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)")
            .bind(payload.employee_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(HrError::Storage)?;
    if !employee_exists {
        return Err(HrError::NotFound("employee").into());
    }

    let breakdown = SalaryBreakdown {
        basic_salary: payload.basic_salary,
        allowances: payload.allowances.unwrap_or(0.0),
        bonus: payload.bonus.unwrap_or(0.0),
        overtime_hours: payload.overtime_hours.unwrap_or(0.0),
        overtime_rate: payload.overtime_rate.unwrap_or(0.0),
        deductions: payload.deductions.unwrap_or(0.0),
    };

    let result = sqlx::query(
        "INSERT INTO payroll \
         (employee_id, month, basic_salary, allowances, bonus, overtime_hours, overtime_amount, \
          deductions, gross_salary, net_salary) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(payload.employee_id)
    .bind(&payload.month)
    .bind(breakdown.basic_salary)
    .bind(breakdown.allowances)
    .bind(breakdown.bonus)
    .bind(breakdown.overtime_hours)
    .bind(breakdown.overtime_amount())
    .bind(breakdown.deductions)
    .bind(breakdown.gross())
    .bind(breakdown.net())
    .execute(pool.get_ref())
    .await;

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            // unique (employee_id, month) key
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(HrError::Validation(format!(
                        "salary slip already exists for {}",
                        payload.month
                    ))
                    .into());
                }
            }
            return Err(HrError::Storage(e).into());
        }
    };

    let slip = sqlx::query_as::<_, Payroll>("SELECT * FROM payroll WHERE id = ?")
        .bind(result.last_insert_id())
        .fetch_one(pool.get_ref())
        .await
        .map_err(HrError::Storage)?;

    Ok(HttpResponse::Created().json(slip))
}

/// Own salary slips, most recent month first
#[utoipa::path(
    get,
    path = "/api/v1/payroll/my-slips",
    responses(
        (status = 200, description = "Own salary slips", body = [Payroll]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn my_slips(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    let slips = sqlx::query_as::<_, Payroll>(
        "SELECT * FROM payroll WHERE employee_id = ? ORDER BY month DESC",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(HrError::Storage)?;

    Ok(HttpResponse::Ok().json(slips))
}

/// Paginated payroll listing (Admin)
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Paginated payroll records", body = PaginatedPayrollResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let (count_sql, data_sql) = match query.employee_id {
        Some(_) => (
            "SELECT COUNT(*) FROM payroll WHERE employee_id = ?",
            "SELECT * FROM payroll WHERE employee_id = ? \
             ORDER BY month DESC, id DESC LIMIT ? OFFSET ?",
        ),
        None => (
            "SELECT COUNT(*) FROM payroll",
            "SELECT * FROM payroll ORDER BY month DESC, id DESC LIMIT ? OFFSET ?",
        ),
    };

    let mut count_q = sqlx::query_scalar::<_, i64>(count_sql);
    let mut data_q = sqlx::query_as::<_, Payroll>(data_sql);
    if let Some(emp_id) = query.employee_id {
        count_q = count_q.bind(emp_id);
        data_q = data_q.bind(emp_id);
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

    Ok(HttpResponse::Ok().json(PaginatedPayrollResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Fetch one salary slip (owner or Admin)
#[utoipa::path(
    get,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id" = u64, Path, description = "Payroll ID")),
    responses(
        (status = 200, description = "Salary slip", body = Payroll),
        (status = 404, description = "Payroll not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let payroll_id = path.into_inner();

    let slip = sqlx::query_as::<_, Payroll>("SELECT * FROM payroll WHERE id = ?")
        .bind(payroll_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(HrError::Storage)?
        .ok_or(HrError::NotFound("payroll record"))?;

    if auth.require_admin().is_err() && Some(slip.employee_id) != auth.employee_id {
        return Err(HrError::Forbidden("you can only view your own salary slips".into()).into());
    }

    Ok(HttpResponse::Ok().json(slip))
}
