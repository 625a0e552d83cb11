use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::HrError;
use crate::model::attendance::{Attendance, clock_in_status};
use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use sqlx::MySqlPool;

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-in",
    responses(
        (status = 200, description = "Clocked in", body = Object, example = json!({
            "message": "Clocked in as Present",
            "status": "Present"
        })),
        (status = 400, description = "Already clocked in today"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    let now = Local::now().time();
    let status = clock_in_status(now, config.work_start);

    let result = sqlx::query(
        "INSERT INTO attendance (employee_id, date, check_in, status) VALUES (?, CURDATE(), ?, ?)",
    )
    .bind(employee_id)
    .bind(now)
    .bind(status)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": format!("Clocked in as {status}"),
            "status": status
        }))),

        Err(e) => {
            // unique (employee_id, date) key: duplicate clock-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Already clocked in today"
                    })));
                }
            }

            tracing::error!(error = %e, employee_id, "Clock-in failed");
            Err(HrError::Storage(e).into())
        }
    }
}

/// Clock-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance/clock-out",
    responses(
        (status = 200, description = "Clocked out", body = Object, example = json!({
            "message": "Clocked out successfully"
        })),
        (status = 400, description = "No active clock-in found for today"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    let now = Local::now().time();

    let result = sqlx::query(
        "UPDATE attendance \
         SET check_out = ?, \
             total_hours = ROUND(TIME_TO_SEC(TIMEDIFF(?, check_in)) / 3600, 2) \
         WHERE employee_id = ? AND date = CURDATE() AND check_out IS NULL",
    )
    .bind(now)
    .bind(now)
    .bind(employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(HrError::Storage)?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No active clock-in found for today"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Clocked out successfully"
    })))
}

/// Own attendance history, most recent first
#[utoipa::path(
    get,
    path = "/api/v1/attendance/my",
    responses(
        (status = 200, description = "Recent attendance records", body = [Attendance]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    let records = sqlx::query_as::<_, Attendance>(
        "SELECT id, employee_id, date, check_in, check_out, status, total_hours \
         FROM attendance WHERE employee_id = ? \
         ORDER BY date DESC LIMIT 31",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(HrError::Storage)?;

    Ok(HttpResponse::Ok().json(records))
}
