use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::HrError;
use crate::leave::AppWorkflow;
use crate::leave::workflow::LeaveApplication;
use crate::model::leave::{LeaveCategory, LeaveDecision, LeaveStatus};

#[derive(Deserialize, ToSchema)]
pub struct ApplyLeave {
    /// Accepts `casual_leave`/`sick_leave`/`paid_leave`, the short codes
    /// `CL`/`SL`/`PL` and the long display names.
    #[schema(example = "casual_leave")]
    pub leave_type: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "family function")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SetLeaveStatus {
    #[schema(example = "Approved", value_type = String)]
    pub status: LeaveDecision,
    #[schema(example = "enjoy")]
    pub remarks: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by leave status
    #[schema(example = "Pending")]
    pub status: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreditBalance {
    #[schema(example = "sick_leave")]
    pub leave_type: String,
    #[schema(example = 2)]
    pub days: u32,
}

fn parse_category(raw: &str) -> Result<LeaveCategory, HrError> {
    raw.parse()
        .map_err(|_| HrError::Validation(format!("unknown leave category: {raw}")))
}

/// Submit a leave application
#[utoipa::path(
    post,
    path = "/api/v1/leave/apply",
    request_body = ApplyLeave,
    responses(
        (status = 201, description = "Leave request submitted", body = crate::model::leave::LeaveRequest),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Insufficient balance"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    payload: web::Json<ApplyLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let payload = payload.into_inner();

    let request = workflow
        .submit(
            employee_id,
            LeaveApplication {
                category: parse_category(&payload.leave_type)?,
                start_date: payload.start_date,
                end_date: payload.end_date,
                reason: payload.reason,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(request))
}

/// List own leave applications
#[utoipa::path(
    get,
    path = "/api/v1/leave/my",
    responses(
        (status = 200, description = "Own leave requests", body = [crate::model::leave::LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let leaves = workflow.my_leaves(employee_id).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// Pending queue (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/leave/pending",
    responses(
        (status = 200, description = "Pending leave requests", body = [crate::model::leave::LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn pending_leaves(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let leaves = workflow.pending().await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// All leave applications, optionally filtered by status (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Leave requests", body = [crate::model::leave::LeaveRequest]),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let status = match query.status.as_deref() {
        Some(raw) => Some(raw.parse::<LeaveStatus>().map_err(|_| {
            HrError::Validation(format!("unknown leave status: {raw}"))
        })?),
        None => None,
    };

    let leaves = workflow.list(status).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// Fetch one leave application (owner or HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(("leave_id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave request found", body = crate::model::leave::LeaveRequest),
        (status = 404, description = "Leave request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let request = workflow.get(path.into_inner()).await?;

    if auth.require_hr_or_admin().is_err() && Some(request.employee_id) != auth.employee_id {
        return Err(HrError::Forbidden(
            "you can only view your own leave requests".into(),
        )
        .into());
    }

    Ok(HttpResponse::Ok().json(request))
}

/// Approve or reject a pending application (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/status",
    params(("leave_id" = u64, Path, description = "Leave request id")),
    request_body = SetLeaveStatus,
    responses(
        (status = 200, description = "Decision applied", body = crate::model::leave::LeaveRequest),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Not pending, or insufficient balance"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn set_leave_status(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
    payload: web::Json<SetLeaveStatus>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let payload = payload.into_inner();

    let request = workflow
        .set_status(path.into_inner(), payload.status, auth.user_id, payload.remarks)
        .await?;

    Ok(HttpResponse::Ok().json(request))
}

/// Cancel an own Pending or Approved application
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/cancel",
    params(("leave_id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave cancelled", body = crate::model::leave::LeaveRequest),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request already decided"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let request = workflow.cancel(path.into_inner(), employee_id).await?;
    Ok(HttpResponse::Ok().json(request))
}

/// Own leave balance, lazily seeded with the default entitlements
#[utoipa::path(
    get,
    path = "/api/v1/leave/balance",
    responses(
        (status = 200, description = "Remaining leave days", body = crate::model::leave::LeaveBalance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_balance(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let balance = workflow.balance(employee_id).await?;
    Ok(HttpResponse::Ok().json(balance))
}

/// Any employee's balance (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/leave/balance/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Remaining leave days", body = crate::model::leave::LeaveBalance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn employee_balance(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let balance = workflow.balance(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(balance))
}

/// Administrative balance correction (Admin)
#[utoipa::path(
    post,
    path = "/api/v1/leave/balance/{employee_id}/credit",
    params(("employee_id" = u64, Path, description = "Employee id")),
    request_body = CreditBalance,
    responses(
        (status = 200, description = "Updated balance", body = crate::model::leave::LeaveBalance),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn credit_balance(
    auth: AuthUser,
    workflow: web::Data<AppWorkflow>,
    path: web::Path<u64>,
    payload: web::Json<CreditBalance>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let payload = payload.into_inner();
    let category = parse_category(&payload.leave_type)?;

    let balance = workflow
        .credit(path.into_inner(), category, payload.days)
        .await?;
    Ok(HttpResponse::Ok().json(balance))
}
