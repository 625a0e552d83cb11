use crate::error::HrError;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// Authenticated caller, decoded once by the auth middleware and picked up
/// here from the request extensions.
#[derive(Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Missing token")),
        )
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), HrError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(HrError::Forbidden("Admin only".into()))
        }
    }

    pub fn require_hr_or_admin(&self) -> Result<(), HrError> {
        if matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(HrError::Forbidden("HR/Admin only".into()))
        }
    }

    /// The linked employee id; employee-facing endpoints refuse accounts
    /// without an employee profile.
    pub fn employee_id(&self) -> Result<u64, HrError> {
        self.employee_id
            .ok_or_else(|| HrError::Forbidden("No employee profile".into()))
    }
}
