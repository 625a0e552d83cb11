use crate::api::employee::{CreateEmployee, EmployeeQuery, PaginatedEmployeeResponse};
use crate::api::leave::{ApplyLeave, CreditBalance, LeaveFilter, SetLeaveStatus};
use crate::api::payroll::{GeneratePayroll, PaginatedPayrollResponse, PayrollQuery};
use crate::model::attendance::Attendance;
use crate::model::employee::Employee;
use crate::model::leave::{LeaveBalance, LeaveRequest};
use crate::model::payroll::Payroll;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

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
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Portal API",
        version = "1.0.0",
        description = r#"
## HR Portal

This API powers an HR portal covering the day-to-day operations of a company's
people function.

### 🔹 Key Features
- **Leave Management**
  - Apply for leave, approve/reject requests, cancel, track per-category balances
- **Employee Management**
  - Create, update, list, and deactivate employee profiles
- **Attendance Management**
  - Daily clock-in / clock-out with Present/Late classification
- **Payroll Management**
  - Generate monthly salary slips and view payroll records

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Only authorized roles such as **Admin** or **HR** can access sensitive operations.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::apply_leave,
        crate::api::leave::my_leaves,
        crate::api::leave::pending_leaves,
        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::set_leave_status,
        crate::api::leave::cancel_leave,
        crate::api::leave::my_balance,
        crate::api::leave::employee_balance,
        crate::api::leave::credit_balance,

        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::my_attendance,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::deactivate_employee,

        crate::api::payroll::generate_payroll,
        crate::api::payroll::my_slips,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls
    ),
    components(
        schemas(
            ApplyLeave,
            SetLeaveStatus,
            LeaveFilter,
            CreditBalance,
            LeaveRequest,
            LeaveBalance,
            Attendance,
            CreateEmployee,
            EmployeeQuery,
            Employee,
            PaginatedEmployeeResponse,
            GeneratePayroll,
            PayrollQuery,
            Payroll,
            PaginatedPayrollResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Employees", description = "Employee management APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
    )
)]
pub struct ApiDoc;
