use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, mysql::MySqlRow};
use strum_macros::EnumString;
use utoipa::ToSchema;

use crate::config::LeaveEntitlements;
use crate::error::HrError;

/// Canonical leave categories. The boundary accepts the short codes
/// (`CL`/`SL`/`PL`), the snake_case column names and the long display names,
/// all case-insensitive; everything maps onto the same three counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum LeaveCategory {
    #[strum(
        serialize = "casual_leave",
        serialize = "casual leave",
        serialize = "casual",
        serialize = "cl"
    )]
    Casual,
    #[strum(
        serialize = "sick_leave",
        serialize = "sick leave",
        serialize = "sick",
        serialize = "sl"
    )]
    Sick,
    #[strum(
        serialize = "paid_leave",
        serialize = "paid leave",
        serialize = "paid",
        serialize = "pl"
    )]
    Paid,
}

impl LeaveCategory {
    /// Canonical spelling, also the balance column name.
    pub fn column(&self) -> &'static str {
        match self {
            LeaveCategory::Casual => "casual_leave",
            LeaveCategory::Sick => "sick_leave",
            LeaveCategory::Paid => "paid_leave",
        }
    }
}

impl fmt::Display for LeaveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl TryFrom<String> for LeaveCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|_| format!("unknown leave category: {value}"))
    }
}

impl From<LeaveCategory> for String {
    fn from(value: LeaveCategory) -> Self {
        value.column().to_string()
    }
}

/// Lifecycle of one leave request. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "Pending",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Rejected => "Rejected",
            LeaveStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for LeaveStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|_| format!("unknown leave status: {value}"))
    }
}

impl From<LeaveStatus> for String {
    fn from(value: LeaveStatus) -> Self {
        value.as_str().to_string()
    }
}

/// Admin decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum LeaveDecision {
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[serde(rename = "leave_type")]
    #[schema(example = "casual_leave", value_type = String)]
    pub category: LeaveCategory,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = 3)]
    pub total_days: u32,
    #[schema(example = "family function")]
    pub reason: String,
    #[schema(example = "Pending", value_type = String)]
    pub status: LeaveStatus,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = Option<String>)]
    pub applied_at: Option<DateTime<Utc>>,
    #[schema(example = 1, value_type = Option<u64>)]
    pub approved_by: Option<u64>,
    #[schema(example = "enjoy", value_type = Option<String>)]
    pub admin_remarks: Option<String>,
}

impl FromRow<'_, MySqlRow> for LeaveRequest {
    fn from_row(row: &MySqlRow) -> Result<Self, sqlx::Error> {
        let category: String = row.try_get("leave_type")?;
        let status: String = row.try_get("status")?;

        Ok(LeaveRequest {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            category: category.parse().map_err(|e: strum::ParseError| {
                sqlx::Error::ColumnDecode {
                    index: "leave_type".into(),
                    source: Box::new(e),
                }
            })?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            total_days: row.try_get("total_days")?,
            reason: row.try_get("reason")?,
            status: status.parse().map_err(|e: strum::ParseError| {
                sqlx::Error::ColumnDecode {
                    index: "status".into(),
                    source: Box::new(e),
                }
            })?,
            applied_at: row.try_get("applied_at")?,
            approved_by: row.try_get("approved_by")?,
            admin_remarks: row.try_get("admin_remarks")?,
        })
    }
}

/// Validated submission, ready to persist as `Pending`.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub category: LeaveCategory,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: u32,
    pub reason: String,
}

/// Per-employee remaining leave days, one counter per category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct LeaveBalance {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 12)]
    pub casual_leave: u32,
    #[schema(example = 10)]
    pub sick_leave: u32,
    #[schema(example = 15)]
    pub paid_leave: u32,
}

impl LeaveBalance {
    pub fn with_defaults(employee_id: u64, defaults: LeaveEntitlements) -> Self {
        LeaveBalance {
            employee_id,
            casual_leave: defaults.casual,
            sick_leave: defaults.sick,
            paid_leave: defaults.paid,
        }
    }

    pub fn available(&self, category: LeaveCategory) -> u32 {
        match category {
            LeaveCategory::Casual => self.casual_leave,
            LeaveCategory::Sick => self.sick_leave,
            LeaveCategory::Paid => self.paid_leave,
        }
    }

    fn counter(&mut self, category: LeaveCategory) -> &mut u32 {
        match category {
            LeaveCategory::Casual => &mut self.casual_leave,
            LeaveCategory::Sick => &mut self.sick_leave,
            LeaveCategory::Paid => &mut self.paid_leave,
        }
    }

    /// Fails loudly instead of clamping at zero; a silent clamp would mask
    /// double-deduction bugs.
    pub fn deduct(&mut self, category: LeaveCategory, days: u32) -> Result<(), HrError> {
        let counter = self.counter(category);
        if days > *counter {
            return Err(HrError::InsufficientBalance {
                category,
                requested: days,
                available: *counter,
            });
        }
        *counter -= days;
        Ok(())
    }

    pub fn credit(&mut self, category: LeaveCategory, days: u32) {
        *self.counter(category) += days;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_accepts_all_vocabularies() {
        for raw in ["CL", "cl", "casual", "casual_leave", "Casual Leave"] {
            assert_eq!(raw.parse::<LeaveCategory>().unwrap(), LeaveCategory::Casual);
        }
        assert_eq!("SL".parse::<LeaveCategory>().unwrap(), LeaveCategory::Sick);
        assert_eq!("Paid Leave".parse::<LeaveCategory>().unwrap(), LeaveCategory::Paid);
        assert!("maternity".parse::<LeaveCategory>().is_err());
    }

    #[test]
    fn category_serializes_canonically() {
        let json = serde_json::to_string(&LeaveCategory::Sick).unwrap();
        assert_eq!(json, "\"sick_leave\"");
    }

    #[test]
    fn status_round_trips() {
        for s in ["Pending", "Approved", "Rejected", "Cancelled"] {
            assert_eq!(s.parse::<LeaveStatus>().unwrap().as_str(), s);
        }
        assert_eq!("pending".parse::<LeaveStatus>().unwrap(), LeaveStatus::Pending);
    }

    #[test]
    fn deduct_refuses_overdraft() {
        let mut bal = LeaveBalance::with_defaults(1, LeaveEntitlements::default());
        bal.deduct(LeaveCategory::Sick, 4).unwrap();
        assert_eq!(bal.sick_leave, 6);

        let err = bal.deduct(LeaveCategory::Sick, 7).unwrap_err();
        match err {
            HrError::InsufficientBalance {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 7);
                assert_eq!(available, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // untouched on failure
        assert_eq!(bal.sick_leave, 6);
    }

    #[test]
    fn credit_restores_days() {
        let mut bal = LeaveBalance::with_defaults(1, LeaveEntitlements::default());
        bal.deduct(LeaveCategory::Paid, 5).unwrap();
        bal.credit(LeaveCategory::Paid, 5);
        assert_eq!(bal.paid_leave, 15);
    }
}
