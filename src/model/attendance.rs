use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:55:00", value_type = Option<String>)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "18:05:00", value_type = Option<String>)]
    pub check_out: Option<NaiveTime>,
    /// Present or Late, decided at clock-in against the configured work start
    #[schema(example = "Present")]
    pub status: String,
    #[schema(example = 8.17, value_type = Option<f64>)]
    pub total_hours: Option<f64>,
}

/// Clock-ins strictly after `work_start` count as late.
pub fn clock_in_status(check_in: NaiveTime, work_start: NaiveTime) -> &'static str {
    if check_in > work_start { "Late" } else { "Present" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        s.parse().unwrap()
    }

    #[test]
    fn on_time_is_present() {
        assert_eq!(clock_in_status(t("09:59:59"), t("10:00:00")), "Present");
        assert_eq!(clock_in_status(t("10:00:00"), t("10:00:00")), "Present");
    }

    #[test]
    fn after_work_start_is_late() {
        assert_eq!(clock_in_status(t("10:00:01"), t("10:00:00")), "Late");
    }
}
