use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payroll {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    /// Salary month, `YYYY-MM`
    #[schema(example = "2026-01")]
    pub month: String,
    #[schema(example = 50000.0)]
    pub basic_salary: f64,
    #[schema(example = 8000.0)]
    pub allowances: f64,
    #[schema(example = 5000.0)]
    pub bonus: f64,
    #[schema(example = 10.0)]
    pub overtime_hours: f64,
    #[schema(example = 2500.0)]
    pub overtime_amount: f64,
    #[schema(example = 2000.0)]
    pub deductions: f64,
    #[schema(example = 65500.0)]
    pub gross_salary: f64,
    #[schema(example = 63500.0)]
    pub net_salary: f64,
}

/// Inputs of one salary slip; gross and net are derived, never supplied.
#[derive(Debug, Clone, Copy)]
pub struct SalaryBreakdown {
    pub basic_salary: f64,
    pub allowances: f64,
    pub bonus: f64,
    pub overtime_hours: f64,
    pub overtime_rate: f64,
    pub deductions: f64,
}

impl SalaryBreakdown {
    pub fn overtime_amount(&self) -> f64 {
        self.overtime_hours * self.overtime_rate
    }

    pub fn gross(&self) -> f64 {
        self.basic_salary + self.allowances + self.bonus + self.overtime_amount()
    }

    pub fn net(&self) -> f64 {
        self.gross() - self.deductions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_is_gross_minus_deductions() {
        let slip = SalaryBreakdown {
            basic_salary: 50_000.0,
            allowances: 8_000.0,
            bonus: 5_000.0,
            overtime_hours: 10.0,
            overtime_rate: 250.0,
            deductions: 2_000.0,
        };
        assert_eq!(slip.overtime_amount(), 2_500.0);
        assert_eq!(slip.gross(), 65_500.0);
        assert_eq!(slip.net(), 63_500.0);
    }

    #[test]
    fn zero_overtime_contributes_nothing() {
        let slip = SalaryBreakdown {
            basic_salary: 30_000.0,
            allowances: 0.0,
            bonus: 0.0,
            overtime_hours: 0.0,
            overtime_rate: 300.0,
            deductions: 0.0,
        };
        assert_eq!(slip.gross(), 30_000.0);
        assert_eq!(slip.net(), 30_000.0);
    }
}
