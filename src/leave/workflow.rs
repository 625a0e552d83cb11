use chrono::NaiveDate;
use tracing::info;

use crate::error::HrError;
use crate::leave::store::LeaveStore;
use crate::model::leave::{
    LeaveBalance, LeaveCategory, LeaveDecision, LeaveRequest, LeaveStatus, NewLeaveRequest,
};

/// Requested leave span, both endpoints inclusive.
#[derive(Debug, Clone)]
pub struct LeaveApplication {
    pub category: LeaveCategory,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

/// State machine over leave requests. Validation and the submission-time
/// balance gate live here; the store provides the atomic transitions.
#[derive(Clone)]
pub struct LeaveWorkflow<S> {
    store: S,
}

impl<S: LeaveStore> LeaveWorkflow<S> {
    pub fn new(store: S) -> Self {
        LeaveWorkflow { store }
    }

    /// Inclusive day count of the span.
    fn total_days(start: NaiveDate, end: NaiveDate) -> u32 {
        ((end - start).num_days() + 1) as u32
    }

    /// Validates the application, checks (without reserving) the balance and
    /// persists a Pending request.
    pub async fn submit(
        &self,
        employee_id: u64,
        application: LeaveApplication,
    ) -> Result<LeaveRequest, HrError> {
        let reason = application.reason.trim();
        if reason.is_empty() {
            return Err(HrError::Validation("reason must not be empty".into()));
        }
        if application.end_date < application.start_date {
            return Err(HrError::Validation(
                "end_date cannot be before start_date".into(),
            ));
        }

        let total_days = Self::total_days(application.start_date, application.end_date);

        let balance = self.store.balance(employee_id).await?;
        let available = balance.available(application.category);
        if available < total_days {
            return Err(HrError::InsufficientBalance {
                category: application.category,
                requested: total_days,
                available,
            });
        }

        let request = self
            .store
            .insert(NewLeaveRequest {
                employee_id,
                category: application.category,
                start_date: application.start_date,
                end_date: application.end_date,
                total_days,
                reason: reason.to_string(),
            })
            .await?;

        info!(
            event = "leave_submitted",
            request_id = request.id,
            employee_id,
            category = %request.category,
            total_days,
            "leave request submitted"
        );
        Ok(request)
    }

    /// Admin decision on a pending request.
    pub async fn set_status(
        &self,
        id: u64,
        decision: LeaveDecision,
        approver: u64,
        remarks: Option<String>,
    ) -> Result<LeaveRequest, HrError> {
        let request = match decision {
            LeaveDecision::Approved => self.store.approve(id, approver, remarks).await?,
            LeaveDecision::Rejected => self.store.reject(id, approver, remarks).await?,
        };
        let event = match decision {
            LeaveDecision::Approved => "leave_approved",
            LeaveDecision::Rejected => "leave_rejected",
        };
        info!(
            event,
            request_id = id,
            employee_id = request.employee_id,
            approver,
            "leave request decided"
        );
        Ok(request)
    }

    /// Owner cancels a Pending or Approved request; an approved one has its
    /// deducted days credited back by the store.
    pub async fn cancel(&self, id: u64, employee_id: u64) -> Result<LeaveRequest, HrError> {
        let request = self.store.cancel(id, employee_id).await?;
        info!(
            event = "leave_cancelled",
            request_id = id,
            employee_id,
            "leave request cancelled"
        );
        Ok(request)
    }

    pub async fn get(&self, id: u64) -> Result<LeaveRequest, HrError> {
        self.store
            .get(id)
            .await?
            .ok_or(HrError::NotFound("leave request"))
    }

    pub async fn my_leaves(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, HrError> {
        self.store.list_for_employee(employee_id).await
    }

    pub async fn pending(&self) -> Result<Vec<LeaveRequest>, HrError> {
        self.store.list_by_status(Some(LeaveStatus::Pending)).await
    }

    pub async fn list(&self, status: Option<LeaveStatus>) -> Result<Vec<LeaveRequest>, HrError> {
        self.store.list_by_status(status).await
    }

    pub async fn balance(&self, employee_id: u64) -> Result<LeaveBalance, HrError> {
        self.store.balance(employee_id).await
    }

    /// Administrative correction.
    pub async fn credit(
        &self,
        employee_id: u64,
        category: LeaveCategory,
        days: u32,
    ) -> Result<LeaveBalance, HrError> {
        if days == 0 {
            return Err(HrError::Validation("days must be at least 1".into()));
        }
        let balance = self.store.credit(employee_id, category, days).await?;
        info!(
            event = "balance_credited",
            employee_id,
            category = %category,
            days,
            "leave balance credited"
        );
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LeaveEntitlements;
    use crate::leave::store::MemoryLeaveStore;

    const EMP: u64 = 1000;
    const ADMIN: u64 = 1;

    fn workflow() -> LeaveWorkflow<MemoryLeaveStore> {
        LeaveWorkflow::new(MemoryLeaveStore::new(LeaveEntitlements::default()))
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn casual(start: &str, end: &str) -> LeaveApplication {
        LeaveApplication {
            category: LeaveCategory::Casual,
            start_date: date(start),
            end_date: date(end),
            reason: "family function".into(),
        }
    }

    #[actix_web::test]
    async fn day_count_is_inclusive_of_both_endpoints() {
        let wf = workflow();
        let req = wf
            .submit(EMP, casual("2024-06-10", "2024-06-12"))
            .await
            .unwrap();
        assert_eq!(req.total_days, 3);
        assert_eq!(req.status, LeaveStatus::Pending);

        let one_day = wf
            .submit(EMP, casual("2024-07-01", "2024-07-01"))
            .await
            .unwrap();
        assert_eq!(one_day.total_days, 1);
    }

    #[actix_web::test]
    async fn inverted_range_is_rejected() {
        let wf = workflow();
        let err = wf
            .submit(EMP, casual("2024-06-12", "2024-06-10"))
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::Validation(_)));
    }

    #[actix_web::test]
    async fn empty_reason_is_rejected() {
        let wf = workflow();
        let mut app = casual("2024-06-10", "2024-06-12");
        app.reason = "   ".into();
        let err = wf.submit(EMP, app).await.unwrap_err();
        assert!(matches!(err, HrError::Validation(_)));
    }

    #[actix_web::test]
    async fn submission_checks_but_does_not_reserve_balance() {
        let wf = workflow();
        wf.submit(EMP, casual("2024-06-10", "2024-06-12"))
            .await
            .unwrap();
        // only checked, not deducted
        assert_eq!(wf.balance(EMP).await.unwrap().casual_leave, 12);

        // 13 days against a 12-day entitlement
        let err = wf
            .submit(EMP, casual("2024-08-01", "2024-08-13"))
            .await
            .unwrap_err();
        match err {
            HrError::InsufficientBalance {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 13);
                assert_eq!(available, 12);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn approve_deducts_and_is_not_retryable() {
        let wf = workflow();
        let req = wf
            .submit(EMP, casual("2024-06-10", "2024-06-12"))
            .await
            .unwrap();

        let approved = wf
            .set_status(req.id, LeaveDecision::Approved, ADMIN, Some("enjoy".into()))
            .await
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.approved_by, Some(ADMIN));
        assert_eq!(wf.balance(EMP).await.unwrap().casual_leave, 9);

        // retrying the approval must fail and leave the balance alone
        let err = wf
            .set_status(req.id, LeaveDecision::Approved, ADMIN, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HrError::InvalidState {
                action: "approve",
                current: LeaveStatus::Approved
            }
        ));
        assert_eq!(wf.balance(EMP).await.unwrap().casual_leave, 9);
    }

    #[actix_web::test]
    async fn reject_leaves_balance_alone() {
        let wf = workflow();
        let req = wf
            .submit(EMP, casual("2024-06-10", "2024-06-12"))
            .await
            .unwrap();
        let rejected = wf
            .set_status(req.id, LeaveDecision::Rejected, ADMIN, Some("no cover".into()))
            .await
            .unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(wf.balance(EMP).await.unwrap().casual_leave, 12);
    }

    #[actix_web::test]
    async fn cancel_pending_has_no_balance_effect() {
        let wf = workflow();
        let req = wf
            .submit(EMP, casual("2024-06-10", "2024-06-12"))
            .await
            .unwrap();
        let cancelled = wf.cancel(req.id, EMP).await.unwrap();
        assert_eq!(cancelled.status, LeaveStatus::Cancelled);
        assert_eq!(wf.balance(EMP).await.unwrap().casual_leave, 12);
    }

    #[actix_web::test]
    async fn cancel_approved_restores_deducted_days() {
        let wf = workflow();
        let req = wf
            .submit(EMP, casual("2024-06-10", "2024-06-12"))
            .await
            .unwrap();
        wf.set_status(req.id, LeaveDecision::Approved, ADMIN, None)
            .await
            .unwrap();
        assert_eq!(wf.balance(EMP).await.unwrap().casual_leave, 9);

        let cancelled = wf.cancel(req.id, EMP).await.unwrap();
        assert_eq!(cancelled.status, LeaveStatus::Cancelled);
        assert_eq!(wf.balance(EMP).await.unwrap().casual_leave, 12);
    }

    #[actix_web::test]
    async fn cancel_is_owner_only() {
        let wf = workflow();
        let req = wf
            .submit(EMP, casual("2024-06-10", "2024-06-12"))
            .await
            .unwrap();
        let err = wf.cancel(req.id, EMP + 1).await.unwrap_err();
        assert!(matches!(err, HrError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn cancel_terminal_request_is_invalid() {
        let wf = workflow();
        let req = wf
            .submit(EMP, casual("2024-06-10", "2024-06-12"))
            .await
            .unwrap();
        wf.set_status(req.id, LeaveDecision::Rejected, ADMIN, None)
            .await
            .unwrap();
        let err = wf.cancel(req.id, EMP).await.unwrap_err();
        assert!(matches!(err, HrError::InvalidState { action: "cancel", .. }));
    }

    #[actix_web::test]
    async fn concurrent_approvals_cannot_jointly_overdraw() {
        let wf = workflow();
        // two pending requests of 8 and 7 days against a 12-day balance;
        // each passes the submission check on its own
        let first = wf
            .submit(EMP, casual("2024-06-03", "2024-06-10"))
            .await
            .unwrap();
        let second = wf
            .submit(EMP, casual("2024-07-01", "2024-07-07"))
            .await
            .unwrap();

        let (a, b) = futures::join!(
            wf.set_status(first.id, LeaveDecision::Approved, ADMIN, None),
            wf.set_status(second.id, LeaveDecision::Approved, ADMIN, None)
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one approval may win");
        let loser = if a.is_err() { a } else { b };
        assert!(matches!(
            loser.unwrap_err(),
            HrError::InsufficientBalance { .. }
        ));
        // only the winner's days were deducted
        let remaining = wf.balance(EMP).await.unwrap().casual_leave;
        assert!(remaining == 4 || remaining == 5);
    }

    #[actix_web::test]
    async fn worked_example_from_the_product_brief() {
        let wf = workflow();
        let req = wf
            .submit(EMP, casual("2024-06-10", "2024-06-12"))
            .await
            .unwrap();
        assert_eq!(wf.balance(EMP).await.unwrap().casual_leave, 12);

        wf.set_status(req.id, LeaveDecision::Approved, ADMIN, None)
            .await
            .unwrap();
        assert_eq!(wf.balance(EMP).await.unwrap().casual_leave, 9);

        let err = wf
            .submit(EMP, casual("2024-09-01", "2024-09-10"))
            .await
            .unwrap_err();
        match err {
            HrError::InsufficientBalance {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 10);
                assert_eq!(available, 9);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn listings_filter_by_owner_and_status() {
        let wf = workflow();
        let a = wf
            .submit(EMP, casual("2024-06-10", "2024-06-11"))
            .await
            .unwrap();
        let _b = wf
            .submit(EMP + 1, casual("2024-06-10", "2024-06-11"))
            .await
            .unwrap();

        wf.set_status(a.id, LeaveDecision::Approved, ADMIN, None)
            .await
            .unwrap();

        assert_eq!(wf.my_leaves(EMP).await.unwrap().len(), 1);
        assert_eq!(wf.pending().await.unwrap().len(), 1);
        assert_eq!(wf.list(None).await.unwrap().len(), 2);
        assert_eq!(
            wf.list(Some(LeaveStatus::Approved)).await.unwrap().len(),
            1
        );
    }

    #[actix_web::test]
    async fn zero_day_credit_is_rejected() {
        let wf = workflow();
        let err = wf.credit(EMP, LeaveCategory::Sick, 0).await.unwrap_err();
        assert!(matches!(err, HrError::Validation(_)));

        let bal = wf.credit(EMP, LeaveCategory::Sick, 2).await.unwrap();
        assert_eq!(bal.sick_leave, 12);
    }
}
