#[cfg(test)]
use std::collections::{BTreeMap, HashMap};
#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
use chrono::Utc;

#[cfg(test)]
use crate::config::LeaveEntitlements;
use crate::error::HrError;
use crate::model::leave::{
    LeaveBalance, LeaveCategory, LeaveRequest, LeaveStatus, NewLeaveRequest,
};

/// Persistence seam for the leave workflow. `approve` and `cancel` are atomic
/// read-modify-write operations: the status flip and the balance mutation
/// either both happen or neither does.
#[allow(async_fn_in_trait)]
pub trait LeaveStore: Send + Sync + 'static {
    /// Current counters, lazily creating the row with default entitlements.
    async fn balance(&self, employee_id: u64) -> Result<LeaveBalance, HrError>;

    /// Increment a counter (cancellation restore, administrative correction).
    async fn credit(
        &self,
        employee_id: u64,
        category: LeaveCategory,
        days: u32,
    ) -> Result<LeaveBalance, HrError>;

    /// Persist a validated submission as `Pending`.
    async fn insert(&self, request: NewLeaveRequest) -> Result<LeaveRequest, HrError>;

    async fn get(&self, id: u64) -> Result<Option<LeaveRequest>, HrError>;

    async fn list_for_employee(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, HrError>;

    async fn list_by_status(
        &self,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>, HrError>;

    /// Pending → Approved with the balance deduction in the same unit.
    /// Insufficient balance leaves the request Pending.
    async fn approve(
        &self,
        id: u64,
        approver: u64,
        remarks: Option<String>,
    ) -> Result<LeaveRequest, HrError>;

    /// Pending → Rejected, no balance effect.
    async fn reject(
        &self,
        id: u64,
        approver: u64,
        remarks: Option<String>,
    ) -> Result<LeaveRequest, HrError>;

    /// Pending/Approved → Cancelled, owner only. Cancelling an approved
    /// request credits the deducted days back in the same unit.
    async fn cancel(&self, id: u64, employee_id: u64) -> Result<LeaveRequest, HrError>;
}

/// Mutex-guarded in-memory store. The workflow tests run against this; it is
/// also the reference for what the MySQL store must do transactionally.
#[cfg(test)]
pub struct MemoryLeaveStore {
    defaults: LeaveEntitlements,
    inner: Mutex<Inner>,
}

#[cfg(test)]
#[derive(Default)]
struct Inner {
    next_id: u64,
    requests: BTreeMap<u64, LeaveRequest>,
    balances: HashMap<u64, LeaveBalance>,
}

#[cfg(test)]
impl MemoryLeaveStore {
    pub fn new(defaults: LeaveEntitlements) -> Self {
        MemoryLeaveStore {
            defaults,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("leave store poisoned")
    }
}

#[cfg(test)]
impl Inner {
    fn balance_mut(&mut self, employee_id: u64, defaults: LeaveEntitlements) -> &mut LeaveBalance {
        self.balances
            .entry(employee_id)
            .or_insert_with(|| LeaveBalance::with_defaults(employee_id, defaults))
    }
}

#[cfg(test)]
impl LeaveStore for MemoryLeaveStore {
    async fn balance(&self, employee_id: u64) -> Result<LeaveBalance, HrError> {
        let mut inner = self.lock();
        Ok(inner.balance_mut(employee_id, self.defaults).clone())
    }

    async fn credit(
        &self,
        employee_id: u64,
        category: LeaveCategory,
        days: u32,
    ) -> Result<LeaveBalance, HrError> {
        let mut inner = self.lock();
        let balance = inner.balance_mut(employee_id, self.defaults);
        balance.credit(category, days);
        Ok(balance.clone())
    }

    async fn insert(&self, request: NewLeaveRequest) -> Result<LeaveRequest, HrError> {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        let record = LeaveRequest {
            id,
            employee_id: request.employee_id,
            category: request.category,
            start_date: request.start_date,
            end_date: request.end_date,
            total_days: request.total_days,
            reason: request.reason,
            status: LeaveStatus::Pending,
            applied_at: Some(Utc::now()),
            approved_by: None,
            admin_remarks: None,
        };
        inner.requests.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: u64) -> Result<Option<LeaveRequest>, HrError> {
        Ok(self.lock().requests.get(&id).cloned())
    }

    async fn list_for_employee(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, HrError> {
        Ok(self
            .lock()
            .requests
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn list_by_status(
        &self,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>, HrError> {
        Ok(self
            .lock()
            .requests
            .values()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect())
    }

    async fn approve(
        &self,
        id: u64,
        approver: u64,
        remarks: Option<String>,
    ) -> Result<LeaveRequest, HrError> {
        let defaults = self.defaults;
        let mut inner = self.lock();

        let (employee_id, category, total_days) = {
            let request = inner
                .requests
                .get(&id)
                .ok_or(HrError::NotFound("leave request"))?;
            if request.status != LeaveStatus::Pending {
                return Err(HrError::InvalidState {
                    action: "approve",
                    current: request.status,
                });
            }
            (request.employee_id, request.category, request.total_days)
        };

        // deduct first; on failure the request stays Pending
        inner
            .balance_mut(employee_id, defaults)
            .deduct(category, total_days)?;

        let request = inner.requests.get_mut(&id).expect("checked above");
        request.status = LeaveStatus::Approved;
        request.approved_by = Some(approver);
        request.admin_remarks = remarks;
        Ok(request.clone())
    }

    async fn reject(
        &self,
        id: u64,
        approver: u64,
        remarks: Option<String>,
    ) -> Result<LeaveRequest, HrError> {
        let mut inner = self.lock();
        let request = inner
            .requests
            .get_mut(&id)
            .ok_or(HrError::NotFound("leave request"))?;
        if request.status != LeaveStatus::Pending {
            return Err(HrError::InvalidState {
                action: "reject",
                current: request.status,
            });
        }
        request.status = LeaveStatus::Rejected;
        request.approved_by = Some(approver);
        request.admin_remarks = remarks;
        Ok(request.clone())
    }

    async fn cancel(&self, id: u64, employee_id: u64) -> Result<LeaveRequest, HrError> {
        let defaults = self.defaults;
        let mut inner = self.lock();

        let (owner, status, category, total_days) = {
            let request = inner
                .requests
                .get(&id)
                .ok_or(HrError::NotFound("leave request"))?;
            (
                request.employee_id,
                request.status,
                request.category,
                request.total_days,
            )
        };

        if owner != employee_id {
            return Err(HrError::Forbidden(
                "you can only cancel your own leave requests".into(),
            ));
        }
        match status {
            LeaveStatus::Pending => {}
            LeaveStatus::Approved => {
                // restore what approval deducted
                inner
                    .balance_mut(employee_id, defaults)
                    .credit(category, total_days);
            }
            other => {
                return Err(HrError::InvalidState {
                    action: "cancel",
                    current: other,
                });
            }
        }

        let request = inner.requests.get_mut(&id).expect("checked above");
        request.status = LeaveStatus::Cancelled;
        Ok(request.clone())
    }
}
