use sqlx::{MySql, MySqlPool, Transaction};

use crate::config::LeaveEntitlements;
use crate::error::HrError;
use crate::leave::store::LeaveStore;
use crate::model::leave::{
    LeaveBalance, LeaveCategory, LeaveRequest, LeaveStatus, NewLeaveRequest,
};

const REQUEST_COLS: &str = "id, employee_id, leave_type, start_date, end_date, total_days, \
                            reason, status, applied_at, approved_by, admin_remarks";

const BALANCE_COLS: &str = "employee_id, casual_leave, sick_leave, paid_leave";

/// MySQL-backed store. `approve` and `cancel` run inside one transaction with
/// `SELECT ... FOR UPDATE` row locks so concurrent admin actions serialize on
/// the balance row instead of racing a stale snapshot.
#[derive(Clone)]
pub struct MySqlLeaveStore {
    pool: MySqlPool,
    defaults: LeaveEntitlements,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool, defaults: LeaveEntitlements) -> Self {
        MySqlLeaveStore { pool, defaults }
    }

    async fn fetch_request_for_update(
        &self,
        tx: &mut Transaction<'_, MySql>,
        id: u64,
    ) -> Result<LeaveRequest, HrError> {
        let sql = format!("SELECT {REQUEST_COLS} FROM leave_requests WHERE id = ? FOR UPDATE");
        sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(HrError::NotFound("leave request"))
    }

    /// Locks the employee's balance row, creating it with the default
    /// entitlements when missing.
    async fn fetch_balance_for_update(
        &self,
        tx: &mut Transaction<'_, MySql>,
        employee_id: u64,
    ) -> Result<LeaveBalance, HrError> {
        let select =
            format!("SELECT {BALANCE_COLS} FROM leave_balances WHERE employee_id = ? FOR UPDATE");

        if let Some(balance) = sqlx::query_as::<_, LeaveBalance>(&select)
            .bind(employee_id)
            .fetch_optional(&mut **tx)
            .await?
        {
            return Ok(balance);
        }

        sqlx::query(
            "INSERT IGNORE INTO leave_balances (employee_id, casual_leave, sick_leave, paid_leave) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(employee_id)
        .bind(self.defaults.casual)
        .bind(self.defaults.sick)
        .bind(self.defaults.paid)
        .execute(&mut **tx)
        .await?;

        let balance = sqlx::query_as::<_, LeaveBalance>(&select)
            .bind(employee_id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(balance)
    }

    async fn adjust_balance(
        &self,
        tx: &mut Transaction<'_, MySql>,
        employee_id: u64,
        category: LeaveCategory,
        delta_days: u32,
        credit: bool,
    ) -> Result<(), HrError> {
        let op = if credit { "+" } else { "-" };
        let col = category.column();
        let sql =
            format!("UPDATE leave_balances SET {col} = {col} {op} ? WHERE employee_id = ?");
        sqlx::query(&sql)
            .bind(delta_days)
            .bind(employee_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

impl LeaveStore for MySqlLeaveStore {
    async fn balance(&self, employee_id: u64) -> Result<LeaveBalance, HrError> {
        let select = format!("SELECT {BALANCE_COLS} FROM leave_balances WHERE employee_id = ?");

        if let Some(balance) = sqlx::query_as::<_, LeaveBalance>(&select)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(balance);
        }

        // first touch: seed the default entitlements; IGNORE keeps a
        // concurrent first touch from failing on the unique key
        sqlx::query(
            "INSERT IGNORE INTO leave_balances (employee_id, casual_leave, sick_leave, paid_leave) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(employee_id)
        .bind(self.defaults.casual)
        .bind(self.defaults.sick)
        .bind(self.defaults.paid)
        .execute(&self.pool)
        .await?;

        let balance = sqlx::query_as::<_, LeaveBalance>(&select)
            .bind(employee_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(balance)
    }

    async fn credit(
        &self,
        employee_id: u64,
        category: LeaveCategory,
        days: u32,
    ) -> Result<LeaveBalance, HrError> {
        let mut tx = self.pool.begin().await?;
        self.fetch_balance_for_update(&mut tx, employee_id).await?;
        self.adjust_balance(&mut tx, employee_id, category, days, true)
            .await?;
        tx.commit().await?;
        self.balance(employee_id).await
    }

    async fn insert(&self, request: NewLeaveRequest) -> Result<LeaveRequest, HrError> {
        let result = sqlx::query(
            "INSERT INTO leave_requests \
             (employee_id, leave_type, start_date, end_date, total_days, reason, status) \
             VALUES (?, ?, ?, ?, ?, ?, 'Pending')",
        )
        .bind(request.employee_id)
        .bind(request.category.column())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.total_days)
        .bind(&request.reason)
        .execute(&self.pool)
        .await?;

        let sql = format!("SELECT {REQUEST_COLS} FROM leave_requests WHERE id = ?");
        let record = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(result.last_insert_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(record)
    }

    async fn get(&self, id: u64) -> Result<Option<LeaveRequest>, HrError> {
        let sql = format!("SELECT {REQUEST_COLS} FROM leave_requests WHERE id = ?");
        let record = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn list_for_employee(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, HrError> {
        let sql = format!(
            "SELECT {REQUEST_COLS} FROM leave_requests WHERE employee_id = ? \
             ORDER BY applied_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_by_status(
        &self,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>, HrError> {
        let rows = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {REQUEST_COLS} FROM leave_requests WHERE status = ? \
                     ORDER BY applied_at DESC, id DESC"
                );
                sqlx::query_as::<_, LeaveRequest>(&sql)
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {REQUEST_COLS} FROM leave_requests ORDER BY applied_at DESC, id DESC"
                );
                sqlx::query_as::<_, LeaveRequest>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn approve(
        &self,
        id: u64,
        approver: u64,
        remarks: Option<String>,
    ) -> Result<LeaveRequest, HrError> {
        let mut tx = self.pool.begin().await?;

        let mut request = self.fetch_request_for_update(&mut tx, id).await?;
        if request.status != LeaveStatus::Pending {
            return Err(HrError::InvalidState {
                action: "approve",
                current: request.status,
            });
        }

        let balance = self
            .fetch_balance_for_update(&mut tx, request.employee_id)
            .await?;
        let available = balance.available(request.category);
        if available < request.total_days {
            // dropping the transaction rolls back; the request stays Pending
            return Err(HrError::InsufficientBalance {
                category: request.category,
                requested: request.total_days,
                available,
            });
        }

        self.adjust_balance(
            &mut tx,
            request.employee_id,
            request.category,
            request.total_days,
            false,
        )
        .await?;

        sqlx::query(
            "UPDATE leave_requests \
             SET status = 'Approved', approved_by = ?, admin_remarks = ?, approved_at = NOW() \
             WHERE id = ?",
        )
        .bind(approver)
        .bind(&remarks)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        request.status = LeaveStatus::Approved;
        request.approved_by = Some(approver);
        request.admin_remarks = remarks;
        Ok(request)
    }

    async fn reject(
        &self,
        id: u64,
        approver: u64,
        remarks: Option<String>,
    ) -> Result<LeaveRequest, HrError> {
        let mut tx = self.pool.begin().await?;

        let mut request = self.fetch_request_for_update(&mut tx, id).await?;
        if request.status != LeaveStatus::Pending {
            return Err(HrError::InvalidState {
                action: "reject",
                current: request.status,
            });
        }

        sqlx::query(
            "UPDATE leave_requests \
             SET status = 'Rejected', approved_by = ?, admin_remarks = ?, approved_at = NOW() \
             WHERE id = ?",
        )
        .bind(approver)
        .bind(&remarks)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        request.status = LeaveStatus::Rejected;
        request.approved_by = Some(approver);
        request.admin_remarks = remarks;
        Ok(request)
    }

    async fn cancel(&self, id: u64, employee_id: u64) -> Result<LeaveRequest, HrError> {
        let mut tx = self.pool.begin().await?;

        let mut request = self.fetch_request_for_update(&mut tx, id).await?;
        if request.employee_id != employee_id {
            return Err(HrError::Forbidden(
                "you can only cancel your own leave requests".into(),
            ));
        }

        match request.status {
            LeaveStatus::Pending => {}
            LeaveStatus::Approved => {
                // restore what approval deducted, under the same locks
                self.fetch_balance_for_update(&mut tx, employee_id).await?;
                self.adjust_balance(
                    &mut tx,
                    employee_id,
                    request.category,
                    request.total_days,
                    true,
                )
                .await?;
            }
            other => {
                return Err(HrError::InvalidState {
                    action: "cancel",
                    current: other,
                });
            }
        }

        sqlx::query("UPDATE leave_requests SET status = 'Cancelled' WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        request.status = LeaveStatus::Cancelled;
        Ok(request)
    }
}
