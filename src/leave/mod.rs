pub mod mysql;
pub mod store;
pub mod workflow;

pub use mysql::MySqlLeaveStore;
pub use workflow::LeaveWorkflow;

/// Workflow wired to the MySQL store, as shared with the HTTP handlers.
pub type AppWorkflow = LeaveWorkflow<MySqlLeaveStore>;
