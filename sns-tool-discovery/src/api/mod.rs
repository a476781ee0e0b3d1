//! SNS Tool Core API Interface

mod audit_account;
pub use audit_account::{audit_account, run_audit, AuditConfig};
