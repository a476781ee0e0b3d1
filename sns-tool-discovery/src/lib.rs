//! Core library for the SNS cross-account subscription audit.
//!
//! - Same-account guardrail on the active credentials
//! - Topic and subscription enumeration with token pagination
//! - Owner extraction from Lambda endpoint ARNs and account labelling
//! - Console and CSV reports
//!

pub mod account_directory;
pub mod api;
pub mod arn;
pub mod aws;
pub mod discovery;
pub mod errors;
pub mod identity;
pub mod provider;
pub mod report;

// Re-exports for a small, focused public API
pub use account_directory::AccountDirectory;
pub use api::{audit_account, run_audit, AuditConfig};
pub use aws::{AwsError, ClientConfig, DEFAULT_REGION};
pub use discovery::{DiscoveryEngine, DiscoveryOutcome, SubscriptionFinding, LAMBDA_PROTOCOL};
pub use errors::{AuditError, Result};
pub use report::{render, ReportTarget};
