//! Same-account guardrail run once before any listing call.

use log::{debug, info};

use crate::errors::{AuditError, Result};
use crate::provider::IdentityProvider;

/// Confirm the active credentials belong to `claimed_account`.
///
/// # Errors
/// `AuditError::IdentityLookup` when the identity call fails,
/// `AuditError::IdentityMismatch` when the credentials belong elsewhere.
pub async fn verify_account<P>(provider: &P, claimed_account: &str) -> Result<()>
where
    P: IdentityProvider + ?Sized,
{
    let actual = provider
        .caller_account_id()
        .await
        .map_err(|source| AuditError::IdentityLookup { source })?;
    debug!("Credentials resolve to account {actual}");

    if actual != claimed_account {
        return Err(AuditError::IdentityMismatch {
            expected: claimed_account.to_string(),
            actual,
        });
    }

    info!("Verified credentials for account {claimed_account}");
    Ok(())
}
