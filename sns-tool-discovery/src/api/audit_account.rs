use std::path::PathBuf;
use std::time::Instant;

use aws_sdk_sns::Client as SnsClient;
use aws_sdk_sts::Client as StsClient;
use log::{debug, info};

use crate::{
    account_directory::AccountDirectory,
    aws::{sns_client::AwsSnsClient, ClientConfig},
    discovery::{DiscoveryEngine, DiscoveryOutcome, LAMBDA_PROTOCOL},
    errors::{AuditError, Result},
    identity::verify_account,
    provider::{IdentityProvider, SubscriptionSource},
};

/// Inputs for one audit pass
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// account to audit; the credentials must belong to it
    pub account_id: String,
    /// region and profile for the SDK clients
    pub client: ClientConfig,
    /// delivery protocol to look for
    pub protocol: String,
    /// replaces the embedded account directory when set
    pub accounts_file: Option<PathBuf>,
}

impl AuditConfig {
    /// Lambda audit of `account_id` with default region and credentials
    #[must_use]
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            client: ClientConfig::default(),
            protocol: LAMBDA_PROTOCOL.to_string(),
            accounts_file: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(AuditError::configuration("account ID must not be empty"));
        }
        if self.protocol.is_empty() {
            return Err(AuditError::configuration("protocol must not be empty"));
        }
        Ok(())
    }

    fn directory(&self) -> Result<AccountDirectory> {
        match &self.accounts_file {
            Some(path) => AccountDirectory::from_file(path),
            None => AccountDirectory::embedded(),
        }
    }
}

/// Audit an account using the AWS SDK: verify the caller identity, then
/// list every topic and subscription looking for cross-account endpoints.
///
/// # Errors
/// Any fatal `AuditError`; per-topic listing failures are returned in
/// [`DiscoveryOutcome::skipped`] instead.
pub async fn audit_account(config: &AuditConfig) -> Result<DiscoveryOutcome> {
    config.validate()?;
    let directory = config.directory()?;
    let sdk_config = config.client.load().await?;

    let sts = StsClient::new(&sdk_config);
    let sns = AwsSnsClient::new(SnsClient::new(&sdk_config));

    run_audit(&sts, &sns, config, &directory).await
}

/// Audit pass against arbitrary providers
///
/// # Errors
/// See [`audit_account`].
pub async fn run_audit<I, S>(
    identity: &I,
    source: &S,
    config: &AuditConfig,
    directory: &AccountDirectory,
) -> Result<DiscoveryOutcome>
where
    I: IdentityProvider + ?Sized,
    S: SubscriptionSource + ?Sized,
{
    let pipeline_start = Instant::now();
    config.validate()?;

    verify_account(identity, &config.account_id).await?;

    debug!(
        "Discovering cross-account {} subscriptions for {} ({} known accounts)",
        config.protocol,
        config.account_id,
        directory.len()
    );
    let engine =
        DiscoveryEngine::new(config.account_id.clone(), directory).with_protocol(&config.protocol);
    let outcome = engine.discover(source).await?;

    info!("Audit completed in {:?}", pipeline_start.elapsed());
    Ok(outcome)
}
