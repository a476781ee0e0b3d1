//! AWS SDK integration: SDK config loading, STS identity lookup, SNS listing.

/// sns clients
pub mod sns_client;

/// sts calls
pub mod sts;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use log::debug;
use thiserror::Error;

use crate::errors::{AuditError, Result};

/// Region used when the caller does not pick one
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Error, Debug)]
/// AWS Errors from AWS SDK calls
pub enum AwsError {
    #[error("AWS configuration error: {0}")]
    /// config error
    ConfigError(String),
    #[error("AWS SDK error: {0}")]
    /// errors from SDK output
    SdkError(String),
}

/// Type of AWS Result extending Result
pub type AwsResult<T> = std::result::Result<T, AwsError>;

/// Settings used to build the SDK clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// region to query
    pub region: String,
    /// named profile from the shared config files
    pub profile: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            profile: None,
        }
    }
}

impl ClientConfig {
    /// Load the SDK config using the standard credential provider chain.
    ///
    /// Credentials are resolved here so that a missing or broken credential
    /// setup is reported before any remote call.
    ///
    /// # Errors
    /// `AuditError::Configuration` when the region is blank or no credentials
    /// can be resolved for the chosen profile.
    pub async fn load(&self) -> Result<SdkConfig> {
        if self.region.trim().is_empty() {
            return Err(AuditError::configuration("region must not be empty"));
        }

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(self.region.clone()));
        if let Some(profile) = self.profile.as_deref().filter(|p| !p.is_empty()) {
            debug!("Using shared config profile {profile}");
            loader = loader.profile_name(profile);
        }

        let config = loader.load().await;
        ensure_credentials(&config).await?;

        debug!("Loaded AWS config for region {}", self.region);
        Ok(config)
    }
}

/// Resolve credentials once from the config's provider chain
pub(crate) async fn ensure_credentials(config: &SdkConfig) -> Result<()> {
    let provider = config.credentials_provider().ok_or_else(|| {
        AuditError::configuration_with_source(
            "unable to load SDK config",
            AwsError::ConfigError("no credentials provider available".to_string()),
        )
    })?;

    provider
        .provide_credentials()
        .await
        .map_err(|e| AuditError::configuration_with_source("unable to resolve AWS credentials", e))?;
    Ok(())
}
