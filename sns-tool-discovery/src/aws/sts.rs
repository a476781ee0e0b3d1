use async_trait::async_trait;
use aws_sdk_sts::Client as StsClient;

use crate::aws::{AwsError, AwsResult};
use crate::provider::IdentityProvider;

/// Return the current caller account ID using STS GetCallerIdentity.
///
/// This is used for the same-account guardrail check before any SNS listing.
///
/// # Arguments
///
/// * `client` - STS client to use for the API call
pub async fn caller_account_id(client: &StsClient) -> AwsResult<String> {
    let out = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| AwsError::SdkError(format!("STS GetCallerIdentity failed: {e}")))?;
    let acct = out
        .account()
        .map(std::string::ToString::to_string)
        .ok_or_else(|| AwsError::SdkError("STS GetCallerIdentity missing Account".to_string()))?;
    Ok(acct)
}

#[async_trait]
impl IdentityProvider for StsClient {
    async fn caller_account_id(&self) -> AwsResult<String> {
        caller_account_id(self).await
    }
}
