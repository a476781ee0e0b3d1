use async_trait::async_trait;
use aws_sdk_sns::types::Subscription;
use aws_sdk_sns::Client as SnsClient;
use log::trace;

use crate::aws::{AwsError, AwsResult};
use crate::provider::{Page, SubscriptionRecord, SubscriptionSource};

/// Client to call Amazon SNS
pub struct AwsSnsClient {
    pub(crate) client: SnsClient,
}

/// Impl for SNS client wrapper
impl AwsSnsClient {
    /// New construct
    pub const fn new(client: SnsClient) -> Self {
        Self { client }
    }
}

fn to_record(sub: &Subscription) -> SubscriptionRecord {
    SubscriptionRecord::new(
        sub.protocol().unwrap_or_default(),
        sub.endpoint().unwrap_or_default(),
        sub.subscription_arn().unwrap_or_default(),
        sub.topic_arn().unwrap_or_default(),
    )
}

#[async_trait]
impl SubscriptionSource for AwsSnsClient {
    async fn list_topics(&self, next_token: Option<String>) -> AwsResult<Page<String>> {
        let out = self
            .client
            .list_topics()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| AwsError::SdkError(format!("SNS ListTopics failed: {e}")))?;

        let topics = out
            .topics()
            .iter()
            .filter_map(|t| t.topic_arn().map(str::to_string))
            .collect::<Vec<_>>();
        trace!("ListTopics returned {} topics", topics.len());

        Ok(Page::new(topics, out.next_token().map(str::to_string)))
    }

    async fn list_subscriptions_by_topic(
        &self,
        topic_arn: &str,
        next_token: Option<String>,
    ) -> AwsResult<Page<SubscriptionRecord>> {
        let out = self
            .client
            .list_subscriptions_by_topic()
            .topic_arn(topic_arn)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| {
                AwsError::SdkError(format!("SNS ListSubscriptionsByTopic failed: {e}"))
            })?;

        let subscriptions = out.subscriptions().iter().map(to_record).collect::<Vec<_>>();
        trace!(
            "ListSubscriptionsByTopic returned {} subscriptions for {topic_arn}",
            subscriptions.len()
        );

        Ok(Page::new(subscriptions, out.next_token().map(str::to_string)))
    }
}
