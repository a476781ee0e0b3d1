//! Cross-account subscription discovery.
//!
//! Walks every topic in the audited account, pages through each topic's
//! subscriptions and keeps the ones whose delivery endpoint lives in a
//! different account. Topics and subscriptions are visited in the order the
//! provider returns them and findings keep that order.

mod integration_tests;

use log::{debug, info, trace};
use serde::Serialize;

use crate::account_directory::AccountDirectory;
use crate::arn::EndpointArn;
use crate::errors::{AuditError, Result};
use crate::provider::{PageCursor, SubscriptionRecord, SubscriptionSource};

/// Protocol used by SNS for Lambda function subscriptions
pub const LAMBDA_PROTOCOL: &str = "lambda";

/// One subscription delivering to an endpoint owned by another account.
///
/// Field renames double as the CSV column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionFinding {
    /// source topic
    #[serde(rename = "Topic ARN")]
    pub topic_arn: String,
    /// subscription record
    #[serde(rename = "Subscription ARN")]
    pub subscription_arn: String,
    /// delivery endpoint (the Lambda function ARN)
    #[serde(rename = "Lambda Function")]
    pub endpoint: String,
    /// `Label (account)` or the raw account number
    #[serde(rename = "Owner Account")]
    pub owner: String,
}

/// Result of a full discovery pass
#[derive(Debug, Default)]
pub struct DiscoveryOutcome {
    /// cross-account findings in provider order
    pub findings: Vec<SubscriptionFinding>,
    /// topics whose subscriptions could not be listed; always
    /// `AuditError::SubscriptionListing`
    pub skipped: Vec<AuditError>,
    /// number of topics visited, skipped ones included
    pub topics_scanned: usize,
}

/// Finds subscriptions whose endpoint is owned by another account
#[derive(Debug, Clone)]
pub struct DiscoveryEngine<'a> {
    account_id: String,
    protocol: String,
    directory: &'a AccountDirectory,
}

impl<'a> DiscoveryEngine<'a> {
    /// Engine for `account_id` looking at Lambda subscriptions
    #[must_use]
    pub fn new(account_id: impl Into<String>, directory: &'a AccountDirectory) -> Self {
        Self {
            account_id: account_id.into(),
            protocol: LAMBDA_PROTOCOL.to_string(),
            directory,
        }
    }

    /// Override the delivery protocol to look for
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Account under audit
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Decide whether a single subscription is a cross-account finding.
    ///
    /// Skips records with another protocol, endpoints that do not parse as a
    /// function ARN and endpoints owned by the audited account.
    #[must_use]
    pub fn evaluate(&self, record: &SubscriptionRecord) -> Option<SubscriptionFinding> {
        if record.protocol != self.protocol {
            return None;
        }

        let Some(endpoint) = EndpointArn::parse(&record.endpoint) else {
            trace!("Ignoring unrecognised endpoint {}", record.endpoint);
            return None;
        };

        if endpoint.account_id == self.account_id {
            return None;
        }

        Some(SubscriptionFinding {
            topic_arn: record.topic_arn.clone(),
            subscription_arn: record.subscription_arn.clone(),
            endpoint: record.endpoint.clone(),
            owner: self.directory.display_owner(endpoint.account_id),
        })
    }

    /// Run the discovery pass against `source`.
    ///
    /// Skipped topics are only logged at debug level; reporting them is up to
    /// the caller.
    ///
    /// # Errors
    /// `AuditError::TopicListing` if any topic page fails. Subscription
    /// listing failures do not fail the pass; they are collected in
    /// [`DiscoveryOutcome::skipped`].
    pub async fn discover<S>(&self, source: &S) -> Result<DiscoveryOutcome>
    where
        S: SubscriptionSource + ?Sized,
    {
        let mut outcome = DiscoveryOutcome::default();
        let mut topics = PageCursor::new();

        while let Some(token) = topics.pending() {
            let page = source
                .list_topics(token)
                .await
                .map_err(|source| AuditError::TopicListing { source })?;
            debug!("Fetched page of {} topics", page.items.len());
            topics.advance(page.next_token);

            for topic_arn in &page.items {
                outcome.topics_scanned += 1;
                if let Err(err) = self
                    .scan_topic(source, topic_arn, &mut outcome.findings)
                    .await
                {
                    debug!("Skipping topic: {err}");
                    outcome.skipped.push(err);
                }
            }
        }

        info!(
            "Scanned {} topics, found {} cross-account {} subscriptions",
            outcome.topics_scanned,
            outcome.findings.len(),
            self.protocol
        );
        Ok(outcome)
    }

    /// Page through one topic's subscriptions. Findings from pages fetched
    /// before a failure are kept.
    async fn scan_topic<S>(
        &self,
        source: &S,
        topic_arn: &str,
        findings: &mut Vec<SubscriptionFinding>,
    ) -> Result<()>
    where
        S: SubscriptionSource + ?Sized,
    {
        let mut cursor = PageCursor::new();

        while let Some(token) = cursor.pending() {
            let page = source
                .list_subscriptions_by_topic(topic_arn, token)
                .await
                .map_err(|source| AuditError::SubscriptionListing {
                    topic_arn: topic_arn.to_string(),
                    source,
                })?;
            trace!(
                "Fetched page of {} subscriptions for {topic_arn}",
                page.items.len()
            );
            cursor.advance(page.next_token);

            findings.extend(page.items.iter().filter_map(|record| self.evaluate(record)));
        }

        Ok(())
    }
}
