//! Integration tests for the discovery pass against an in-memory provider
//!
//! These tests drive the full topic/subscription pagination flow and check
//! the abort/skip policy for listing failures.

#[cfg(test)]
mod tests {
    use super::super::{DiscoveryEngine, SubscriptionFinding};
    use crate::account_directory::AccountDirectory;
    use crate::aws::{AwsError, AwsResult};
    use crate::errors::AuditError;
    use crate::provider::{Page, SubscriptionRecord, SubscriptionSource};
    use async_trait::async_trait;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records every log line emitted while the tests run
    struct CaptureLogger {
        records: Mutex<Vec<(Level, String)>>,
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    static CAPTURE: CaptureLogger = CaptureLogger {
        records: Mutex::new(Vec::new()),
    };

    fn captured_logs() -> &'static CaptureLogger {
        if log::set_logger(&CAPTURE).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
        &CAPTURE
    }

    /// Provider fake keyed by continuation token; `None` is the first page.
    #[derive(Default)]
    struct FakeSns {
        topic_pages: HashMap<Option<String>, Page<String>>,
        subscription_pages: HashMap<(String, Option<String>), Page<SubscriptionRecord>>,
        failing_pages: Vec<(String, Option<String>)>,
        fail_topic_listing: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSns {
        fn topics(mut self, token: Option<&str>, topics: &[&str], next: Option<&str>) -> Self {
            self.topic_pages.insert(
                token.map(str::to_string),
                Page::new(
                    topics.iter().map(|t| (*t).to_string()).collect(),
                    next.map(str::to_string),
                ),
            );
            self
        }

        fn subscriptions(
            mut self,
            topic: &str,
            token: Option<&str>,
            records: Vec<SubscriptionRecord>,
            next: Option<&str>,
        ) -> Self {
            self.subscription_pages.insert(
                (topic.to_string(), token.map(str::to_string)),
                Page::new(records, next.map(str::to_string)),
            );
            self
        }

        fn failing(self, topic: &str) -> Self {
            self.failing_at(topic, None)
        }

        fn failing_at(mut self, topic: &str, token: Option<&str>) -> Self {
            self.failing_pages
                .push((topic.to_string(), token.map(str::to_string)));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SubscriptionSource for FakeSns {
        async fn list_topics(&self, next_token: Option<String>) -> AwsResult<Page<String>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("topics:{}", next_token.as_deref().unwrap_or("-")));
            if self.fail_topic_listing {
                return Err(AwsError::SdkError("AuthorizationError".to_string()));
            }
            Ok(self
                .topic_pages
                .get(&next_token)
                .cloned()
                .unwrap_or_else(|| Page::new(vec![], None)))
        }

        async fn list_subscriptions_by_topic(
            &self,
            topic_arn: &str,
            next_token: Option<String>,
        ) -> AwsResult<Page<SubscriptionRecord>> {
            self.calls.lock().unwrap().push(format!(
                "subs:{topic_arn}:{}",
                next_token.as_deref().unwrap_or("-")
            ));
            if self
                .failing_pages
                .iter()
                .any(|(t, token)| t == topic_arn && *token == next_token)
            {
                return Err(AwsError::SdkError("NotFound".to_string()));
            }
            Ok(self
                .subscription_pages
                .get(&(topic_arn.to_string(), next_token))
                .cloned()
                .unwrap_or_else(|| Page::new(vec![], None)))
        }
    }

    fn lambda(topic: &str, sub: &str, owner: &str) -> SubscriptionRecord {
        SubscriptionRecord::new(
            "lambda",
            format!("arn:aws:lambda:us-east-1:{owner}:function:{sub}"),
            format!("{topic}:{sub}"),
            topic,
        )
    }

    fn finding(topic: &str, sub: &str, owner: &str, label: &str) -> SubscriptionFinding {
        SubscriptionFinding {
            topic_arn: topic.to_string(),
            subscription_arn: format!("{topic}:{sub}"),
            endpoint: format!("arn:aws:lambda:us-east-1:{owner}:function:{sub}"),
            owner: label.to_string(),
        }
    }

    const AUDITED: &str = "111111111111";
    const ORDERS: &str = "arn:aws:sns:us-east-1:111111111111:orders";
    const BILLING: &str = "arn:aws:sns:us-east-1:111111111111:billing";
    const AUDIT: &str = "arn:aws:sns:us-east-1:111111111111:audit";

    #[tokio::test]
    async fn test_single_cross_account_subscription() {
        let sns = FakeSns::default().topics(None, &[ORDERS], None).subscriptions(
            ORDERS,
            None,
            vec![lambda(ORDERS, "f", "222222222222")],
            None,
        );
        let directory = AccountDirectory::embedded().unwrap();
        let engine = DiscoveryEngine::new(AUDITED, &directory);

        let outcome = engine.discover(&sns).await.unwrap();

        assert_eq!(
            outcome.findings,
            vec![finding(ORDERS, "f", "222222222222", "222222222222")]
        );
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.topics_scanned, 1);
    }

    #[tokio::test]
    async fn test_email_subscription_yields_nothing() {
        let email = SubscriptionRecord::new(
            "email",
            "arn:aws:lambda:us-east-1:222222222222:function:f",
            format!("{ORDERS}:mail"),
            ORDERS,
        );
        let sns = FakeSns::default()
            .topics(None, &[ORDERS], None)
            .subscriptions(ORDERS, None, vec![email], None);
        let directory = AccountDirectory::default();

        let outcome = DiscoveryEngine::new(AUDITED, &directory)
            .discover(&sns)
            .await
            .unwrap();

        assert!(outcome.findings.is_empty());
    }

    #[tokio::test]
    async fn test_labelled_owner_from_directory() {
        let topic = "arn:aws:sns:us-east-1:571653956102:events";
        let sns = FakeSns::default().topics(None, &[topic], None).subscriptions(
            topic,
            None,
            vec![lambda(topic, "consumer", "471112726481")],
            None,
        );
        let directory = AccountDirectory::embedded().unwrap();

        let outcome = DiscoveryEngine::new("571653956102", &directory)
            .discover(&sns)
            .await
            .unwrap();

        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].owner, "LambdaAccount (471112726481)");
    }

    #[tokio::test]
    async fn test_topic_pages_are_each_visited_once() {
        let sns = FakeSns::default()
            .topics(None, &[ORDERS], Some("A"))
            .topics(Some("A"), &[BILLING], Some("B"))
            .topics(Some("B"), &[AUDIT], Some("C"))
            .topics(Some("C"), &[], None)
            .subscriptions(ORDERS, None, vec![lambda(ORDERS, "o", "222222222222")], None)
            .subscriptions(BILLING, None, vec![lambda(BILLING, "b", "333333333333")], None)
            .subscriptions(AUDIT, None, vec![lambda(AUDIT, "a", "444444444444")], None);
        let directory = AccountDirectory::default();

        let outcome = DiscoveryEngine::new(AUDITED, &directory)
            .discover(&sns)
            .await
            .unwrap();

        assert_eq!(outcome.topics_scanned, 3);
        assert_eq!(
            outcome
                .findings
                .iter()
                .map(|f| f.topic_arn.as_str())
                .collect::<Vec<_>>(),
            vec![ORDERS, BILLING, AUDIT]
        );
        assert_eq!(
            sns.calls(),
            vec![
                "topics:-".to_string(),
                format!("subs:{ORDERS}:-"),
                "topics:A".to_string(),
                format!("subs:{BILLING}:-"),
                "topics:B".to_string(),
                format!("subs:{AUDIT}:-"),
                "topics:C".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_subscription_pages_keep_provider_order() {
        let sns = FakeSns::default()
            .topics(None, &[ORDERS], None)
            .subscriptions(
                ORDERS,
                None,
                vec![
                    lambda(ORDERS, "first", "222222222222"),
                    lambda(ORDERS, "local", AUDITED),
                ],
                Some("next"),
            )
            .subscriptions(
                ORDERS,
                Some("next"),
                vec![lambda(ORDERS, "second", "333333333333")],
                None,
            );
        let directory = AccountDirectory::default();

        let outcome = DiscoveryEngine::new(AUDITED, &directory)
            .discover(&sns)
            .await
            .unwrap();

        assert_eq!(
            outcome.findings,
            vec![
                finding(ORDERS, "first", "222222222222", "222222222222"),
                finding(ORDERS, "second", "333333333333", "333333333333"),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_topic_is_skipped_and_pass_continues() {
        let sns = FakeSns::default()
            .topics(None, &[ORDERS, BILLING, AUDIT], None)
            .failing(BILLING)
            .subscriptions(ORDERS, None, vec![lambda(ORDERS, "o", "222222222222")], None)
            .subscriptions(AUDIT, None, vec![lambda(AUDIT, "a", "222222222222")], None);
        let directory = AccountDirectory::default();

        let outcome = DiscoveryEngine::new(AUDITED, &directory)
            .discover(&sns)
            .await
            .unwrap();

        assert_eq!(outcome.findings.len(), 2);
        assert_eq!(outcome.topics_scanned, 3);
        assert_eq!(outcome.skipped.len(), 1);
        match &outcome.skipped[0] {
            AuditError::SubscriptionListing { topic_arn, .. } => assert_eq!(topic_arn, BILLING),
            other => panic!("unexpected error: {other}"),
        }
        assert!(outcome.skipped[0].is_recoverable());
    }

    #[tokio::test]
    async fn test_failure_on_later_page_keeps_earlier_findings() {
        let sns = FakeSns::default()
            .topics(None, &[ORDERS, BILLING], None)
            .subscriptions(
                ORDERS,
                None,
                vec![lambda(ORDERS, "early", "222222222222")],
                Some("page-2"),
            )
            .failing_at(ORDERS, Some("page-2"))
            .subscriptions(BILLING, None, vec![lambda(BILLING, "b", "333333333333")], None);
        let directory = AccountDirectory::default();

        let outcome = DiscoveryEngine::new(AUDITED, &directory)
            .discover(&sns)
            .await
            .unwrap();

        assert_eq!(
            outcome.findings,
            vec![
                finding(ORDERS, "early", "222222222222", "222222222222"),
                finding(BILLING, "b", "333333333333", "333333333333"),
            ]
        );
        assert_eq!(outcome.skipped.len(), 1);
        assert!(matches!(
            &outcome.skipped[0],
            AuditError::SubscriptionListing { topic_arn, .. } if topic_arn == ORDERS
        ));
        assert_eq!(
            sns.calls(),
            vec![
                "topics:-".to_string(),
                format!("subs:{ORDERS}:-"),
                format!("subs:{ORDERS}:page-2"),
                format!("subs:{BILLING}:-"),
            ]
        );
    }

    #[tokio::test]
    async fn test_skipped_topic_is_left_to_the_caller_to_report() {
        let logs = captured_logs();
        let quarantined = "arn:aws:sns:us-east-1:111111111111:quarantined";
        let sns = FakeSns::default()
            .topics(None, &[quarantined], None)
            .failing(quarantined);
        let directory = AccountDirectory::default();

        let outcome = DiscoveryEngine::new(AUDITED, &directory)
            .discover(&sns)
            .await
            .unwrap();

        assert_eq!(outcome.skipped.len(), 1);
        let records = logs.records.lock().unwrap();
        assert!(records
            .iter()
            .any(|(level, msg)| *level == Level::Debug && msg.contains(quarantined)));
        assert!(!records
            .iter()
            .any(|(level, msg)| *level <= Level::Warn && msg.contains(quarantined)));
    }

    #[tokio::test]
    async fn test_topic_listing_failure_aborts() {
        let sns = FakeSns {
            fail_topic_listing: true,
            ..FakeSns::default()
        };
        let directory = AccountDirectory::default();

        let err = DiscoveryEngine::new(AUDITED, &directory)
            .discover(&sns)
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::TopicListing { .. }));
        assert_eq!(sns.calls(), vec!["topics:-".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_account_and_empty_topic() {
        let directory = AccountDirectory::default();
        let engine = DiscoveryEngine::new(AUDITED, &directory);

        let empty = FakeSns::default();
        let outcome = engine.discover(&empty).await.unwrap();
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.topics_scanned, 0);

        let quiet_topic = FakeSns::default().topics(None, &[ORDERS], None);
        let outcome = engine.discover(&quiet_topic).await.unwrap();
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.topics_scanned, 1);
    }
}
