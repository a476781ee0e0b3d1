//! Provider seams consumed by the identity check and the discovery engine.
//!
//! The AWS adapters in [`crate::aws`] implement these traits; tests plug in
//! in-memory fakes instead.

use async_trait::async_trait;
use derive_new::new;

use crate::aws::AwsResult;

/// One page of a token-paginated listing call
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Page<T> {
    /// items returned on this page, in provider order
    pub items: Vec<T>,
    /// continuation token; `None` (or empty) when this is the last page
    pub next_token: Option<String>,
}

/// A subscription as reported by the messaging provider
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct SubscriptionRecord {
    /// delivery protocol, e.g. `lambda`, `sqs`, `email`
    #[new(into)]
    pub protocol: String,
    /// delivery endpoint identifier
    #[new(into)]
    pub endpoint: String,
    /// subscription ARN (or `PendingConfirmation`)
    #[new(into)]
    pub subscription_arn: String,
    /// topic ARN the subscription is attached to
    #[new(into)]
    pub topic_arn: String,
}

/// Resolves the account bound to the active credentials
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Account ID of the caller
    async fn caller_account_id(&self) -> AwsResult<String>;
}

/// Token-paginated topic and subscription listings
#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    /// Fetch one page of topic ARNs
    async fn list_topics(&self, next_token: Option<String>) -> AwsResult<Page<String>>;

    /// Fetch one page of subscriptions attached to `topic_arn`
    async fn list_subscriptions_by_topic(
        &self,
        topic_arn: &str,
        next_token: Option<String>,
    ) -> AwsResult<Page<SubscriptionRecord>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CursorState {
    Start,
    Next(String),
    Exhausted,
}

/// Carries the continuation token between calls of one paginated listing.
///
/// Finite and not restartable: once the provider stops handing out tokens
/// the cursor stays exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    state: CursorState,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCursor {
    /// Cursor positioned before the first page
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CursorState::Start,
        }
    }

    /// Token to send with the next request, or `None` once exhausted.
    ///
    /// The outer `Option` says whether another request is due; the inner one
    /// is the token to send with it (absent for the first page).
    #[must_use]
    pub fn pending(&self) -> Option<Option<String>> {
        match &self.state {
            CursorState::Start => Some(None),
            CursorState::Next(token) => Some(Some(token.clone())),
            CursorState::Exhausted => None,
        }
    }

    /// Record the token returned with the page just fetched. Has no effect
    /// once the cursor is exhausted.
    pub fn advance(&mut self, next_token: Option<String>) {
        if self.state == CursorState::Exhausted {
            return;
        }
        self.state = match next_token {
            Some(token) if !token.is_empty() => CursorState::Next(token),
            _ => CursorState::Exhausted,
        };
    }
}
