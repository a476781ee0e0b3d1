//! Owner extraction for delivery endpoint ARNs.

/// Minimum number of colon-delimited segments a Lambda function ARN has:
/// `arn:partition:lambda:region:account:function:name`
const MIN_ENDPOINT_SEGMENTS: usize = 6;

/// Position of the account segment in an ARN
const ACCOUNT_SEGMENT: usize = 4;

/// A delivery endpoint ARN with its owning account split out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointArn<'a> {
    /// account segment
    pub account_id: &'a str,
}

impl<'a> EndpointArn<'a> {
    /// Parse a function ARN. Returns `None` for anything with fewer than six
    /// colon-delimited segments; other endpoint formats are not recognised.
    #[must_use]
    pub fn parse(arn: &'a str) -> Option<Self> {
        let parts = arn.split(':').collect::<Vec<_>>();
        if parts.len() < MIN_ENDPOINT_SEGMENTS {
            return None;
        }

        Some(Self {
            account_id: parts[ACCOUNT_SEGMENT],
        })
    }
}
