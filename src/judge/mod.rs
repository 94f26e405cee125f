//! External judge integration
//!
//! Outbound execution requests and the shape of inbound callbacks.

pub mod http;
pub mod types;

use async_trait::async_trait;

pub use http::HttpJudgeClient;
pub use types::{CallbackPayload, CallbackStatus, DispatchRejection, ExecutionRequest};

use crate::constants::CALLBACK_PATH;

/// Sends execution requests to the judge
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Queue one execution; the verdict arrives later on the request's callback URL
    async fn submit(&self, request: &ExecutionRequest) -> Result<(), DispatchRejection>;
}

/// Callback URL for one test of one submission
pub fn callback_url(
    base_url: &str,
    secret: &str,
    submission_id: i64,
    test_index: usize,
    dispatched_at: i64,
) -> String {
    format!(
        "{}{}/{}/{}/{}/{}",
        base_url.trim_end_matches('/'),
        CALLBACK_PATH,
        secret,
        submission_id,
        test_index,
        dispatched_at
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_url_embeds_correlation_keys() {
        let url = callback_url("https://arbiter.example/", "s3cret", 42, 3, 1_700_000_000_000);
        assert_eq!(
            url,
            "https://arbiter.example/api/v1/judge/callback/s3cret/42/3/1700000000000"
        );
    }
}
