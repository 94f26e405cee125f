//! HTTP client for a Judge0-compatible execution service

use async_trait::async_trait;

use crate::{
    config::JudgeConfig,
    constants::JUDGE_AUTH_HEADER,
    error::{AppError, AppResult},
};

use super::{DispatchRejection, ExecutionRequest, JudgeClient};

/// Judge client speaking the `/submissions` API
pub struct HttpJudgeClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpJudgeClient {
    pub fn new(config: &JudgeConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("judge HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn submissions_url(&self) -> String {
        format!("{}/submissions?base64_encoded=false&wait=false", self.base_url)
    }
}

#[async_trait]
impl JudgeClient for HttpJudgeClient {
    async fn submit(&self, request: &ExecutionRequest) -> Result<(), DispatchRejection> {
        let mut builder = self.http.post(self.submissions_url()).json(request);
        if let Some(token) = &self.auth_token {
            builder = builder.header(JUDGE_AUTH_HEADER, token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DispatchRejection::transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "Judge rejected execution request");
        Err(DispatchRejection::from_response(status.as_u16(), &body))
    }
}
