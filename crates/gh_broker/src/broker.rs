use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use http::{header, HeaderValue, Request, Response, StatusCode};
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::backoff::BackoffPolicy;
use crate::error::HttpStatusError;
use crate::model::{parse_rate_limit, parse_retry_after, GithubRequest};
use crate::token::{GithubToken, TokenPool, TokenSelection};

pub const MAX_ATTEMPTS: u32 = 5;

#[async_trait]
pub trait HttpExec: Send + Sync {
    async fn execute(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>>;
}

pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpExec for ReqwestExecutor {
    async fn execute(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let (parts, body) = req.into_parts();
        let resp = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await?;

        let mut response = Response::new(bytes.to_vec());
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Executes authenticated GitHub requests with rate-limit aware retries.
pub trait GithubBroker: Send + Sync {
    fn execute(&self, request: Request<Vec<u8>>)
        -> BoxFuture<'static, Result<Response<Vec<u8>>>>;
}

#[derive(Clone)]
pub struct GithubBrokerBuilder {
    tokens: Vec<GithubToken>,
    user_agent: String,
    http_exec: Option<Arc<dyn HttpExec>>,
    max_inflight: usize,
    backoff: BackoffPolicy,
    retry_margin: Duration,
    secondary_limit_wait: Duration,
}

impl GithubBrokerBuilder {
    pub fn new(tokens: Vec<GithubToken>) -> Self {
        Self {
            tokens,
            user_agent: "github-weekly-log".to_string(),
            http_exec: None,
            max_inflight: 8,
            backoff: BackoffPolicy::default(),
            retry_margin: Duration::from_secs(1),
            secondary_limit_wait: Duration::from_secs(3),
        }
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn http_exec(mut self, exec: Arc<dyn HttpExec>) -> Self {
        self.http_exec = Some(exec);
        self
    }

    pub fn max_inflight(mut self, max: usize) -> Self {
        self.max_inflight = max.max(1);
        self
    }

    pub fn backoff(mut self, base: Duration, max: Duration, jitter: f32) -> Self {
        self.backoff = BackoffPolicy {
            base,
            max,
            jitter_frac: jitter,
        };
        self
    }

    /// Extra sleep on top of `Retry-After`, and the fixed pause used for
    /// 403/429 responses that carry no `Retry-After`.
    pub fn rate_limit_waits(mut self, retry_margin: Duration, secondary: Duration) -> Self {
        self.retry_margin = retry_margin;
        self.secondary_limit_wait = secondary;
        self
    }

    pub fn build(self) -> Result<Arc<dyn GithubBroker>> {
        let exec = match self.http_exec {
            Some(exec) => exec,
            None => Arc::new(ReqwestExecutor::new(&self.user_agent)?),
        };

        let inner = Inner {
            http_exec: exec,
            token_pool: TokenPool::new(self.tokens),
            inflight: Arc::new(Semaphore::new(self.max_inflight)),
            backoff: self.backoff,
            retry_margin: self.retry_margin,
            secondary_limit_wait: self.secondary_limit_wait,
        };
        Ok(Arc::new(LocalGithubBroker {
            inner: Arc::new(inner),
        }))
    }
}

struct Inner {
    http_exec: Arc<dyn HttpExec>,
    token_pool: TokenPool,
    inflight: Arc<Semaphore>,
    backoff: BackoffPolicy,
    retry_margin: Duration,
    secondary_limit_wait: Duration,
}

#[derive(Clone)]
pub struct LocalGithubBroker {
    inner: Arc<Inner>,
}

impl GithubBroker for LocalGithubBroker {
    fn execute(
        &self,
        request: Request<Vec<u8>>,
    ) -> BoxFuture<'static, Result<Response<Vec<u8>>>> {
        let inner = self.inner.clone();
        async move {
            let request = GithubRequest::new(request)?;
            run_with_retries(inner, request).await
        }
        .boxed()
    }
}

async fn run_with_retries(inner: Arc<Inner>, request: GithubRequest) -> Result<Response<Vec<u8>>> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match execute_once(&inner, request.clone()).await {
            Ok(response) => return Ok(response),
            Err(err) => {
                let retry_allowed = err
                    .downcast_ref::<HttpStatusError>()
                    .map_or(true, HttpStatusError::is_retryable);
                if !retry_allowed || attempt >= MAX_ATTEMPTS {
                    return Err(err);
                }

                warn!(
                    attempt,
                    request = %request.key(),
                    error = %err,
                    "GitHub request attempt failed"
                );
                sleep(inner.backoff.delay(attempt - 1)).await;
            }
        }
    }
}

async fn execute_once(inner: &Inner, mut request: GithubRequest) -> Result<Response<Vec<u8>>> {
    let permit = inner.inflight.clone().acquire_owned().await?;

    let token = loop {
        match inner.token_pool.pick_token().await {
            TokenSelection::Token(token) => break token,
            TokenSelection::Wait(wait) => {
                warn!(wait_seconds = wait.as_secs(), "all GitHub tokens exhausted; waiting for reset");
                sleep(wait + inner.retry_margin).await;
            }
        }
    };

    request.set_header(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("token {}", token.secret))?,
    );

    let started = std::time::Instant::now();
    let response = inner.http_exec.execute(request.to_http()?).await;
    drop(permit);
    let resp = response?;

    let status = resp.status();
    debug!(
        request = %request.key(),
        status = status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "GitHub request completed"
    );

    if let Some(update) = parse_rate_limit(resp.headers()) {
        inner.token_pool.update(&token.id, update).await;
    }

    if status.is_success() {
        inner.token_pool.consume(&token.id, 1).await;
        return Ok(resp);
    }

    let headers = resp.headers();
    let rate_info = parse_rate_limit(headers);
    let request_id = headers
        .get("x-github-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    if let Some(retry) = parse_retry_after(headers) {
        warn!(
            status = %status,
            request = %request.key(),
            github_request_id = request_id,
            retry_after_seconds = retry.wait.as_secs(),
            reason = retry.reason,
            rate_limit_remaining = rate_info.as_ref().map(|data| data.remaining),
            "GitHub responded with retryable status"
        );
        sleep(retry.wait + inner.retry_margin).await;
    } else if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        warn!(
            status = %status,
            request = %request.key(),
            github_request_id = request_id,
            rate_limit_remaining = rate_info.as_ref().map(|data| data.remaining),
            "GitHub returned secondary rate limit response"
        );
        sleep(inner.secondary_limit_wait).await;
    } else if status != StatusCode::NOT_FOUND && status != StatusCode::CONFLICT {
        warn!(
            status = %status,
            request = %request.key(),
            github_request_id = request_id,
            body_preview = %body_preview(resp.body()),
            "GitHub returned error response"
        );
    }

    Err(HttpStatusError::new(status, request.key()).into())
}

fn body_preview(body: &[u8]) -> String {
    const LIMIT: usize = 256;
    let text = String::from_utf8_lossy(body);
    let mut truncated: String = text.chars().take(LIMIT).collect();
    if truncated.len() < text.len() {
        truncated.push('…');
    }
    truncated
}
