use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use http::{header, HeaderMap, HeaderValue, Method, Request, Uri};

/// An outgoing GitHub REST call. Kept as owned parts so it can be replayed
/// on every retry attempt.
#[derive(Debug, Clone)]
pub struct GithubRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Vec<u8>,
    key: String,
}

impl GithubRequest {
    pub fn new(inner: Request<Vec<u8>>) -> Result<Self> {
        if !inner.headers().contains_key(header::USER_AGENT) {
            return Err(anyhow!("user-agent header required"));
        }

        let (parts, body) = inner.into_parts();
        let key = request_key(&parts.method, &parts.uri);
        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            key,
        })
    }

    pub fn to_http(&self) -> Result<Request<Vec<u8>>> {
        let mut builder = Request::builder()
            .method(self.method.clone())
            .uri(self.uri.clone());
        for (name, value) in self.headers.iter() {
            builder = builder.header(name, value);
        }
        Ok(builder.body(self.body.clone())?)
    }

    pub fn set_header(&mut self, name: header::HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// `METHOD path?query`, used to identify the call in logs and errors.
    pub fn key(&self) -> &str {
        &self.key
    }
}

fn request_key(method: &Method, uri: &Uri) -> String {
    match uri.query() {
        Some(query) => format!("{method} {}?{query}", uri.path()),
        None => format!("{method} {}", uri.path()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitUpdate {
    pub limit: i64,
    pub remaining: i64,
    pub reset: DateTime<Utc>,
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())
}

pub fn parse_rate_limit(headers: &HeaderMap) -> Option<RateLimitUpdate> {
    let limit = header_i64(headers, "x-ratelimit-limit")?;
    let remaining = header_i64(headers, "x-ratelimit-remaining")?;
    let reset = DateTime::from_timestamp(header_i64(headers, "x-ratelimit-reset")?, 0)?;
    Some(RateLimitUpdate {
        limit,
        remaining,
        reset,
    })
}

#[derive(Debug, Clone)]
pub struct RetryAdvice {
    pub wait: Duration,
    pub reason: &'static str,
}

/// `Retry-After` in either delta-seconds or HTTP-date form. A date in the
/// past yields no advice.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<RetryAdvice> {
    let value = headers.get(header::RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(RetryAdvice {
            wait: Duration::from_secs(seconds),
            reason: "retry_after",
        });
    }
    let date = httpdate::parse_http_date(value).ok()?;
    let wait = date.duration_since(std::time::SystemTime::now()).ok()?;
    Some(RetryAdvice {
        wait,
        reason: "retry_after_date",
    })
}
