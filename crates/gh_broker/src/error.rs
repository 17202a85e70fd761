use http::StatusCode;

/// Final non-success status returned by GitHub after retries are exhausted
/// or for statuses that are never retried.
#[derive(Debug, thiserror::Error)]
#[error("unexpected status {status} for {endpoint}")]
pub struct HttpStatusError {
    pub status: StatusCode,
    pub endpoint: String,
}

impl HttpStatusError {
    pub fn new(status: StatusCode, endpoint: impl Into<String>) -> Self {
        Self {
            status,
            endpoint: endpoint.into(),
        }
    }

    /// 4xx responses other than 403 and 429 will not change on retry.
    pub fn is_retryable(&self) -> bool {
        !self.status.is_client_error()
            || self.status == StatusCode::FORBIDDEN
            || self.status == StatusCode::TOO_MANY_REQUESTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(HttpStatusError::new(StatusCode::BAD_GATEWAY, "GET /").is_retryable());
        assert!(HttpStatusError::new(StatusCode::FORBIDDEN, "GET /").is_retryable());
        assert!(HttpStatusError::new(StatusCode::TOO_MANY_REQUESTS, "GET /").is_retryable());
        assert!(!HttpStatusError::new(StatusCode::NOT_FOUND, "GET /").is_retryable());
        assert!(!HttpStatusError::new(StatusCode::CONFLICT, "GET /").is_retryable());
    }

    #[test]
    fn display_names_the_endpoint() {
        let err = HttpStatusError::new(StatusCode::NOT_FOUND, "GET /repos/a/b");
        assert_eq!(err.to_string(), "unexpected status 404 Not Found for GET /repos/a/b");
    }
}
