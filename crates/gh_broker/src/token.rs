use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::model::RateLimitUpdate;

const DEFAULT_LIMIT: i64 = 5000;

#[derive(Debug, Clone)]
pub struct GithubToken {
    pub id: String,
    pub secret: String,
}

impl GithubToken {
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitState {
    pub limit: i64,
    pub remaining: i64,
    pub reset_at: DateTime<Utc>,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            remaining: DEFAULT_LIMIT,
            reset_at: Utc::now(),
        }
    }
}

impl RateLimitState {
    pub fn update(&mut self, update: RateLimitUpdate) {
        self.limit = update.limit;
        self.remaining = update.remaining;
        self.reset_at = update.reset;
    }

    pub fn consume(&mut self, cost: i64) {
        self.remaining = (self.remaining - cost).max(0);
    }

    fn usable(&self, now: DateTime<Utc>) -> bool {
        self.remaining > 0 || self.reset_at <= now
    }

    fn ratio(&self) -> f64 {
        self.remaining as f64 / self.limit.max(1) as f64
    }
}

#[derive(Debug)]
struct TokenState {
    token: GithubToken,
    rate: RateLimitState,
}

pub enum TokenSelection {
    Token(GithubToken),
    Wait(Duration),
}

#[derive(Clone)]
pub struct TokenPool {
    inner: Arc<Mutex<Vec<TokenState>>>,
}

impl TokenPool {
    pub fn new(tokens: Vec<GithubToken>) -> Self {
        let states = tokens
            .into_iter()
            .map(|token| TokenState {
                token,
                rate: RateLimitState::default(),
            })
            .collect();
        Self {
            inner: Arc::new(Mutex::new(states)),
        }
    }

    /// Picks the token with the largest share of its budget left, or reports
    /// how long to wait for the earliest reset when every token is drained.
    pub async fn pick_token(&self) -> TokenSelection {
        let guard = self.inner.lock().await;
        let now = Utc::now();

        let best = guard
            .iter()
            .filter(|state| state.rate.usable(now))
            .max_by(|a, b| a.rate.ratio().total_cmp(&b.rate.ratio()));
        if let Some(state) = best {
            return TokenSelection::Token(state.token.clone());
        }

        let next_reset = guard
            .iter()
            .map(|state| (state.rate.reset_at - now).to_std().unwrap_or_default())
            .min();
        // No tokens at all: back off and let the caller's retry loop decide.
        TokenSelection::Wait(next_reset.unwrap_or(Duration::from_secs(30)))
    }

    pub async fn update(&self, token_id: &str, update: RateLimitUpdate) {
        let mut guard = self.inner.lock().await;
        if let Some(state) = guard.iter_mut().find(|s| s.token.id == token_id) {
            state.rate.update(update);
        }
    }

    pub async fn consume(&self, token_id: &str, amount: i64) {
        let mut guard = self.inner.lock().await;
        if let Some(state) = guard.iter_mut().find(|s| s.token.id == token_id) {
            state.rate.consume(amount);
        }
    }

    /// `(limit, remaining)` for one token.
    pub async fn numbers(&self, token_id: &str) -> Option<(i64, i64)> {
        let guard = self.inner.lock().await;
        guard
            .iter()
            .find(|s| s.token.id == token_id)
            .map(|s| (s.rate.limit, s.rate.remaining))
    }
}
