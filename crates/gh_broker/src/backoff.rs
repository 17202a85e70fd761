use std::time::Duration;

const MAX_DOUBLINGS: u32 = 8;

#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
    pub jitter_frac: f32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(500),
            max: Duration::from_secs(60),
            jitter_frac: 0.2,
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`,
    /// capped at `max`, then spread by `±jitter_frac`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(MAX_DOUBLINGS);
        let capped = self.base.saturating_mul(factor).min(self.max);

        let nanos = capped.as_nanos() as i128;
        let jitter = (nanos as f64 * f64::from(self.jitter_frac.clamp(0.0, 1.0))).round() as i128;
        let delta = if jitter > 0 {
            fastrand::i128(-jitter..=jitter)
        } else {
            0
        };
        Duration::from_nanos((nanos + delta).max(0) as u64)
    }
}
