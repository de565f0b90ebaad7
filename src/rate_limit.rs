use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

/// Per-IP-per-form submission rate limiter using a sliding window.
pub struct SubmissionRateLimiter {
    /// (form_id, ip) -> (count, window_start)
    entries: DashMap<(Uuid, IpAddr), (u32, Instant)>,
}

impl SubmissionRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if a submission is allowed. Returns Ok(()) or Err with retry-after seconds.
    pub fn check(&self, form_id: Uuid, ip: IpAddr, limit: u32, window_secs: u64) -> Result<(), u64> {
        let key = (form_id, ip);
        let window = Duration::from_secs(window_secs);
        let now = Instant::now();

        let mut entry = self.entries.entry(key).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
            return Ok(());
        }

        if *count >= limit {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(window_secs.saturating_sub(elapsed));
        }

        *count += 1;
        Ok(())
    }

    /// Remove stale entries older than the given duration.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}

impl Default for SubmissionRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_limit_then_rejects() {
        let limiter = SubmissionRateLimiter::new();
        let form = Uuid::now_v7();
        let ip: IpAddr = "10.0.0.1".parse().unwrap();

        for _ in 0..3 {
            assert!(limiter.check(form, ip, 3, 60).is_ok());
        }
        assert!(limiter.check(form, ip, 3, 60).is_err());
    }

    #[test]
    fn separate_ips_tracked_independently() {
        let limiter = SubmissionRateLimiter::new();
        let form = Uuid::now_v7();
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(form, a, 1, 60).is_ok());
        assert!(limiter.check(form, a, 1, 60).is_err());
        assert!(limiter.check(form, b, 1, 60).is_ok());
    }
}
