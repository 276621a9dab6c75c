use std::time::Duration;

use tokio::time::Instant;

/// Lets an event through at most once per `interval`.
#[derive(Debug)]
pub struct ToastThrottle {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl ToastThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    /// Returns `true` and records the time when the event may fire now.
    pub fn try_fire(&mut self) -> bool {
        let now = Instant::now();
        let allowed = self
            .last_fired
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if allowed {
            self.last_fired = Some(now);
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_at_most_once_per_interval() {
        let mut throttle = ToastThrottle::new(Duration::from_secs(8));

        assert!(throttle.try_fire());
        assert!(!throttle.try_fire());

        tokio::time::advance(Duration::from_secs(7)).await;
        assert!(!throttle.try_fire());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(throttle.try_fire());
        assert!(!throttle.try_fire());
    }
}
