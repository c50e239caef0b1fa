use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;

/// Thresholds and window lengths, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterConfig {
    pub minute_limit: u32,
    pub hour_limit: u32,
    pub minute_window_ms: u64,
    pub hour_window_ms: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            minute_limit: 3,
            hour_limit: 10,
            minute_window_ms: MILLIS_PER_MINUTE,
            hour_window_ms: 60 * MILLIS_PER_MINUTE,
        }
    }
}

/// Which window caused a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Minute,
    Hour,
}

impl Window {
    pub fn as_str(&self) -> &'static str {
        match self {
            Window::Minute => "minute",
            Window::Hour => "hour",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounter {
    pub count: u32,
    /// Epoch millis after which the window is expired.
    pub reset_time: u64,
}

impl WindowCounter {
    fn roll_over(&mut self, now: u64, window_ms: u64) {
        if now > self.reset_time {
            *self = WindowCounter {
                count: 0,
                reset_time: now.saturating_add(window_ms),
            };
        }
    }

    /// Count as seen at `now`, without touching the stored state.
    fn live_count(&self, now: u64) -> u32 {
        if now > self.reset_time { 0 } else { self.count }
    }

    fn remaining_millis(&self, now: u64) -> u64 {
        self.reset_time.saturating_sub(now)
    }
}

/// Outcome of [`RateLimiter::check_limit`]. A denial is a normal value, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub allowed: bool,
    /// Human-readable reason, including how long to wait.
    pub error: Option<String>,
    /// Reset time (epoch millis) of the window that denied the request.
    pub reset_time: Option<u64>,
    pub window: Option<Window>,
    /// Whole seconds until `reset_time`, rounded up, measured at the same
    /// instant as the wait in `error`.
    pub retry_after_secs: Option<u64>,
}

impl CheckResult {
    fn admitted() -> Self {
        Self {
            allowed: true,
            error: None,
            reset_time: None,
            window: None,
            retry_after_secs: None,
        }
    }

    fn denied(window: Window, message: String, counter: &WindowCounter, now: u64) -> Self {
        Self {
            allowed: false,
            error: Some(message),
            reset_time: Some(counter.reset_time),
            window: Some(window),
            retry_after_secs: Some(counter.remaining_millis(now).div_ceil(MILLIS_PER_SECOND)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Remaining {
    pub minute: u32,
    pub hour: u32,
}

#[derive(Debug, Default)]
struct Windows {
    minute: WindowCounter,
    hour: WindowCounter,
}

/// Dual fixed-window admission controller.
///
/// A short (per-minute) and a long (per-hour) window each count admitted
/// calls and reset entirely, lazily, on the first check after their reset
/// time has passed. The minute window is always consulted first.
pub struct RateLimiter {
    config: LimiterConfig,
    clock: Arc<dyn Clock>,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    /// Limiter reading wall-clock time.
    pub fn new(config: LimiterConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: LimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            windows: Mutex::new(Windows::default()),
        }
    }

    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Decide whether one more call to the gated operation may proceed.
    ///
    /// Expired windows are reset first. On admission both counters are
    /// incremented; on denial neither is. The whole read-check-increment runs
    /// under one lock so racing callers cannot both take the last slot.
    pub fn check_limit(&self) -> CheckResult {
        let mut windows = self.windows.lock();
        let now = self.clock.now_millis();

        windows.minute.roll_over(now, self.config.minute_window_ms);
        windows.hour.roll_over(now, self.config.hour_window_ms);

        if windows.minute.count >= self.config.minute_limit {
            let seconds = windows
                .minute
                .remaining_millis(now)
                .div_ceil(MILLIS_PER_SECOND);
            return CheckResult::denied(
                Window::Minute,
                format!(
                    "Rate limit exceeded. You can make {} requests per minute. Try again in {} seconds.",
                    self.config.minute_limit, seconds
                ),
                &windows.minute,
                now,
            );
        }

        if windows.hour.count >= self.config.hour_limit {
            let minutes = windows
                .hour
                .remaining_millis(now)
                .div_ceil(MILLIS_PER_MINUTE);
            return CheckResult::denied(
                Window::Hour,
                format!(
                    "Hourly rate limit exceeded. You can make {} requests per hour. Try again in {} minutes.",
                    self.config.hour_limit, minutes
                ),
                &windows.hour,
                now,
            );
        }

        windows.minute.count += 1;
        windows.hour.count += 1;
        CheckResult::admitted()
    }

    /// Requests still available in each window. Read-only: an expired window
    /// reports its full limit but is not reset here.
    pub fn remaining_requests(&self) -> Remaining {
        let windows = self.windows.lock();
        let now = self.clock.now_millis();

        Remaining {
            minute: self
                .config
                .minute_limit
                .saturating_sub(windows.minute.live_count(now)),
            hour: self
                .config
                .hour_limit
                .saturating_sub(windows.hour.live_count(now)),
        }
    }

    /// Current (minute, hour) counters as stored.
    pub fn counters(&self) -> (WindowCounter, WindowCounter) {
        let windows = self.windows.lock();
        (windows.minute, windows.hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const START: u64 = 1_700_000_000_000;

    fn limiter(config: LimiterConfig) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        (RateLimiter::with_clock(config, clock.clone()), clock)
    }

    fn limits(minute_limit: u32, hour_limit: u32) -> LimiterConfig {
        LimiterConfig {
            minute_limit,
            hour_limit,
            ..LimiterConfig::default()
        }
    }

    #[test]
    fn default_config_matches_deployed_values() {
        let config = LimiterConfig::default();
        assert_eq!(config.minute_limit, 3);
        assert_eq!(config.hour_limit, 10);
        assert_eq!(config.minute_window_ms, 60_000);
        assert_eq!(config.hour_window_ms, 3_600_000);
    }

    #[test]
    fn admits_up_to_minute_limit_then_denies() {
        let (limiter, clock) = limiter(LimiterConfig::default());

        for i in 0..3 {
            let result = limiter.check_limit();
            assert!(result.allowed, "request {i} should be admitted");
            assert_eq!(result.error, None);
            assert_eq!(result.reset_time, None);
        }

        let denied = limiter.check_limit();
        assert!(!denied.allowed);
        assert_eq!(denied.window, Some(Window::Minute));
        assert!(denied.error.unwrap().contains("3 requests per minute"));

        clock.advance(61_000);
        assert!(limiter.check_limit().allowed);
        let (minute, hour) = limiter.counters();
        assert_eq!(minute.count, 1);
        assert_eq!(hour.count, 4);
    }

    #[test]
    fn denial_does_not_increment_and_repeats_same_reset_time() {
        let (limiter, _clock) = limiter(LimiterConfig::default());
        for _ in 0..3 {
            limiter.check_limit();
        }

        let first = limiter.check_limit();
        for _ in 0..5 {
            let again = limiter.check_limit();
            assert!(!again.allowed);
            assert_eq!(again.reset_time, first.reset_time);
        }
        assert_eq!(first.reset_time, Some(START + 60_000));

        let (minute, hour) = limiter.counters();
        assert_eq!(minute.count, 3);
        assert_eq!(hour.count, 3);
    }

    #[test]
    fn minute_window_rolls_over_only_after_reset_time() {
        let (limiter, clock) = limiter(LimiterConfig::default());

        assert!(limiter.check_limit().allowed);
        clock.advance(20_000);
        assert!(limiter.check_limit().allowed);
        clock.advance(39_000);
        assert!(limiter.check_limit().allowed);

        clock.set(START + 59_900);
        assert!(!limiter.check_limit().allowed);

        // exactly at reset_time the window is still open
        clock.set(START + 60_000);
        assert!(!limiter.check_limit().allowed);

        clock.set(START + 60_100);
        assert!(limiter.check_limit().allowed);
        let (minute, _) = limiter.counters();
        assert_eq!(minute.count, 1);
        assert_eq!(minute.reset_time, START + 60_100 + 60_000);
    }

    #[test]
    fn minute_window_checked_before_hour_window() {
        let (limiter, clock) = limiter(limits(1, 1));

        assert!(limiter.check_limit().allowed);
        clock.advance(2_000);

        let denied = limiter.check_limit();
        assert!(!denied.allowed);
        assert_eq!(denied.window, Some(Window::Minute));
        let message = denied.error.unwrap();
        assert!(message.contains("per minute"), "{message}");
        assert!(message.contains("58 seconds"), "{message}");
    }

    #[test]
    fn minute_message_rounds_seconds_up() {
        let (limiter, clock) = limiter(LimiterConfig::default());
        for _ in 0..3 {
            limiter.check_limit();
        }

        clock.advance(15_000);
        let denied = limiter.check_limit();
        assert_eq!(
            denied.error.as_deref(),
            Some("Rate limit exceeded. You can make 3 requests per minute. Try again in 45 seconds.")
        );

        clock.advance(500);
        let denied = limiter.check_limit();
        assert!(denied.error.unwrap().contains("45 seconds"));

        clock.set(START + 16_000);
        let denied = limiter.check_limit();
        assert!(denied.error.unwrap().contains("44 seconds"));
    }

    #[test]
    fn hour_limit_denies_with_minutes_remaining() {
        let (limiter, clock) = limiter(LimiterConfig::default());

        for i in 0..10 {
            assert!(limiter.check_limit().allowed, "request {i} should be admitted");
            clock.advance(61_000);
        }

        // START + 610s; hour window resets at START + 3600s
        let denied = limiter.check_limit();
        assert!(!denied.allowed);
        assert_eq!(denied.window, Some(Window::Hour));
        assert_eq!(denied.reset_time, Some(START + 3_600_000));
        assert_eq!(
            denied.error.as_deref(),
            Some(
                "Hourly rate limit exceeded. You can make 10 requests per hour. Try again in 50 minutes."
            )
        );

        let (minute, hour) = limiter.counters();
        assert_eq!(minute.count, 0);
        assert_eq!(hour.count, 10);
    }

    #[test]
    fn hour_window_rolls_over() {
        let (limiter, clock) = limiter(limits(10, 2));
        assert!(limiter.check_limit().allowed);
        assert!(limiter.check_limit().allowed);
        assert!(!limiter.check_limit().allowed);

        clock.advance(3_600_001);
        assert!(limiter.check_limit().allowed);
        let (_, hour) = limiter.counters();
        assert_eq!(hour.count, 1);
    }

    #[test]
    fn counts_never_exceed_limits() {
        let config = limits(3, 7);
        let (limiter, clock) = limiter(config);

        for step in 0..200u64 {
            limiter.check_limit();
            let (minute, hour) = limiter.counters();
            assert!(minute.count <= config.minute_limit);
            assert!(hour.count <= config.hour_limit);
            clock.advance(7_000 + (step % 5) * 3_000);
        }
    }

    #[test]
    fn remaining_after_two_admissions() {
        let (limiter, _clock) = limiter(LimiterConfig::default());
        assert_eq!(limiter.remaining_requests(), Remaining { minute: 3, hour: 10 });

        limiter.check_limit();
        limiter.check_limit();

        assert_eq!(limiter.remaining_requests(), Remaining { minute: 1, hour: 8 });
    }

    #[test]
    fn remaining_does_not_reset_expired_windows() {
        let (limiter, clock) = limiter(LimiterConfig::default());
        limiter.check_limit();
        limiter.check_limit();
        let before = limiter.counters();

        clock.advance(61_000);
        assert_eq!(limiter.remaining_requests(), Remaining { minute: 3, hour: 8 });
        assert_eq!(limiter.counters(), before);
    }

    #[test]
    fn retry_after_rounds_up_to_whole_seconds() {
        let (limiter, clock) = limiter(LimiterConfig::default());
        for _ in 0..3 {
            limiter.check_limit();
        }
        clock.advance(10_500);
        let denied = limiter.check_limit();
        assert_eq!(denied.retry_after_secs, Some(50));
        assert_eq!(limiter.check_limit().retry_after_secs, Some(50));
        assert_eq!(CheckResult::admitted().retry_after_secs, None);
    }

    // moves forward on every read
    struct TickingClock {
        now: std::sync::atomic::AtomicU64,
        step: u64,
    }

    impl Clock for TickingClock {
        fn now_millis(&self) -> u64 {
            self.now
                .fetch_add(self.step, std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[test]
    fn retry_after_agrees_with_message_while_clock_moves() {
        let clock = Arc::new(TickingClock {
            now: std::sync::atomic::AtomicU64::new(START),
            step: 700,
        });
        let limiter = RateLimiter::with_clock(LimiterConfig::default(), clock);
        for _ in 0..3 {
            assert!(limiter.check_limit().allowed);
        }

        for _ in 0..20 {
            let denied = limiter.check_limit();
            if denied.allowed {
                break;
            }
            let secs = denied.retry_after_secs.unwrap();
            let message = denied.error.unwrap();
            assert!(
                message.contains(&format!("Try again in {secs} seconds.")),
                "{message} vs {secs}"
            );
        }
    }

    #[test]
    fn concurrent_callers_never_overshoot() {
        let (limiter, _clock) = limiter(limits(50, 1_000));

        let admitted: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..25).filter(|_| limiter.check_limit().allowed).count()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(admitted, 50);
        let (minute, hour) = limiter.counters();
        assert_eq!(minute.count, 50);
        assert_eq!(hour.count, 50);
    }
}
