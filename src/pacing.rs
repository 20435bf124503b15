//! Driver timing: gravity, input polling and the difficulty ramp
//!
//! Three independent clocks. Gravity speeds up by a fixed rate every second
//! of play and returns to its base rate on restart.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const RAMP_PERIOD: Duration = Duration::from_secs(1);

/// Timing knobs, in events per second
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Gravity drops per second at the start of a round
    pub base_fall_rate: f64,
    /// Added to the fall rate for every second of play
    pub ramp_per_second: f64,
    /// Input polls per second
    pub input_rate: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_fall_rate: 1.3,
            ramp_per_second: 0.01,
            input_rate: 60.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pacing {
    config: PacingConfig,
    fall_rate: f64,
    last_fall: Instant,
    last_input: Instant,
    last_ramp: Instant,
}

impl Pacing {
    pub fn new(config: PacingConfig, now: Instant) -> Self {
        Self {
            fall_rate: config.base_fall_rate,
            config,
            last_fall: now,
            last_input: now,
            last_ramp: now,
        }
    }

    /// Current gravity rate in drops per second
    pub fn fall_rate(&self) -> f64 {
        self.fall_rate
    }

    pub fn fall_interval(&self) -> Duration {
        interval(self.fall_rate)
    }

    pub fn input_interval(&self) -> Duration {
        interval(self.config.input_rate)
    }

    /// Speed gravity up once per elapsed ramp period while the round is live
    pub fn ramp(&mut self, now: Instant, lost: bool) -> bool {
        if lost || now.duration_since(self.last_ramp) < RAMP_PERIOD {
            return false;
        }
        self.fall_rate += self.config.ramp_per_second;
        self.last_ramp = now;
        true
    }

    /// Whether an input poll is due; restarts the input clock when it is
    pub fn input_due(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_input) < self.input_interval() {
            return false;
        }
        self.last_input = now;
        true
    }

    /// Whether a gravity step is due; restarts the gravity clock when it is
    pub fn fall_due(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_fall) < self.fall_interval() {
            return false;
        }
        self.last_fall = now;
        true
    }

    /// Restart the gravity clock, e.g. after a manual soft drop
    pub fn reset_fall(&mut self, now: Instant) {
        self.last_fall = now;
    }

    /// Back to base speed with every clock restarted
    pub fn reset(&mut self, now: Instant) {
        self.fall_rate = self.config.base_fall_rate;
        self.last_fall = now;
        self.last_input = now;
        self.last_ramp = now;
    }

    /// How long the driver may block before the next gravity or input tick
    pub fn until_next_tick(&self, now: Instant) -> Duration {
        let fall = remaining(self.last_fall, self.fall_interval(), now);
        let input = remaining(self.last_input, self.input_interval(), now);
        fall.min(input)
    }
}

fn remaining(since: Instant, interval: Duration, now: Instant) -> Duration {
    since
        .checked_add(interval)
        .map_or(Duration::MAX, |deadline| deadline.saturating_duration_since(now))
}

fn interval(rate: f64) -> Duration {
    if rate <= 0.0 || !rate.is_finite() {
        return Duration::MAX;
    }
    Duration::from_secs_f64(1.0 / rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacing(now: Instant) -> Pacing {
        Pacing::new(PacingConfig::default(), now)
    }

    #[test]
    fn test_fall_interval_from_rate() {
        let start = Instant::now();
        let pacing = pacing(start);
        assert_eq!(pacing.fall_interval(), Duration::from_secs_f64(1.0 / 1.3));
        assert_eq!(pacing.input_interval(), Duration::from_secs_f64(1.0 / 60.0));
    }

    #[test]
    fn test_ramp_once_per_second_while_playing() {
        let start = Instant::now();
        let mut pacing = pacing(start);

        assert!(!pacing.ramp(start + Duration::from_millis(999), false));
        assert!(pacing.ramp(start + Duration::from_secs(1), false));
        assert!((pacing.fall_rate() - 1.31).abs() < 1e-9);

        assert!(!pacing.ramp(start + Duration::from_millis(1500), false));
        assert!(pacing.ramp(start + Duration::from_secs(2), false));
        assert!((pacing.fall_rate() - 1.32).abs() < 1e-9);
        assert!(pacing.fall_interval() < Duration::from_secs_f64(1.0 / 1.3));
    }

    #[test]
    fn test_no_ramp_while_lost() {
        let start = Instant::now();
        let mut pacing = pacing(start);
        assert!(!pacing.ramp(start + Duration::from_secs(5), true));
        assert_eq!(pacing.fall_rate(), 1.3);
    }

    #[test]
    fn test_reset_restores_base_rate() {
        let start = Instant::now();
        let mut pacing = pacing(start);
        for second in 1..=10 {
            pacing.ramp(start + Duration::from_secs(second), false);
        }
        assert!(pacing.fall_rate() > 1.3);

        pacing.reset(start + Duration::from_secs(10));
        assert_eq!(pacing.fall_rate(), 1.3);
    }

    #[test]
    fn test_fall_due_restarts_clock() {
        let start = Instant::now();
        let mut pacing = pacing(start);
        let step = pacing.fall_interval();

        assert!(!pacing.fall_due(start + step / 2));
        assert!(pacing.fall_due(start + step));
        assert!(!pacing.fall_due(start + step + step / 2));

        pacing.reset_fall(start + step * 2);
        assert!(!pacing.fall_due(start + step * 2 + step / 2));
    }

    #[test]
    fn test_input_due() {
        let start = Instant::now();
        let mut pacing = pacing(start);
        assert!(!pacing.input_due(start));
        assert!(pacing.input_due(start + Duration::from_millis(17)));
    }

    #[test]
    fn test_until_next_tick_is_earliest_clock() {
        let start = Instant::now();
        let pacing = pacing(start);
        assert_eq!(pacing.until_next_tick(start), pacing.input_interval());
        assert_eq!(pacing.until_next_tick(start + Duration::from_secs(5)), Duration::ZERO);
    }

    #[test]
    fn test_zero_rate_never_fires() {
        let start = Instant::now();
        let config = PacingConfig {
            base_fall_rate: 0.0,
            ..PacingConfig::default()
        };
        let mut pacing = Pacing::new(config, start);
        assert!(!pacing.fall_due(start + Duration::from_secs(3600)));
        assert_eq!(pacing.until_next_tick(start), pacing.input_interval());
    }
}
