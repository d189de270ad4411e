//! Delay providers for the pause between cycles.

use std::time::Duration;

use rand::Rng;

/// Supplies the delay before the next cycle.
pub trait Pacing {
    fn next_delay(&mut self) -> Duration;
}

impl<F: FnMut() -> Duration> Pacing for F {
    fn next_delay(&mut self) -> Duration {
        self()
    }
}

/// Uniformly random delay within an inclusive window, millisecond resolution.
#[derive(Debug, Clone, Copy)]
pub struct UniformPacing {
    min: Duration,
    max: Duration,
}

impl UniformPacing {
    /// Swaps the bounds if they arrive reversed.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }
}

impl Pacing for UniformPacing {
    fn next_delay(&mut self) -> Duration {
        let min = millis(self.min);
        let max = millis(self.max);
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Same delay every time; `Duration::ZERO` skips pacing entirely.
#[derive(Debug, Clone, Copy)]
pub struct FixedPacing(pub Duration);

impl Pacing for FixedPacing {
    fn next_delay(&mut self) -> Duration {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_delay_stays_within_window() {
        let mut pacing = UniformPacing::new(Duration::from_secs(1800), Duration::from_secs(2100));
        for _ in 0..200 {
            let delay = pacing.next_delay();
            assert!(delay >= Duration::from_secs(1800));
            assert!(delay <= Duration::from_secs(2100));
        }
    }

    #[test]
    fn degenerate_window_is_constant() {
        let mut pacing = UniformPacing::new(Duration::from_secs(5), Duration::from_secs(5));
        assert_eq!(pacing.next_delay(), Duration::from_secs(5));
    }

    #[test]
    fn oversized_window_saturates_instead_of_wrapping() {
        let mut pacing = UniformPacing::new(Duration::MAX, Duration::MAX);
        assert_eq!(pacing.next_delay(), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn closures_act_as_pacing() {
        let mut calls = 0;
        let mut pacing = || {
            calls += 1;
            Duration::ZERO
        };
        assert_eq!(pacing.next_delay(), Duration::ZERO);
        assert_eq!(calls, 1);
    }
}
