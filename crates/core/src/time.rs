use chrono::{DateTime, Duration, Utc};

/// Clock abstraction so upload dates and quiz timing stay deterministic in tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Whole seconds elapsed between `since` and now, clamped at zero.
    #[must_use]
    pub fn elapsed_secs_since(&self, since: DateTime<Utc>) -> u64 {
        let secs = (self.now() - since).num_seconds();
        u64::try_from(secs).unwrap_or(0)
    }
}

/// Deterministic timestamp for tests (2024-01-15T00:00:00Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_705_276_800;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances_and_measures_elapsed() {
        let start = fixed_now();
        let mut clock = fixed_clock();
        clock.advance(Duration::seconds(95));
        assert_eq!(clock.elapsed_secs_since(start), 95);
    }

    #[test]
    fn elapsed_is_clamped_when_since_is_in_the_future() {
        let clock = fixed_clock();
        let later = fixed_now() + Duration::seconds(10);
        assert_eq!(clock.elapsed_secs_since(later), 0);
    }
}
