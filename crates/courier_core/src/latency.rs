/// One latency monitor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Latency {
    /// The probe request failed.
    NoSignal,
    Millis(u64),
}

impl Latency {
    /// Signed milliseconds with `-1` standing in for no signal.
    pub fn as_signed_millis(self) -> i64 {
        match self {
            Latency::NoSignal => -1,
            Latency::Millis(ms) => i64::try_from(ms).unwrap_or(i64::MAX),
        }
    }

    pub fn tier(self) -> LatencyTier {
        LatencyTier::classify(self.as_signed_millis())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyTier {
    Good,
    Medium,
    Bad,
}

impl LatencyTier {
    /// Thresholds: negative is bad, below 100 ms good, below 300 ms medium, else bad.
    pub fn classify(ms: i64) -> Self {
        match ms {
            i64::MIN..=-1 => LatencyTier::Bad,
            0..=99 => LatencyTier::Good,
            100..=299 => LatencyTier::Medium,
            _ => LatencyTier::Bad,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LatencyTier::Good => "good",
            LatencyTier::Medium => "medium",
            LatencyTier::Bad => "bad",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(LatencyTier::classify(-1), LatencyTier::Bad);
        assert_eq!(LatencyTier::classify(0), LatencyTier::Good);
        assert_eq!(LatencyTier::classify(99), LatencyTier::Good);
        assert_eq!(LatencyTier::classify(100), LatencyTier::Medium);
        assert_eq!(LatencyTier::classify(299), LatencyTier::Medium);
        assert_eq!(LatencyTier::classify(300), LatencyTier::Bad);
        assert_eq!(LatencyTier::classify(5_000), LatencyTier::Bad);
    }

    #[test]
    fn no_signal_is_bad() {
        assert_eq!(Latency::NoSignal.as_signed_millis(), -1);
        assert_eq!(Latency::NoSignal.tier(), LatencyTier::Bad);
        assert_eq!(Latency::Millis(42).tier(), LatencyTier::Good);
    }
}
