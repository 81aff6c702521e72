use std::time::Duration;

/// Timing and odds of the simulated run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub validation_delay: Duration,
    /// Credentials must be strictly longer than this many characters.
    pub min_credential_len: usize,
    pub group_attempt_delay: Duration,
    pub group_cooldown: Duration,
    pub group_success_rate: f64,
    pub message_attempt_delay: Duration,
    pub message_cooldown: Duration,
    pub message_success_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            validation_delay: Duration::from_millis(1000),
            min_credential_len: 10,
            group_attempt_delay: Duration::from_millis(500),
            group_cooldown: Duration::from_millis(1000),
            group_success_rate: 0.9,
            message_attempt_delay: Duration::from_millis(200),
            message_cooldown: Duration::from_millis(300),
            message_success_rate: 0.95,
        }
    }
}

impl SimulationConfig {
    /// Multiplies every delay by `factor` (clamped to be non-negative).
    pub fn with_time_scale(mut self, factor: f64) -> Self {
        let factor = if factor.is_finite() { factor.max(0.0) } else { 1.0 };
        for delay in [
            &mut self.validation_delay,
            &mut self.group_attempt_delay,
            &mut self.group_cooldown,
            &mut self.message_attempt_delay,
            &mut self.message_cooldown,
        ] {
            *delay = delay.mul_f64(factor);
        }
        self
    }

    /// A configuration with every delay set to zero.
    pub fn instant() -> Self {
        Self::default().with_time_scale(0.0)
    }
}
