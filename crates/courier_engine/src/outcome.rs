use rand::Rng;

/// Decides whether a simulated attempt succeeds.
pub trait OutcomeSource: Send + Sync {
    fn draw(&self, success_rate: f64) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOutcomes;

impl OutcomeSource for RandomOutcomes {
    fn draw(&self, success_rate: f64) -> bool {
        rand::rng().random::<f64>() < success_rate.clamp(0.0, 1.0)
    }
}
