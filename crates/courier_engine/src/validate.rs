use std::time::Duration;

use crate::SimulationConfig;

#[async_trait::async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, credential: &str) -> bool;
}

/// Placeholder check: waits one fixed delay, then accepts any credential
/// longer than `min_len` characters. It performs no real authentication.
#[derive(Debug, Clone)]
pub struct LengthValidator {
    min_len: usize,
    delay: Duration,
}

impl LengthValidator {
    pub fn new(min_len: usize, delay: Duration) -> Self {
        Self { min_len, delay }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.min_credential_len, config.validation_delay)
    }
}

#[async_trait::async_trait]
impl CredentialValidator for LengthValidator {
    async fn validate(&self, credential: &str) -> bool {
        tokio::time::sleep(self.delay).await;
        credential.chars().count() > self.min_len
    }
}
