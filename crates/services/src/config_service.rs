use std::sync::Arc;

use storage::repository::ConfigRepository;
use study_core::model::{ProviderConfig, ProviderConfigDraft};
use tracing::info;

use crate::error::ConfigServiceError;

#[derive(Clone)]
pub struct ConfigService {
    repo: Arc<dyn ConfigRepository>,
}

impl ConfigService {
    #[must_use]
    pub fn new(repo: Arc<dyn ConfigRepository>) -> Self {
        Self { repo }
    }

    /// Load the persisted provider config (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigServiceError` on storage failures.
    pub async fn load(&self) -> Result<ProviderConfig, ConfigServiceError> {
        let config = self.repo.get_config().await?;
        Ok(config.unwrap_or_default())
    }

    /// Validate and persist a new provider config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigServiceError` if validation fails or persistence fails.
    pub async fn save(
        &self,
        draft: ProviderConfigDraft,
    ) -> Result<ProviderConfig, ConfigServiceError> {
        let config = draft.validate()?;
        self.repo.save_config(&config).await?;
        info!(configured = config.is_configured(), "provider config saved");
        Ok(config)
    }
}
