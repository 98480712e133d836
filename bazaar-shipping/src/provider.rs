use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rates::RateError;

/// A configured carrier provider. Rate shopping walks providers in
/// descending `priority` order and skips disabled ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingProvider {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub enabled: bool,
    pub priority: i32,
}

#[async_trait]
pub trait ProviderStore: Send + Sync {
    /// Enabled providers, highest priority first.
    async fn list_enabled(&self) -> Result<Vec<ShippingProvider>, RateError>;

    async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<(), RateError>;
}

/// Fixed provider list for tests and local runs.
pub struct StaticProviders {
    providers: std::sync::Mutex<Vec<ShippingProvider>>,
}

impl StaticProviders {
    pub fn new(providers: Vec<ShippingProvider>) -> Self {
        Self {
            providers: std::sync::Mutex::new(providers),
        }
    }
}

#[async_trait]
impl ProviderStore for StaticProviders {
    async fn list_enabled(&self) -> Result<Vec<ShippingProvider>, RateError> {
        let mut enabled: Vec<ShippingProvider> = self
            .providers
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.enabled)
            .cloned()
            .collect();
        enabled.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(enabled)
    }

    async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<(), RateError> {
        let mut providers = self.providers.lock().unwrap();
        let provider = providers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RateError::ProviderNotFound(id))?;
        provider.enabled = enabled;
        Ok(())
    }
}
