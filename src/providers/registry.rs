use crate::engine::adapter::ProviderAdapter;
use crate::http::{ProviderInfo, ProvidersResponse};
use crate::providers::{aliae, sanef};
use std::sync::Arc;

/// Provider id → adapter. Built once at process start; adapters are never
/// re-read or mutated per query.
pub struct ProviderRegistry {
    adapters: Vec<Arc<ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            adapters: vec![Arc::new(sanef::adapter()), Arc::new(aliae::adapter())],
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<ProviderAdapter>> {
        self.adapters
            .iter()
            .find(|a| a.id.eq_ignore_ascii_case(id))
            .cloned()
    }

    pub fn all(&self) -> Vec<Arc<ProviderAdapter>> {
        self.adapters.clone()
    }

    pub fn info(&self) -> ProvidersResponse {
        let providers: Vec<ProviderInfo> = self
            .adapters
            .iter()
            .map(|a| ProviderInfo {
                id: a.id.to_string(),
                entry_url: a.entry_url.to_string(),
            })
            .collect();

        ProvidersResponse {
            total: providers.len(),
            providers,
        }
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = ProviderRegistry::new();
        assert!(registry.get("sanef").is_some());
        assert!(registry.get("SANEF").is_some());
        assert!(registry.get("aliae").is_some());
        assert!(registry.get("apr").is_none());
    }

    #[test]
    fn test_info_lists_every_adapter() {
        let registry = ProviderRegistry::new();
        let info = registry.info();
        assert_eq!(info.total, 2);
        assert!(info.providers.iter().any(|p| p.id == "sanef"));
    }

    #[test]
    fn test_adapter_patterns_compile() {
        // Adapter construction panics on a malformed hardcoded pattern;
        // building the registry is the check.
        let registry = ProviderRegistry::new();
        for adapter in registry.all() {
            assert!(!adapter.plate_input_strategies.is_empty());
            assert!(!adapter.submit_strategies.is_empty());
        }
    }
}
