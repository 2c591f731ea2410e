use crate::engine::pipeline::CheckEngine;
use crate::http::CheckResponse;
use crate::providers::ProviderRegistry;
use crate::utils::{mask_plate, PlateValue};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Fans one plate out to every configured provider. Each task owns its own
/// browsing session, so there is no shared page state to lock.
pub struct CheckAggregator {
    registry: Arc<ProviderRegistry>,
    engine: Arc<CheckEngine>,
}

impl CheckAggregator {
    pub fn new(registry: Arc<ProviderRegistry>, engine: Arc<CheckEngine>) -> Self {
        Self { registry, engine }
    }

    pub async fn check_all(&self, plate: &PlateValue) -> Vec<CheckResponse> {
        let adapters = self.registry.all();
        tracing::info!(
            "🚀 Checking plate {} on {} providers...",
            mask_plate(plate.as_str()),
            adapters.len()
        );

        let mut join_set = JoinSet::new();

        for adapter in adapters {
            let engine = self.engine.clone();
            let plate = plate.clone();
            join_set.spawn(async move {
                let result = engine.check(&adapter, &plate).await;
                CheckResponse::from_result(adapter.id, &plate, result)
            });
        }

        let mut responses = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(response) => responses.push(response),
                Err(e) => tracing::error!("❌ Check task join error: {}", e),
            }
        }

        let due = responses.iter().filter(|r| r.has_due == Some(true)).count();
        let failed = responses.iter().filter(|r| !r.ok).count();
        tracing::info!(
            "📊 Done: {} due, {} clear, {} failed",
            due,
            responses.len() - due - failed,
            failed
        );

        responses.sort_by(|a, b| a.provider.cmp(&b.provider));
        responses
    }
}
