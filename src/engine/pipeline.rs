use crate::browser::session::SessionProvisioner;
use crate::engine::adapter::ProviderAdapter;
use crate::engine::capture::{Checkpoint, DiagnosticCapture, ScreenshotSink};
use crate::engine::extract::{self, Extraction};
use crate::engine::outcome::{classify, AutomationResult, CheckFailure, Outcome, Screenshots};
use crate::engine::stabilize::{self, StabilizeBudget};
use crate::engine::{consent, form, locator};
use crate::utils::{mask_plate, PlateValue};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EngineTimeouts {
    pub navigation_ms: u64,
    /// After the entry navigation.
    pub initial: StabilizeBudget,
    /// After submitting the plate; result pages load slowly.
    pub post_submit: StabilizeBudget,
}

impl Default for EngineTimeouts {
    fn default() -> Self {
        Self {
            navigation_ms: 60_000,
            initial: StabilizeBudget {
                ready_ms: 10_000,
                network_idle_ms: 5_000,
                settle_ms: 800,
            },
            post_submit: StabilizeBudget {
                ready_ms: 5_000,
                network_idle_ms: 15_000,
                settle_ms: 1_200,
            },
        }
    }
}

/// One linear pipeline per query:
/// navigate → consent → capture(before) → locate plate input → fill →
/// locate submit → submit → stabilize → extract → classify →
/// capture(after | error).
///
/// The session provisioner and screenshot sink are injected so the engine
/// carries no environment-conditional branching of its own.
pub struct CheckEngine {
    provisioner: Arc<dyn SessionProvisioner>,
    sink: Arc<dyn ScreenshotSink>,
    timeouts: EngineTimeouts,
}

impl CheckEngine {
    pub fn new(
        provisioner: Arc<dyn SessionProvisioner>,
        sink: Arc<dyn ScreenshotSink>,
        timeouts: EngineTimeouts,
    ) -> Self {
        Self {
            provisioner,
            sink,
            timeouts,
        }
    }

    /// Runs one check. Always returns a terminal outcome within the sum of
    /// the configured budgets, and always releases the session.
    pub async fn check(&self, adapter: &ProviderAdapter, plate: &PlateValue) -> AutomationResult {
        let query_id = Uuid::new_v4().to_string();
        tracing::info!(
            "🔎 [{}] {} : checking plate {}",
            query_id,
            adapter.id,
            mask_plate(plate.as_str())
        );

        let session = match self.provisioner.acquire(adapter).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("❌ [{}] Session unavailable: {}", query_id, e);
                return AutomationResult {
                    outcome: Outcome::Error {
                        message: format!("session unavailable: {}", e),
                    },
                    screenshots: Screenshots::default(),
                };
            }
        };
        let page = session.page();
        let capture = DiagnosticCapture::new(self.sink.as_ref(), &query_id);
        let mut shots = Screenshots::default();

        let driven = self
            .drive(page.as_ref(), adapter, plate, &capture, &mut shots)
            .await;

        let outcome = match &driven {
            Ok(extraction) => classify(Ok(extraction), adapter),
            Err(failure) => {
                shots.error = capture.capture(page.as_ref(), Checkpoint::Error).await;
                classify(Err(failure), adapter)
            }
        };

        session.close().await;

        match &outcome {
            Outcome::Due { amount_minor, .. } => {
                tracing::info!("✅ [{}] {} : due {:?}", query_id, adapter.id, amount_minor)
            }
            Outcome::NoDue => tracing::info!("✅ [{}] {} : no due", query_id, adapter.id),
            Outcome::Error { message } => {
                tracing::error!("❌ [{}] {} : {}", query_id, adapter.id, message)
            }
            Outcome::Pending => {}
        }

        AutomationResult {
            outcome,
            screenshots: shots,
        }
    }

    async fn drive(
        &self,
        page: &dyn crate::browser::page::PageDriver,
        adapter: &ProviderAdapter,
        plate: &PlateValue,
        capture: &DiagnosticCapture<'_>,
        shots: &mut Screenshots,
    ) -> Result<Extraction, CheckFailure> {
        let nav = tokio::time::timeout(
            Duration::from_millis(self.timeouts.navigation_ms),
            page.goto(adapter.entry_url),
        )
        .await;
        match nav {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(CheckFailure::Navigation(e.to_string())),
            Err(_) => {
                return Err(CheckFailure::Navigation(format!(
                    "timed out after {}ms",
                    self.timeouts.navigation_ms
                )))
            }
        }

        stabilize::settle(page, &self.timeouts.initial).await;
        consent::resolve(page, adapter).await;

        shots.before = capture.capture(page, Checkpoint::Before).await;

        // Mode toggles on multi-step forms, before the input exists.
        for strategy in &adapter.pre_fill_strategies {
            if let Some(handle) = locator::locate(page, std::slice::from_ref(strategy)).await {
                if page.click(handle).await.is_err() {
                    let _ = page.force_click(handle).await;
                }
            }
        }

        let input = locator::locate(page, &adapter.plate_input_strategies)
            .await
            .ok_or(CheckFailure::ElementNotFound)?;

        form::fill(page, input, plate).await.map_err(|e| {
            tracing::warn!("Plate fill failed: {}", e);
            CheckFailure::SubmissionFailed
        })?;

        let button = locator::locate(page, &adapter.submit_strategies)
            .await
            .ok_or(CheckFailure::ElementNotFound)?;

        form::submit(page, button).await.map_err(|e| {
            tracing::warn!("Submit failed: {}", e);
            CheckFailure::SubmissionFailed
        })?;

        // Account popins and "continue" interstitials.
        for strategy in &adapter.post_submit_dismiss_strategies {
            if let Some(handle) = locator::locate(page, std::slice::from_ref(strategy)).await {
                if page.click(handle).await.is_err() {
                    let _ = page.force_click(handle).await;
                }
            }
        }

        stabilize::settle(page, &self.timeouts.post_submit).await;

        let extraction = extract::extract(page, adapter)
            .await
            .map_err(|e| CheckFailure::Unexpected(e.to_string()))?;

        shots.after = capture.capture(page, Checkpoint::After).await;

        Ok(extraction)
    }
}
