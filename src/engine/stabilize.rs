use crate::browser::page::PageDriver;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Per-layer ceilings. The pipeline never blocks longer than their sum.
#[derive(Debug, Clone)]
pub struct StabilizeBudget {
    pub ready_ms: u64,
    pub network_idle_ms: u64,
    pub settle_ms: u64,
}

/// Bounded wait for the page to quiet down. Never errors: many provider
/// pages keep background polling connections open forever, so a timeout
/// means "stabilization assumed", not failure.
///
/// Layered: DOM readiness, then network quiescence, then a short fixed
/// delay for client-side rendering.
pub async fn settle(page: &dyn PageDriver, budget: &StabilizeBudget) {
    let ready_deadline = Instant::now() + Duration::from_millis(budget.ready_ms);
    loop {
        match page.ready_state().await {
            Ok(state) if state == "complete" || state == "interactive" => break,
            _ => {}
        }
        if Instant::now() >= ready_deadline {
            tracing::warn!("⚠️ Readiness timeout after {}ms, continuing", budget.ready_ms);
            break;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    let idle_deadline = Instant::now() + Duration::from_millis(budget.network_idle_ms);
    loop {
        match page.inflight_requests().await {
            Ok(0) => break,
            _ => {}
        }
        if Instant::now() >= idle_deadline {
            tracing::debug!(
                "Network not idle after {}ms, stabilization assumed",
                budget.network_idle_ms
            );
            break;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    tokio::time::sleep(Duration::from_millis(budget.settle_ms)).await;
}
