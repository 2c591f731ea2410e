use crate::browser::page::PageDriver;
use crate::engine::adapter::ProviderAdapter;
use crate::engine::locator::{self, Scope, SelectorStrategy};

/// Class/id fragments of the consent SDKs seen on French toll portals,
/// plus the generic ones.
const CONSENT_MARKERS: &[&str] = &[
    "didomi",
    "axeptio",
    "tarteaucitron",
    "onetrust",
    "cookie",
    "consent",
    "cmp",
    "gdpr",
];

const FRAME_TIER_TIMEOUT_MS: u64 = 2_000;

/// Best-effort cookie/consent dismissal; never fails the pipeline.
///
/// Consent UIs are implemented with wildly different technology (native
/// DOM, iframe-hosted SDK, shadow DOM), and a banner left blocking later
/// interactions costs more than a few extra attempts, so the tiers
/// escalate: document-scoped click, iframe-scoped click, coordinate click
/// on the matched text, then hiding the banner outright.
pub async fn resolve(page: &dyn PageDriver, adapter: &ProviderAdapter) {
    if !banner_present(page, adapter).await {
        return;
    }

    // Tier 1: the provider's consent strategies against the document.
    if let Some(handle) = locator::locate(page, &adapter.consent_strategies).await {
        if page.click(handle).await.is_err() {
            let _ = page.force_click(handle).await;
        }
        if !banner_present(page, adapter).await {
            tracing::debug!("🍪 Consent dismissed (document)");
            return;
        }
    }

    // Tier 2: the same selectors, repeated against every iframe.
    let frame_strategies: Vec<SelectorStrategy> = adapter
        .consent_strategies
        .iter()
        .map(|s| SelectorStrategy {
            scope: Scope::Frames,
            selector: s.selector.clone(),
            timeout_ms: FRAME_TIER_TIMEOUT_MS,
        })
        .collect();
    if let Some(handle) = locator::locate(page, &frame_strategies).await {
        if page.click(handle).await.is_err() {
            let _ = page.force_click(handle).await;
        }
        if !banner_present(page, adapter).await {
            tracing::debug!("🍪 Consent dismissed (iframe)");
            return;
        }
    }

    // Tier 3: coordinate click for overlays that swallow normal dispatch.
    if let Ok(Some((x, y))) = page.text_center(adapter.consent_text_pattern.as_str()).await {
        let _ = page.click_at(x, y).await;
        if !banner_present(page, adapter).await {
            tracing::debug!("🍪 Consent dismissed (coordinate click)");
            return;
        }
    }

    // Tier 4: hide the banner and give the page back its scroll/pointer.
    match page.suppress_overlays(CONSENT_MARKERS).await {
        Ok(hidden) if hidden > 0 => {
            tracing::debug!("🍪 Consent suppressed ({} elements hidden)", hidden);
        }
        _ => {
            tracing::debug!("Consent banner not dismissed, continuing anyway");
        }
    }
}

/// One no-wait probe over the consent strategies plus the text pattern.
async fn banner_present(page: &dyn PageDriver, adapter: &ProviderAdapter) -> bool {
    for strategy in &adapter.consent_strategies {
        if locator::probe_once(page, strategy).await.is_some() {
            return true;
        }
    }
    matches!(
        page.text_center(adapter.consent_text_pattern.as_str()).await,
        Ok(Some(_))
    )
}
