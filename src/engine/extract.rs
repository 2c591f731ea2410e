use crate::browser::page::{DriverError, PageDriver, QueryRoot};
use crate::engine::adapter::ProviderAdapter;
use crate::engine::locator;
use crate::utils::parse_amount_minor;

/// What the post-submission page yielded. Absence of both an amount and a
/// payment link, or presence of the no-trip signal, is "no due" evidence;
/// the classifier decides.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub amount_minor: Option<i64>,
    pub currency: Option<String>,
    pub no_trip: bool,
    pub result_url: String,
    pub pay_url: Option<String>,
}

pub async fn extract(
    page: &dyn PageDriver,
    adapter: &ProviderAdapter,
) -> Result<Extraction, DriverError> {
    let mut extraction = Extraction {
        result_url: page.current_url().await.unwrap_or_default(),
        ..Default::default()
    };

    scan_amount(page, adapter, &mut extraction).await;

    let body = page.page_text().await.unwrap_or_default();
    extraction.no_trip = adapter.no_trip_pattern.is_match(&body);

    // Free-text fallback: the candidate regions missed, but the page may
    // still show an amount somewhere. The parser takes the first decimal
    // occurrence in the body, grouping and currency marker included.
    if extraction.amount_minor.is_none()
        && adapter.amount_patterns.iter().any(|p| p.is_match(&body))
    {
        if let Some(parsed) = parse_amount_minor(&body) {
            extraction.amount_minor = Some(parsed.minor_units);
            extraction.currency = parsed.currency;
        }
    }

    extraction.pay_url = find_pay_link(page, adapter).await;

    Ok(extraction)
}

/// First candidate region whose text matches an amount pattern wins.
async fn scan_amount(page: &dyn PageDriver, adapter: &ProviderAdapter, out: &mut Extraction) {
    for selector in &adapter.amount_region_selectors {
        let handle = match page.query(QueryRoot::Document, selector, false).await {
            Ok(Some(handle)) => handle,
            _ => continue,
        };
        let text = match page.text(handle).await {
            Ok(text) => text,
            Err(_) => continue,
        };
        if !adapter.amount_patterns.iter().any(|p| p.is_match(&text)) {
            continue;
        }
        if let Some(parsed) = parse_amount_minor(&text) {
            tracing::debug!("💶 Amount region '{}': {:?}", selector, parsed);
            out.amount_minor = Some(parsed.minor_units);
            out.currency = parsed.currency;
            return;
        }
    }
}

/// Payment-intent anchors only: a button that triggers client-side
/// navigation has no stable URL and is not a payment link.
async fn find_pay_link(page: &dyn PageDriver, adapter: &ProviderAdapter) -> Option<String> {
    for strategy in &adapter.link_strategies {
        let handle = match locator::locate(page, std::slice::from_ref(strategy)).await {
            Some(handle) => handle,
            None => continue,
        };
        let tag = page.tag_name(handle).await.unwrap_or_default();
        if tag != "a" {
            continue;
        }
        if let Ok(Some(href)) = page.attribute(handle, "href").await {
            if !href.is_empty() {
                return Some(href);
            }
        }
    }
    None
}
