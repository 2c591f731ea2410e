use crate::browser::page::{ElementHandle, PageDriver, QueryRoot};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Which root(s) a strategy searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Top document only.
    Document,
    /// Every currently-attached child frame, document order.
    Frames,
    /// Top document, piercing open shadow roots.
    Shadow,
}

/// One "where to look" rule. Strategies are data: the cascade that used to
/// live in nested try/catch blocks is an ordered list consumed by one
/// generic locator.
#[derive(Debug, Clone)]
pub struct SelectorStrategy {
    pub scope: Scope,
    pub selector: String,
    pub timeout_ms: u64,
}

impl SelectorStrategy {
    pub fn document(selector: &str, timeout_ms: u64) -> Self {
        Self {
            scope: Scope::Document,
            selector: selector.to_string(),
            timeout_ms,
        }
    }

    pub fn frames(selector: &str, timeout_ms: u64) -> Self {
        Self {
            scope: Scope::Frames,
            selector: selector.to_string(),
            timeout_ms,
        }
    }

    pub fn shadow(selector: &str, timeout_ms: u64) -> Self {
        Self {
            scope: Scope::Shadow,
            selector: selector.to_string(),
            timeout_ms,
        }
    }
}

/// Tries strategies strictly in declaration order; the first one that
/// resolves a visible element wins and later strategies are never
/// evaluated. Each strategy gets its own timeout. Exhausting the list is
/// not an error here: the caller decides whether NotFound is fatal.
///
/// Third-party markup changes without notice, so specificity vs fault
/// tolerance is managed purely by ordering: most specific first, broadest
/// generic fallback last.
pub async fn locate(
    page: &dyn PageDriver,
    strategies: &[SelectorStrategy],
) -> Option<ElementHandle> {
    for strategy in strategies {
        if let Some(handle) = try_strategy(page, strategy).await {
            tracing::debug!("🎯 Located via {:?} '{}'", strategy.scope, strategy.selector);
            return Some(handle);
        }
        tracing::debug!(
            "Strategy {:?} '{}' exhausted after {}ms",
            strategy.scope,
            strategy.selector,
            strategy.timeout_ms
        );
    }
    None
}

/// Single probe pass over a strategy's roots, no waiting.
pub async fn probe_once(page: &dyn PageDriver, strategy: &SelectorStrategy) -> Option<ElementHandle> {
    for (root, pierce) in expand_roots(page, strategy.scope).await {
        match page.query(root, &strategy.selector, pierce).await {
            Ok(Some(handle)) => return Some(handle),
            // Mid-navigation documents throw; the cascade tolerates it.
            Ok(None) | Err(_) => {}
        }
    }
    None
}

async fn try_strategy(page: &dyn PageDriver, strategy: &SelectorStrategy) -> Option<ElementHandle> {
    let deadline = Instant::now() + Duration::from_millis(strategy.timeout_ms);
    loop {
        if let Some(handle) = probe_once(page, strategy).await {
            return Some(handle);
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return None;
        }
        tokio::time::sleep(POLL_INTERVAL.min(remaining)).await;
    }
}

/// Frame roots are re-read on every poll round: frames attach and detach
/// while provider pages load.
async fn expand_roots(page: &dyn PageDriver, scope: Scope) -> Vec<(QueryRoot, bool)> {
    match scope {
        Scope::Document => vec![(QueryRoot::Document, false)],
        Scope::Shadow => vec![(QueryRoot::Document, true)],
        Scope::Frames => {
            let count = page.frame_count().await.unwrap_or(0);
            (0..count).map(|i| (QueryRoot::Frame(i), false)).collect()
        }
    }
}
