use crate::browser::cdp::{inject_anti_detection, launch_browser};
use crate::browser::cdp_page::CdpPage;
use crate::browser::page::{DriverError, PageDriver};
use crate::config::Config;
use crate::engine::adapter::ProviderAdapter;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetTimezoneOverrideParams, SetUserAgentOverrideParams,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::{Arc, Mutex};

/// Provisions an exclusive browsing session for one query.
#[async_trait]
pub trait SessionProvisioner: Send + Sync {
    async fn acquire(&self, adapter: &ProviderAdapter) -> Result<BrowserSession, DriverError>;
}

/// One page plus its teardown. The teardown runs exactly once: `close` is
/// idempotent, and `Drop` fires it if a pipeline exit skipped the explicit
/// close. Leaking a session across query exits is a defect.
pub struct BrowserSession {
    page: Arc<dyn PageDriver>,
    teardown: Mutex<Option<BoxFuture<'static, ()>>>,
}

impl BrowserSession {
    pub fn new(page: Arc<dyn PageDriver>, teardown: BoxFuture<'static, ()>) -> Self {
        Self {
            page,
            teardown: Mutex::new(Some(teardown)),
        }
    }

    pub fn page(&self) -> Arc<dyn PageDriver> {
        self.page.clone()
    }

    pub async fn close(&self) {
        let fut = match self.teardown.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(fut) = fut {
            fut.await;
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.teardown.lock() {
            if let Some(fut) = guard.take() {
                tracing::warn!("⚠️ Session dropped without close, releasing in background");
                tokio::spawn(fut);
            }
        }
    }
}

/// Launches a fresh Chromium per query. No browser outlives its query and
/// none is shared across queries.
pub struct CdpSessionProvisioner {
    config: Arc<Config>,
}

impl CdpSessionProvisioner {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionProvisioner for CdpSessionProvisioner {
    async fn acquire(&self, adapter: &ProviderAdapter) -> Result<BrowserSession, DriverError> {
        let mut browser = launch_browser(&self.config)
            .await
            .map_err(|e| DriverError::Browser(format!("browser launch: {}", e)))?;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                return Err(DriverError::Browser(format!("new page: {}", e)));
            }
        };

        // Per-site fingerprint: stable UA, provider locale and timezone.
        if let Ok(params) = SetUserAgentOverrideParams::builder()
            .user_agent(&self.config.user_agent)
            .accept_language(adapter.locale)
            .build()
        {
            let _ = page.execute(params).await;
        }
        if let Ok(params) = SetTimezoneOverrideParams::builder()
            .timezone_id(adapter.timezone)
            .build()
        {
            let _ = page.execute(params).await;
        }
        inject_anti_detection(&page, &self.config.user_agent)
            .await
            .ok();

        let teardown = async move {
            if let Err(e) = browser.close().await {
                tracing::debug!("Browser close error: {}", e);
            }
            let _ = browser.wait().await;
        }
        .boxed();

        Ok(BrowserSession::new(Arc::new(CdpPage::new(page)), teardown))
    }
}
