use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("script evaluation failed: {0}")]
    Eval(String),

    #[error("interaction failed: {0}")]
    Interaction(String),

    #[error("element is stale or detached")]
    Stale,

    #[error("browser error: {0}")]
    Browser(String),
}

/// Opaque reference to an element previously resolved by [`PageDriver::query`].
/// Valid until the page navigates away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHandle(pub u64);

/// Which root a single query probe runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRoot {
    /// The top document.
    Document,
    /// The Nth currently-attached child frame, document order.
    Frame(usize),
}

/// Everything the interaction engine needs from a live page.
///
/// The CDP-backed implementation lives in `browser::cdp_page`; tests drive
/// the engine against an in-memory implementation instead. Selectors are
/// CSS, plus a `text=/regex/flags` dialect matching elements by visible
/// text content.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    /// `document.readyState` of the top document.
    async fn ready_state(&self) -> Result<String, DriverError>;

    /// Resource fetches started but not yet finished.
    async fn inflight_requests(&self) -> Result<u64, DriverError>;

    /// Number of currently-attached child frames.
    async fn frame_count(&self) -> Result<usize, DriverError>;

    /// First visible element matching `selector` under `root`; `pierce`
    /// extends the search through open shadow roots.
    async fn query(
        &self,
        root: QueryRoot,
        selector: &str,
        pierce: bool,
    ) -> Result<Option<ElementHandle>, DriverError>;

    /// Click after verifying the element is the hit target at its center.
    /// Fails with [`DriverError::Interaction`] when an overlay intercepts.
    async fn click(&self, el: ElementHandle) -> Result<(), DriverError>;

    /// Unconditional scripted click, ignoring obstruction.
    async fn force_click(&self, el: ElementHandle) -> Result<(), DriverError>;

    /// Click whatever element currently owns the given viewport point.
    async fn click_at(&self, x: f64, y: f64) -> Result<(), DriverError>;

    async fn clear_value(&self, el: ElementHandle) -> Result<(), DriverError>;

    /// Direct value assignment, with input/change events dispatched.
    async fn set_value(&self, el: ElementHandle, value: &str) -> Result<(), DriverError>;

    async fn value(&self, el: ElementHandle) -> Result<String, DriverError>;

    /// Per-character input for widgets that only react to genuine key events.
    async fn type_text(
        &self,
        el: ElementHandle,
        text: &str,
        per_char_delay: Duration,
    ) -> Result<(), DriverError>;

    async fn text(&self, el: ElementHandle) -> Result<String, DriverError>;

    async fn tag_name(&self, el: ElementHandle) -> Result<String, DriverError>;

    async fn attribute(
        &self,
        el: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    /// Visible text of the whole top document.
    async fn page_text(&self) -> Result<String, DriverError>;

    /// Viewport center of the first text node matching `pattern`
    /// (case-insensitive substring or regex source).
    async fn text_center(&self, pattern: &str) -> Result<Option<(f64, f64)>, DriverError>;

    /// Hides every element whose class or id contains one of `markers` and
    /// restores page scroll/pointer interaction. Returns how many were hidden.
    async fn suppress_overlays(&self, markers: &[&str]) -> Result<u64, DriverError>;

    async fn screenshot_full_page(&self) -> Result<Vec<u8>, DriverError>;
}
