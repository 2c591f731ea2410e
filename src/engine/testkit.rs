//! In-memory page, provisioner, and sink for engine tests.

use crate::browser::page::{DriverError, ElementHandle, PageDriver, QueryRoot};
use crate::browser::session::{BrowserSession, SessionProvisioner};
use crate::engine::adapter::ProviderAdapter;
use crate::engine::capture::{Checkpoint, ScreenshotRef, ScreenshotSink, SinkError};
use async_trait::async_trait;
use futures::FutureExt;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub struct MockElement {
    pub selector: String,
    pub frame: Option<usize>,
    pub in_shadow: bool,
    pub visible: bool,
    pub tag: String,
    pub value: String,
    pub text: String,
    pub href: Option<String>,
    /// Direct value assignment is silently ignored (widget re-renders).
    pub reject_direct_set: bool,
    /// Normal clicks land on an overlay instead.
    pub intercept_click: bool,
    /// Neither normal nor forced clicks register.
    pub broken: bool,
    /// Clicking reveals this text on the page.
    pub reveal_on_click: Option<String>,
    /// Clicking hides the element (a dismissible banner).
    pub hide_on_click: bool,
}

impl MockElement {
    pub fn input(selector: &str) -> Self {
        Self::new(selector, "input")
    }

    pub fn button(selector: &str) -> Self {
        Self::new(selector, "button")
    }

    pub fn new(selector: &str, tag: &str) -> Self {
        Self {
            selector: selector.to_string(),
            frame: None,
            in_shadow: false,
            visible: true,
            tag: tag.to_string(),
            value: String::new(),
            text: String::new(),
            href: None,
            reject_direct_set: false,
            intercept_click: false,
            broken: false,
            reveal_on_click: None,
            hide_on_click: false,
        }
    }

    pub fn in_frame(mut self, index: usize) -> Self {
        self.frame = Some(index);
        self
    }

    pub fn shadow(mut self) -> Self {
        self.in_shadow = true;
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn rejecting_direct_set(mut self) -> Self {
        self.reject_direct_set = true;
        self
    }

    pub fn intercepted(mut self) -> Self {
        self.intercept_click = true;
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    pub fn revealing(mut self, text: &str) -> Self {
        self.reveal_on_click = Some(text.to_string());
        self
    }

    pub fn hiding_on_click(mut self) -> Self {
        self.hide_on_click = true;
        self
    }
}

#[derive(Default)]
struct MockState {
    url: String,
    goto_error: Option<String>,
    elements: Vec<MockElement>,
    page_text: String,
    frame_count: usize,
    probes: Vec<String>,
}

#[derive(Default)]
pub struct MockPage {
    state: Mutex<MockState>,
}

impl MockPage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, element: MockElement) {
        self.state.lock().unwrap().elements.push(element);
    }

    pub fn set_page_text(&self, text: &str) {
        self.state.lock().unwrap().page_text = text.to_string();
    }

    pub fn set_frame_count(&self, count: usize) {
        self.state.lock().unwrap().frame_count = count;
    }

    pub fn fail_navigation(&self, message: &str) {
        self.state.lock().unwrap().goto_error = Some(message.to_string());
    }

    /// Every probe the locator issued, as "root|selector".
    pub fn probes(&self) -> Vec<String> {
        self.state.lock().unwrap().probes.clone()
    }

    pub fn element_value(&self, selector: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .elements
            .iter()
            .find(|e| e.selector == selector)
            .map(|e| e.value.clone())
    }

    pub fn element_visible(&self, selector: &str) -> Option<bool> {
        self.state
            .lock()
            .unwrap()
            .elements
            .iter()
            .find(|e| e.selector == selector)
            .map(|e| e.visible)
    }

    fn matches(element: &MockElement, root: QueryRoot, selector: &str, pierce: bool) -> bool {
        if !element.visible {
            return false;
        }
        let root_ok = match root {
            QueryRoot::Document => element.frame.is_none() && (!element.in_shadow || pierce),
            QueryRoot::Frame(i) => element.frame == Some(i),
        };
        if !root_ok {
            return false;
        }
        if let Some(re) = text_selector_regex(selector) {
            re.is_match(&element.text)
        } else {
            element.selector == selector
        }
    }

    fn apply_click(state: &mut MockState, index: usize) {
        let (reveal, hide) = {
            let el = &state.elements[index];
            (el.reveal_on_click.clone(), el.hide_on_click)
        };
        if let Some(text) = reveal {
            if !state.page_text.is_empty() {
                state.page_text.push('\n');
            }
            state.page_text.push_str(&text);
        }
        if hide {
            state.elements[index].visible = false;
        }
    }

    fn element(state: &MockState, handle: ElementHandle) -> Result<&MockElement, DriverError> {
        state
            .elements
            .get(handle.0 as usize)
            .ok_or(DriverError::Stale)
    }
}

fn text_selector_regex(selector: &str) -> Option<Regex> {
    let body = selector.strip_prefix("text=")?.strip_prefix('/')?;
    let end = body.rfind('/')?;
    let (src, flags) = (&body[..end], &body[end + 1..]);
    let pattern = if flags.contains('i') {
        format!("(?i){}", src)
    } else {
        src.to_string()
    };
    Regex::new(&pattern).ok()
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.goto_error {
            return Err(DriverError::Navigation(message.clone()));
        }
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn ready_state(&self) -> Result<String, DriverError> {
        Ok("complete".to_string())
    }

    async fn inflight_requests(&self) -> Result<u64, DriverError> {
        Ok(0)
    }

    async fn frame_count(&self) -> Result<usize, DriverError> {
        Ok(self.state.lock().unwrap().frame_count)
    }

    async fn query(
        &self,
        root: QueryRoot,
        selector: &str,
        pierce: bool,
    ) -> Result<Option<ElementHandle>, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.probes.push(format!("{:?}|{}", root, selector));
        let index = state
            .elements
            .iter()
            .position(|e| Self::matches(e, root, selector, pierce));
        Ok(index.map(|i| ElementHandle(i as u64)))
    }

    async fn click(&self, el: ElementHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        let index = el.0 as usize;
        let element = Self::element(&state, el)?;
        if element.broken || element.intercept_click {
            return Err(DriverError::Interaction("intercepted by overlay".to_string()));
        }
        Self::apply_click(&mut state, index);
        Ok(())
    }

    async fn force_click(&self, el: ElementHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        let index = el.0 as usize;
        if Self::element(&state, el)?.broken {
            return Err(DriverError::Interaction("activation suppressed".to_string()));
        }
        Self::apply_click(&mut state, index);
        Ok(())
    }

    async fn click_at(&self, _x: f64, _y: f64) -> Result<(), DriverError> {
        Ok(())
    }

    async fn clear_value(&self, el: ElementHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        let index = el.0 as usize;
        if !Self::element(&state, el)?.reject_direct_set {
            state.elements[index].value.clear();
        }
        Ok(())
    }

    async fn set_value(&self, el: ElementHandle, value: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        let index = el.0 as usize;
        // A rejecting widget swallows the assignment without erroring.
        if !Self::element(&state, el)?.reject_direct_set {
            state.elements[index].value = value.to_string();
        }
        Ok(())
    }

    async fn value(&self, el: ElementHandle) -> Result<String, DriverError> {
        let state = self.state.lock().unwrap();
        Ok(Self::element(&state, el)?.value.clone())
    }

    async fn type_text(
        &self,
        el: ElementHandle,
        text: &str,
        _per_char_delay: Duration,
    ) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        let index = el.0 as usize;
        Self::element(&state, el)?;
        state.elements[index].value.push_str(text);
        Ok(())
    }

    async fn text(&self, el: ElementHandle) -> Result<String, DriverError> {
        let state = self.state.lock().unwrap();
        Ok(Self::element(&state, el)?.text.clone())
    }

    async fn tag_name(&self, el: ElementHandle) -> Result<String, DriverError> {
        let state = self.state.lock().unwrap();
        Ok(Self::element(&state, el)?.tag.clone())
    }

    async fn attribute(
        &self,
        el: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let state = self.state.lock().unwrap();
        let element = Self::element(&state, el)?;
        Ok(match name {
            "href" => element.href.clone(),
            _ => None,
        })
    }

    async fn page_text(&self) -> Result<String, DriverError> {
        Ok(self.state.lock().unwrap().page_text.clone())
    }

    async fn text_center(&self, pattern: &str) -> Result<Option<(f64, f64)>, DriverError> {
        let state = self.state.lock().unwrap();
        let re = Regex::new(pattern).map_err(|e| DriverError::Eval(e.to_string()))?;
        Ok(if re.is_match(&state.page_text) {
            Some((10.0, 10.0))
        } else {
            None
        })
    }

    async fn suppress_overlays(&self, markers: &[&str]) -> Result<u64, DriverError> {
        let mut state = self.state.lock().unwrap();
        let mut hidden = 0;
        for element in &mut state.elements {
            let selector = element.selector.to_lowercase();
            if element.visible && markers.iter().any(|m| selector.contains(m)) {
                element.visible = false;
                hidden += 1;
            }
        }
        Ok(hidden)
    }

    async fn screenshot_full_page(&self) -> Result<Vec<u8>, DriverError> {
        Ok(vec![137, 80, 78, 71])
    }
}

/// Hands out sessions over one shared mock page and counts releases, so
/// tests can assert the exactly-once teardown invariant.
pub struct MockProvisioner {
    page: Arc<MockPage>,
    pub closes: Arc<AtomicUsize>,
}

impl MockProvisioner {
    pub fn new(page: Arc<MockPage>) -> Self {
        Self {
            page,
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvisioner for MockProvisioner {
    async fn acquire(&self, _adapter: &ProviderAdapter) -> Result<BrowserSession, DriverError> {
        let closes = self.closes.clone();
        let teardown = async move {
            closes.fetch_add(1, Ordering::SeqCst);
        }
        .boxed();
        Ok(BrowserSession::new(self.page.clone(), teardown))
    }
}

#[derive(Default)]
pub struct MemorySink {
    stored: Mutex<Vec<Checkpoint>>,
}

impl MemorySink {
    pub fn stored(&self) -> Vec<Checkpoint> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScreenshotSink for MemorySink {
    async fn store(
        &self,
        _bytes: &[u8],
        query_id: &str,
        checkpoint: Checkpoint,
    ) -> Result<ScreenshotRef, SinkError> {
        self.stored.lock().unwrap().push(checkpoint);
        Ok(ScreenshotRef(format!(
            "shot://{}-{}",
            query_id,
            checkpoint.label()
        )))
    }
}
