use crate::browser::page::{DriverError, ElementHandle, PageDriver, QueryRoot};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use serde_json::Value;
use std::time::Duration;

/// [`PageDriver`] over a chromiumoxide CDP page.
///
/// Element handles index into a page-side registry (`window.__pv.els`)
/// populated by query scripts; every interaction goes back through that
/// registry. The registry lives in the top frame's JS world, so frame
/// queries reach same-origin frames only; a cross-origin frame document
/// is unreachable and counts as "no match in this frame".
pub struct CdpPage {
    page: Page,
}

const VISIBLE_FN: &str = r#"
    const isVisible = (el) => {
        if (!el || el.nodeType !== 1) return false;
        const win = el.ownerDocument.defaultView;
        if (!win) return false;
        const cs = win.getComputedStyle(el);
        if (cs.display === 'none' || cs.visibility === 'hidden') return false;
        const r = el.getBoundingClientRect();
        return r.width > 0 && r.height > 0;
    };
"#;

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn inner(&self) -> &Page {
        &self.page
    }

    async fn eval(&self, js: String) -> Result<Value, DriverError> {
        let result = self
            .page
            .evaluate(js.as_str())
            .await
            .map_err(|e| DriverError::Eval(e.to_string()))?;
        result
            .into_value::<Value>()
            .map_err(|e| DriverError::Eval(e.to_string()))
    }

    /// Evaluates an op returning `{ok: ...}` or `{err: "..."}`.
    async fn eval_op(&self, js: String) -> Result<Value, DriverError> {
        let value = self.eval(js).await?;
        if let Some(err) = value.get("err").and_then(|v| v.as_str()) {
            if err == "stale" {
                return Err(DriverError::Stale);
            }
            return Err(DriverError::Interaction(err.to_string()));
        }
        Ok(value)
    }

    fn root_expr(root: QueryRoot) -> String {
        match root {
            QueryRoot::Document => "doc = document;".to_string(),
            QueryRoot::Frame(i) => format!(
                "try {{ const f = window.frames[{i}]; doc = f ? f.document : null; }} catch (e) {{ doc = null; }}"
            ),
        }
    }

    /// CSS match, or the `text=/re/flags` dialect (innermost match wins).
    fn match_expr(selector: &str) -> String {
        if let Some((src, flags)) = parse_text_selector(selector) {
            let src = serde_json::Value::String(src).to_string();
            let flags = serde_json::Value::String(flags).to_string();
            format!(
                r#"
                const re = new RegExp({src}, {flags});
                const cand = [];
                for (const n of root.querySelectorAll('*')) {{
                    const t = (n.innerText !== undefined ? n.innerText : n.textContent) || '';
                    if (re.test(t)) cand.push(n);
                }}
                for (const n of cand) {{
                    if (!cand.some(m => m !== n && n.contains(m))) out.push(n);
                }}
                "#
            )
        } else {
            let sel = serde_json::Value::String(selector.to_string()).to_string();
            format!("for (const n of root.querySelectorAll({sel})) out.push(n);")
        }
    }
}

/// Splits `text=/needle/i` into (source, flags).
fn parse_text_selector(selector: &str) -> Option<(String, String)> {
    let body = selector.strip_prefix("text=")?;
    let body = body.strip_prefix('/')?;
    let end = body.rfind('/')?;
    Some((body[..end].to_string(), body[end + 1..].to_string()))
}

/// Rust regex sources carry `(?i)`; JS wants an `i` flag instead.
fn to_js_regex(pattern: &str) -> String {
    pattern.strip_prefix("(?i)").unwrap_or(pattern).to_string()
}

#[async_trait]
impl PageDriver for CdpPage {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| DriverError::Browser(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn ready_state(&self) -> Result<String, DriverError> {
        let value = self.eval("document.readyState".to_string()).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn inflight_requests(&self) -> Result<u64, DriverError> {
        let value = self
            .eval(
                "performance.getEntriesByType('resource').filter(r => !r.responseEnd).length"
                    .to_string(),
            )
            .await?;
        Ok(value.as_u64().unwrap_or(0))
    }

    async fn frame_count(&self) -> Result<usize, DriverError> {
        let value = self.eval("window.frames.length".to_string()).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn query(
        &self,
        root: QueryRoot,
        selector: &str,
        pierce: bool,
    ) -> Result<Option<ElementHandle>, DriverError> {
        let root_expr = Self::root_expr(root);
        let match_expr = Self::match_expr(selector);
        let js = format!(
            r#"(() => {{
                const R = window.__pv = window.__pv || {{ els: [] }};
                {VISIBLE_FN}
                const matchIn = (root, out) => {{
                    {match_expr}
                    if ({pierce}) {{
                        for (const host of root.querySelectorAll('*')) {{
                            if (host.shadowRoot) matchIn(host.shadowRoot, out);
                        }}
                    }}
                }};
                let doc = null;
                {root_expr}
                if (!doc) return -1;
                const out = [];
                try {{ matchIn(doc, out); }} catch (e) {{ return -1; }}
                const hit = out.find(isVisible);
                if (!hit) return -1;
                R.els.push(hit);
                return R.els.length - 1;
            }})()"#
        );
        let value = self.eval(js).await?;
        Ok(value.as_u64().map(ElementHandle))
    }

    async fn click(&self, el: ElementHandle) -> Result<(), DriverError> {
        let id = el.0;
        let js = format!(
            r#"(() => {{
                const R = window.__pv || {{ els: [] }};
                const el = R.els[{id}];
                if (!el || !el.isConnected) return {{ err: 'stale' }};
                el.scrollIntoView({{ block: 'center', inline: 'center' }});
                const r = el.getBoundingClientRect();
                const cx = r.left + r.width / 2, cy = r.top + r.height / 2;
                const hit = el.ownerDocument.elementFromPoint(cx, cy);
                if (hit && (hit === el || el.contains(hit) || hit.contains(el))) {{
                    el.click();
                    return {{ ok: true }};
                }}
                return {{ err: 'intercepted by ' + (hit ? hit.tagName.toLowerCase() : 'nothing') }};
            }})()"#
        );
        self.eval_op(js).await?;
        Ok(())
    }

    async fn force_click(&self, el: ElementHandle) -> Result<(), DriverError> {
        let id = el.0;
        let js = format!(
            r#"(() => {{
                const R = window.__pv || {{ els: [] }};
                const el = R.els[{id}];
                if (!el || !el.isConnected) return {{ err: 'stale' }};
                el.click();
                return {{ ok: true }};
            }})()"#
        );
        self.eval_op(js).await?;
        Ok(())
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<(), DriverError> {
        let js = format!(
            r#"(() => {{
                const t = document.elementFromPoint({x}, {y});
                if (!t) return {{ err: 'no element at point' }};
                t.click();
                return {{ ok: true }};
            }})()"#
        );
        self.eval_op(js).await?;
        Ok(())
    }

    async fn clear_value(&self, el: ElementHandle) -> Result<(), DriverError> {
        self.set_value(el, "").await
    }

    async fn set_value(&self, el: ElementHandle, value: &str) -> Result<(), DriverError> {
        let id = el.0;
        let val = serde_json::Value::String(value.to_string()).to_string();
        let js = format!(
            r#"(() => {{
                const R = window.__pv || {{ els: [] }};
                const el = R.els[{id}];
                if (!el || !el.isConnected) return {{ err: 'stale' }};
                el.focus();
                el.value = {val};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return {{ ok: true }};
            }})()"#
        );
        self.eval_op(js).await?;
        Ok(())
    }

    async fn value(&self, el: ElementHandle) -> Result<String, DriverError> {
        let id = el.0;
        let js = format!(
            r#"(() => {{
                const R = window.__pv || {{ els: [] }};
                const el = R.els[{id}];
                if (!el || !el.isConnected) return {{ err: 'stale' }};
                return {{ ok: el.value !== undefined ? String(el.value) : '' }};
            }})()"#
        );
        let value = self.eval_op(js).await?;
        Ok(value
            .get("ok")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn type_text(
        &self,
        el: ElementHandle,
        text: &str,
        per_char_delay: Duration,
    ) -> Result<(), DriverError> {
        let id = el.0;
        for ch in text.chars() {
            let ch_json = serde_json::Value::String(ch.to_string()).to_string();
            let js = format!(
                r#"(() => {{
                    const R = window.__pv || {{ els: [] }};
                    const el = R.els[{id}];
                    if (!el || !el.isConnected) return {{ err: 'stale' }};
                    el.focus();
                    el.value = (el.value || '') + {ch_json};
                    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    return {{ ok: true }};
                }})()"#
            );
            self.eval_op(js).await?;
            tokio::time::sleep(per_char_delay).await;
        }
        // Widgets listening on change only see it once, after the last key.
        let id_js = format!(
            r#"(() => {{
                const R = window.__pv || {{ els: [] }};
                const el = R.els[{id}];
                if (!el || !el.isConnected) return {{ err: 'stale' }};
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return {{ ok: true }};
            }})()"#
        );
        self.eval_op(id_js).await?;
        Ok(())
    }

    async fn text(&self, el: ElementHandle) -> Result<String, DriverError> {
        let id = el.0;
        let js = format!(
            r#"(() => {{
                const R = window.__pv || {{ els: [] }};
                const el = R.els[{id}];
                if (!el || !el.isConnected) return {{ err: 'stale' }};
                const t = el.innerText !== undefined ? el.innerText : el.textContent;
                return {{ ok: (t || '').trim() }};
            }})()"#
        );
        let value = self.eval_op(js).await?;
        Ok(value
            .get("ok")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn tag_name(&self, el: ElementHandle) -> Result<String, DriverError> {
        let id = el.0;
        let js = format!(
            r#"(() => {{
                const R = window.__pv || {{ els: [] }};
                const el = R.els[{id}];
                if (!el || !el.isConnected) return {{ err: 'stale' }};
                return {{ ok: el.tagName.toLowerCase() }};
            }})()"#
        );
        let value = self.eval_op(js).await?;
        Ok(value
            .get("ok")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn attribute(
        &self,
        el: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let id = el.0;
        let name_json = serde_json::Value::String(name.to_string()).to_string();
        let js = format!(
            r#"(() => {{
                const R = window.__pv || {{ els: [] }};
                const el = R.els[{id}];
                if (!el || !el.isConnected) return {{ err: 'stale' }};
                const v = el.getAttribute({name_json});
                return {{ ok: true, value: v }};
            }})()"#
        );
        let value = self.eval_op(js).await?;
        Ok(value
            .get("value")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()))
    }

    async fn page_text(&self) -> Result<String, DriverError> {
        let value = self
            .eval("document.body ? document.body.innerText : ''".to_string())
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn text_center(&self, pattern: &str) -> Result<Option<(f64, f64)>, DriverError> {
        let src = serde_json::Value::String(to_js_regex(pattern)).to_string();
        let js = format!(
            r#"(() => {{
                if (!document.body) return {{ found: false }};
                const re = new RegExp({src}, 'i');
                const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_TEXT);
                let node;
                while ((node = walker.nextNode())) {{
                    if (re.test(node.textContent || '')) {{
                        const range = document.createRange();
                        range.selectNodeContents(node);
                        const r = range.getBoundingClientRect();
                        if (r.width > 0 && r.height > 0) {{
                            return {{ found: true, x: r.left + r.width / 2, y: r.top + r.height / 2 }};
                        }}
                    }}
                }}
                return {{ found: false }};
            }})()"#
        );
        let value = self.eval(js).await?;
        if value.get("found").and_then(|v| v.as_bool()) != Some(true) {
            return Ok(None);
        }
        let x = value.get("x").and_then(|v| v.as_f64());
        let y = value.get("y").and_then(|v| v.as_f64());
        Ok(x.zip(y))
    }

    async fn suppress_overlays(&self, markers: &[&str]) -> Result<u64, DriverError> {
        let markers_json = serde_json::to_string(markers)
            .map_err(|e| DriverError::Eval(e.to_string()))?;
        let js = format!(
            r#"(() => {{
                const markers = {markers_json};
                let hidden = 0;
                for (const el of document.querySelectorAll('*')) {{
                    const cls = (typeof el.className === 'string' ? el.className : '').toLowerCase();
                    const id = (el.id || '').toLowerCase();
                    if (markers.some(m => cls.includes(m) || id.includes(m))) {{
                        el.style.setProperty('display', 'none', 'important');
                        hidden++;
                    }}
                }}
                document.documentElement.style.overflow = '';
                if (document.body) {{
                    document.body.style.overflow = '';
                    document.body.style.pointerEvents = '';
                    document.body.classList.remove('no-scroll', 'overflow-hidden', 'modal-open');
                }}
                return hidden;
            }})()"#
        );
        let value = self.eval(js).await?;
        Ok(value.as_u64().unwrap_or(0))
    }

    async fn screenshot_full_page(&self) -> Result<Vec<u8>, DriverError> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|e| DriverError::Browser(e.to_string()))
    }
}
