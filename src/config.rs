use crate::engine::pipeline::EngineTimeouts;
use crate::engine::stabilize::StabilizeBudget;
use std::env;

/// Where screenshot bytes end up: inline data URLs (read-only filesystems)
/// or files under a served directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenshotMode {
    Inline,
    Directory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_addr: String,

    // Browser
    pub chrome_path: Option<String>,
    pub headless: bool,
    pub proxy_url: Option<String>,
    pub user_agent: String,

    // Timeouts
    pub navigation_timeout_ms: u64,
    pub ready_timeout_ms: u64,
    pub network_idle_timeout_ms: u64,
    pub post_submit_idle_timeout_ms: u64,
    pub settle_delay_ms: u64,

    // Screenshots
    pub screenshot_mode: ScreenshotMode,
    pub screenshot_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        Ok(Config {
            http_addr: env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8088".to_string()),

            chrome_path: env::var("CHROME_PATH").ok(),
            headless: env::var("HEADLESS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            proxy_url: env::var("PROXY_URL").ok(),
            // Stable desktop UA to limit surprises from UA-sniffing portals.
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/123 Safari/537.36"
                    .to_string()
            }),

            navigation_timeout_ms: env_u64("NAVIGATION_TIMEOUT_MS", 60_000),
            ready_timeout_ms: env_u64("READY_TIMEOUT_MS", 10_000),
            network_idle_timeout_ms: env_u64("NETWORK_IDLE_TIMEOUT_MS", 5_000),
            post_submit_idle_timeout_ms: env_u64("POST_SUBMIT_IDLE_TIMEOUT_MS", 15_000),
            settle_delay_ms: env_u64("SETTLE_DELAY_MS", 1_200),

            screenshot_mode: match env::var("SCREENSHOT_MODE").as_deref() {
                Ok("dir") | Ok("directory") | Ok("file") => ScreenshotMode::Directory,
                _ => ScreenshotMode::Inline,
            },
            screenshot_dir: env::var("SCREENSHOT_DIR").unwrap_or_else(|_| "public".to_string()),
        })
    }

    pub fn engine_timeouts(&self) -> EngineTimeouts {
        EngineTimeouts {
            navigation_ms: self.navigation_timeout_ms,
            initial: StabilizeBudget {
                ready_ms: self.ready_timeout_ms,
                network_idle_ms: self.network_idle_timeout_ms,
                settle_ms: 800,
            },
            post_submit: StabilizeBudget {
                ready_ms: self.ready_timeout_ms / 2,
                network_idle_ms: self.post_submit_idle_timeout_ms,
                settle_ms: self.settle_delay_ms,
            },
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
