use crate::config::Config;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;

/// Launches a Chromium instance for one query session.
pub async fn launch_browser(config: &Config) -> Result<Browser, CdpError> {
    tracing::debug!("🚀 Launching Chromium...");

    let chrome_path = config.chrome_path.clone().unwrap_or_else(|| {
        if cfg!(target_os = "windows") {
            "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe".to_string()
        } else if cfg!(target_os = "macos") {
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome".to_string()
        } else {
            "google-chrome".to_string()
        }
    });

    let mut args = vec![
        "--disable-blink-features=AutomationControlled",
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--disable-gpu",
        "--window-size=1280,1024",
        "--lang=fr-FR",
        "--disable-features=IsolateOrigins,site-per-process",
        "--disable-site-isolation-trials",
        "--exclude-switches=enable-automation",
        "--disable-infobars",
    ];

    if config.headless {
        args.push("--headless=new");
    }

    let proxy_arg;
    if let Some(proxy_url) = &config.proxy_url {
        proxy_arg = format!("--proxy-server={}", proxy_url);
        args.push(&proxy_arg);
    }

    let builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .window_size(1280, 1024)
        .args(args);

    let (browser, mut handler) = Browser::launch(builder.build().map_err(|e| {
        CdpError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("BrowserConfig build error: {}", e),
        ))
    })?)
    .await?;

    // Drain CDP events in the background; the connection stalls otherwise.
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::warn!("CDP event error: {:?}", e);
            }
        }
        tracing::debug!("CDP handler finished");
    });

    Ok(browser)
}

/// Masks the obvious automation markers. Toll portals sit behind the usual
/// CDN bot heuristics; this only covers the baseline, not real challenges.
pub async fn inject_anti_detection(page: &Page, user_agent: &str) -> Result<(), CdpError> {
    let script = format!(
        r#"
        Object.defineProperty(navigator, 'webdriver', {{
            get: () => undefined
        }});

        Object.defineProperty(navigator, 'userAgent', {{
            get: () => '{}'
        }});

        window.navigator.chrome = {{
            runtime: {{}}
        }};

        Object.defineProperty(navigator, 'languages', {{
            get: () => ['fr-FR', 'fr', 'en-US', 'en'],
        }});
    "#,
        user_agent
    );

    page.evaluate(script.as_str()).await?;
    tracing::debug!("✅ Anti-detection script injected");

    Ok(())
}
