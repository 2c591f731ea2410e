//! Real-Chromium smoke tests. Need a local Chrome/Chromium binary
//! (CHROME_PATH or the platform default).

use peage_server::browser::cdp::launch_browser;
use peage_server::browser::cdp_page::CdpPage;
use peage_server::browser::page::{PageDriver, QueryRoot};
use peage_server::config::Config;

#[tokio::test]
#[ignore] // Run manually: cargo test --test browser_smoke -- --ignored
async fn test_browser_launch_and_query() {
    let config = Config::from_env().expect("config");

    let mut browser = launch_browser(&config)
        .await
        .expect("Chromium launch failed - is Chrome installed / CHROME_PATH set?");

    let page = browser.new_page("about:blank").await.expect("new page");
    let driver = CdpPage::new(page);

    driver
        .inner()
        .set_content("<html><body><input id='plate' placeholder='XX123XX'></body></html>")
        .await
        .expect("set content");

    let found = driver
        .query(QueryRoot::Document, "input[placeholder=\"XX123XX\"]", false)
        .await
        .expect("query");
    assert!(found.is_some(), "plate input not found in test page");

    let shot = driver.screenshot_full_page().await.expect("screenshot");
    assert!(!shot.is_empty());

    browser.close().await.ok();
    let _ = browser.wait().await;
}
