//! WebDriver backend integration tests
//!
//! These tests spawn a real chromedriver + Chrome. They run sequentially via
//! `#[serial]` and are ignored by default.

use causelist_e::WebDriverBackend;
use causelist_engine::backend::{Backend, BackendError};
use causelist_engine::config::BrowserSettings;
use causelist_engine::protocol::Locator;
use serial_test::serial;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

const FORM: &str = "<html><head><title>Cause List</title></head><body>\
<select id='state'><option value=''>Select State</option><option value='KL'>Kerala</option></select>\
<input id='date' type='text'><input id='captcha' type='text'>\
<button id='civil_submit'>Civil</button>\
</body></html>";

#[tokio::test]
#[serial]
#[ignore] // Requires chromedriver + Chrome
async fn test_webdriver_form_interaction() {
    init_tracing();
    let mut backend = WebDriverBackend::new(BrowserSettings {
        chromedriver_port: 9616,
        ..Default::default()
    });

    backend.launch().await.expect("Failed to launch backend");
    let nav = backend
        .navigate(&format!("data:text/html,{}", FORM))
        .await
        .expect("Navigation failed");
    assert_eq!(nav.title, "Cause List");

    backend
        .wait_for(&Locator::id("state"), Duration::from_secs(5))
        .await
        .unwrap();
    let options = backend.read_options("state").await.unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[1].value, "KL");
    assert_eq!(options[1].text, "Kerala");

    backend.select_value("state", "KL").await.unwrap();
    let err = backend.select_value("state", "TN").await.unwrap_err();
    assert!(matches!(err, BackendError::OptionNotFound { .. }));

    backend.set_value("date", "2024-01-15").await.unwrap();
    backend.type_text("captcha", "AB12").await.unwrap();
    assert!(backend.exists(&Locator::id("civil_submit")).await.unwrap());
    assert!(!backend.exists(&Locator::class("cause-list-table")).await.unwrap());

    backend.close().await.expect("Close failed");
    assert!(!backend.is_ready().await);
}

#[tokio::test]
#[serial]
#[ignore] // Requires a WebDriver server to be absent on this port
async fn test_unreachable_webdriver_is_launch_error() {
    init_tracing();
    let mut backend = WebDriverBackend::with_url("http://127.0.0.1:9");
    let err = backend.launch().await.unwrap_err();
    assert!(matches!(err, BackendError::Launch(_)));
    assert!(!backend.is_ready().await);
}

#[tokio::test]
async fn test_operations_before_launch_are_not_ready() {
    let mut backend = WebDriverBackend::default();
    assert!(!backend.is_ready().await);
    assert_eq!(backend.click("civil_submit").await.unwrap_err(), BackendError::NotReady);
    assert_eq!(backend.page_source().await.unwrap_err(), BackendError::NotReady);
    backend.close().await.unwrap();
}
