use async_trait::async_trait;
pub use causelist_common::error::BackendError;
use causelist_common::protocol::{Locator, SelectOption};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

/// The Backend trait is the unified interface both browser backends implement.
///
/// Element ids are the plain `id` attributes used by the portal form
/// (`state`, `district`, `captcha_image`, ...).
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend (start browser, connect to WebDriver, etc.)
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the backend and terminate the browser process.
    async fn close(&mut self) -> Result<(), BackendError>;

    /// Check if the backend is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to a specific URL.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    /// Wait until an element matching `locator` exists, up to `timeout`.
    async fn wait_for(&mut self, locator: &Locator, timeout: Duration)
    -> Result<(), BackendError>;

    /// Whether an element matching `locator` currently exists.
    async fn exists(&mut self, locator: &Locator) -> Result<bool, BackendError>;

    /// Select `value` in the `<select>` with this id and fire its change handler.
    async fn select_value(&mut self, id: &str, value: &str) -> Result<(), BackendError>;

    /// All options of the `<select>` with this id, in document order, unfiltered.
    async fn read_options(&mut self, id: &str) -> Result<Vec<SelectOption>, BackendError>;

    /// Write `value` straight into the element's DOM value, bypassing widgets.
    async fn set_value(&mut self, id: &str, value: &str) -> Result<(), BackendError>;

    /// Clear the input and type `text` into it.
    async fn type_text(&mut self, id: &str, text: &str) -> Result<(), BackendError>;

    /// Click the element with this id.
    async fn click(&mut self, id: &str) -> Result<(), BackendError>;

    /// PNG screenshot of a single element.
    async fn element_screenshot(&mut self, id: &str) -> Result<Vec<u8>, BackendError>;

    /// Current page HTML.
    async fn page_source(&mut self) -> Result<String, BackendError>;
}

/// Poll `exists` until the element shows up or `timeout` runs out.
///
/// Script failures while the page is in flux count as "not yet"; the last one
/// is attached to the timeout. Session-fatal errors end the wait at once.
pub async fn poll_until_exists<B: Backend + ?Sized>(
    backend: &mut B,
    locator: &Locator,
    timeout: Duration,
    interval: Duration,
) -> Result<(), BackendError> {
    let deadline = Instant::now() + timeout;
    let mut last_error = None;
    loop {
        match backend.exists(locator).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) if e.is_session_fatal() => return Err(e),
            Err(e) => {
                debug!("Polling for {} failed, retrying: {}", locator, e);
                last_error = Some(e);
            }
        }
        if Instant::now() >= deadline {
            let operation = match last_error {
                Some(e) => format!("wait for {} (last error: {})", locator, e),
                None => format!("wait for {}", locator),
            };
            return Err(BackendError::timeout(operation));
        }
        sleep(interval).await;
    }
}
