use crate::cdp::CdpClient;
use crate::inject::{self, ScriptOutcome};
use async_trait::async_trait;
use causelist_engine::backend::{Backend, BackendError, NavigationResult, poll_until_exists};
use causelist_engine::config::BrowserSettings;
use causelist_engine::protocol::{Locator, SelectOption};
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use std::time::Duration;
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct HeadlessBackend {
    client: Option<CdpClient>,
    settings: BrowserSettings,
}

impl HeadlessBackend {
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            client: None,
            settings,
        }
    }

    fn page(&self) -> Result<&Page, BackendError> {
        self.client
            .as_ref()
            .map(|client| &client.page)
            .ok_or(BackendError::NotReady)
    }

    async fn get_navigation_result(page: &Page) -> Result<NavigationResult, BackendError> {
        let title = page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = page
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult { url, title })
    }

    async fn find(&self, id: &str) -> Result<chromiumoxide::Element, BackendError> {
        self.page()?
            .find_element(Locator::id(id).css())
            .await
            .map_err(|_| BackendError::element_not_found(id))
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(BrowserSettings::default())
    }
}

#[async_trait]
impl Backend for HeadlessBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Launching Headless Backend (Chromium)...");
        let client = CdpClient::launch(&self.settings)
            .await
            .map_err(|e| BackendError::Launch(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        let page = self.page()?;

        info!("Navigating to: {}", url);
        page.goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;

        Self::get_navigation_result(page).await
    }

    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> Result<(), BackendError> {
        poll_until_exists(self, locator, timeout, POLL_INTERVAL).await
    }

    async fn exists(&mut self, locator: &Locator) -> Result<bool, BackendError> {
        inject::evaluate(self.page()?, &inject::exists_script(locator)).await
    }

    async fn select_value(&mut self, id: &str, value: &str) -> Result<(), BackendError> {
        let outcome: ScriptOutcome =
            inject::evaluate(self.page()?, &inject::select_script(id, value)).await?;
        outcome.into_result(id, value)
    }

    async fn read_options(&mut self, id: &str) -> Result<Vec<SelectOption>, BackendError> {
        let options: Option<Vec<SelectOption>> =
            inject::evaluate(self.page()?, &inject::options_script(id)).await?;
        let options = options.ok_or_else(|| BackendError::element_not_found(id))?;
        debug!("Read {} option(s) from #{}", options.len(), id);
        Ok(options)
    }

    async fn set_value(&mut self, id: &str, value: &str) -> Result<(), BackendError> {
        let outcome: ScriptOutcome =
            inject::evaluate(self.page()?, &inject::set_value_script(id, value)).await?;
        outcome.into_result(id, value)
    }

    async fn type_text(&mut self, id: &str, text: &str) -> Result<(), BackendError> {
        self.set_value(id, "").await?;
        let element = self.find(id).await?;
        element
            .click()
            .await
            .map_err(|e| BackendError::Script(format!("focus #{} failed: {}", id, e)))?;
        if !text.is_empty() {
            element
                .type_str(text)
                .await
                .map_err(|e| BackendError::Script(format!("typing into #{} failed: {}", id, e)))?;
        }
        Ok(())
    }

    async fn click(&mut self, id: &str) -> Result<(), BackendError> {
        let element = self.find(id).await?;
        element
            .click()
            .await
            .map_err(|e| BackendError::Script(format!("click #{} failed: {}", id, e)))?;
        Ok(())
    }

    async fn element_screenshot(&mut self, id: &str) -> Result<Vec<u8>, BackendError> {
        let element = self.find(id).await?;
        element
            .screenshot(CaptureScreenshotFormat::Png)
            .await
            .map_err(|e| BackendError::Screenshot {
                target: id.to_string(),
                reason: e.to_string(),
            })
    }

    async fn page_source(&mut self) -> Result<String, BackendError> {
        self.page()?
            .content()
            .await
            .map_err(|e| BackendError::Other(format!("Reading page content failed: {}", e)))
    }
}
