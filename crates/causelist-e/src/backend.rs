use crate::chromedriver::{self, ChromeDriverProcess};
use crate::webdriver::WebDriverClient;
use async_trait::async_trait;
use causelist_engine::backend::{Backend, BackendError, NavigationResult};
use causelist_engine::config::BrowserSettings;
use causelist_engine::protocol::{Locator, SelectOption};
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct WebDriverBackend {
    client: Option<WebDriverClient>,
    driver_process: Option<ChromeDriverProcess>,
    settings: BrowserSettings,
}

impl WebDriverBackend {
    /// Connects to `settings.webdriver_url`, or spawns a local chromedriver
    /// on `settings.chromedriver_port` when none is configured.
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            client: None,
            driver_process: None,
            settings,
        }
    }

    pub fn with_url(webdriver_url: impl Into<String>) -> Self {
        Self::new(BrowserSettings {
            webdriver_url: Some(webdriver_url.into()),
            ..Default::default()
        })
    }

    fn client(&self) -> Result<&WebDriverClient, BackendError> {
        self.client.as_ref().ok_or(BackendError::NotReady)
    }

    async fn get_navigation_result(
        client: &WebDriverClient,
    ) -> Result<NavigationResult, BackendError> {
        let title = client.client.title().await.unwrap_or_default();
        let url = client
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_default();

        Ok(NavigationResult { url, title })
    }

    async fn find(&self, id: &str) -> Result<Element, BackendError> {
        self.client()?
            .client
            .find(fantoccini::Locator::Id(id))
            .await
            .map_err(|e| map_cmd_error(e, id))
    }

    async fn execute(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, BackendError> {
        self.client()?
            .client
            .execute(script, args)
            .await
            .map_err(|e| BackendError::Script(e.to_string()))
    }
}

impl Default for WebDriverBackend {
    fn default() -> Self {
        Self::new(BrowserSettings::default())
    }
}

fn map_cmd_error(err: CmdError, target: &str) -> BackendError {
    if err.is_no_such_element() {
        BackendError::element_not_found(target)
    } else if matches!(err, CmdError::Lost(_)) {
        BackendError::ConnectionLost
    } else {
        BackendError::Other(err.to_string())
    }
}

const EXISTS_BY_ID: &str = "return document.getElementById(arguments[0]) !== null;";
const EXISTS_BY_CLASS: &str =
    "return document.getElementsByClassName(arguments[0]).length > 0;";
const SET_VALUE: &str = r#"
const el = document.getElementById(arguments[0]);
if (!el) return false;
el.value = arguments[1];
return true;"#;

#[async_trait]
impl Backend for WebDriverBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        let webdriver_url = match &self.settings.webdriver_url {
            Some(url) => {
                info!("Connecting to external WebDriver at {}...", url);
                url.clone()
            }
            None => {
                let process = chromedriver::launch_chromedriver(self.settings.chromedriver_port)
                    .await
                    .map_err(BackendError::Launch)?;
                let url = process.webdriver_url();
                self.driver_process = Some(process);
                url
            }
        };

        match WebDriverClient::connect(&webdriver_url, &self.settings).await {
            Ok(client) => {
                self.client = Some(client);
                Ok(())
            }
            Err(e) => {
                // Kill the driver we spawned; the session never started.
                self.driver_process = None;
                Err(BackendError::Launch(e.to_string()))
            }
        }
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        let closed = match self.client.take() {
            Some(client) => client
                .close()
                .await
                .map_err(|e| BackendError::Other(e.to_string())),
            None => Ok(()),
        };
        // Explicitly drop the driver process to trigger its cleanup
        self.driver_process = None;
        closed
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;

        info!("Navigating to: {}", url);
        client
            .client
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;

        Self::get_navigation_result(client).await
    }

    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> Result<(), BackendError> {
        let css = locator.css();
        self.client()?
            .client
            .wait()
            .at_most(timeout)
            .every(POLL_INTERVAL)
            .for_element(fantoccini::Locator::Css(&css))
            .await
            .map(|_| ())
            .map_err(|e| match e {
                CmdError::WaitTimeout => BackendError::timeout(format!("wait for {}", locator)),
                other => map_cmd_error(other, &css),
            })
    }

    async fn exists(&mut self, locator: &Locator) -> Result<bool, BackendError> {
        let (script, name) = match locator {
            Locator::Id(id) => (EXISTS_BY_ID, id),
            Locator::Class(class) => (EXISTS_BY_CLASS, class),
        };
        let found = self.execute(script, vec![json!(name)]).await?;
        Ok(found.as_bool().unwrap_or(false))
    }

    async fn select_value(&mut self, id: &str, value: &str) -> Result<(), BackendError> {
        let element = self.find(id).await?;
        element.select_by_value(value).await.map_err(|e| {
            if e.is_no_such_element() {
                BackendError::OptionNotFound {
                    target: id.to_string(),
                    value: value.to_string(),
                }
            } else {
                map_cmd_error(e, id)
            }
        })
    }

    async fn read_options(&mut self, id: &str) -> Result<Vec<SelectOption>, BackendError> {
        let element = self.find(id).await?;
        let options = element
            .find_all(fantoccini::Locator::Css("option"))
            .await
            .map_err(|e| map_cmd_error(e, id))?;

        let mut result = Vec::with_capacity(options.len());
        for option in options {
            let value = option
                .attr("value")
                .await
                .map_err(|e| map_cmd_error(e, id))?
                .unwrap_or_default();
            let text = option.text().await.map_err(|e| map_cmd_error(e, id))?;
            result.push(SelectOption::new(value, text));
        }
        debug!("Read {} option(s) from #{}", result.len(), id);
        Ok(result)
    }

    async fn set_value(&mut self, id: &str, value: &str) -> Result<(), BackendError> {
        let found = self.execute(SET_VALUE, vec![json!(id), json!(value)]).await?;
        if found.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(BackendError::element_not_found(id))
        }
    }

    async fn type_text(&mut self, id: &str, text: &str) -> Result<(), BackendError> {
        let element = self.find(id).await?;
        element.clear().await.map_err(|e| map_cmd_error(e, id))?;
        if !text.is_empty() {
            element
                .send_keys(text)
                .await
                .map_err(|e| map_cmd_error(e, id))?;
        }
        Ok(())
    }

    async fn click(&mut self, id: &str) -> Result<(), BackendError> {
        let element = self.find(id).await?;
        element.click().await.map_err(|e| map_cmd_error(e, id))
    }

    async fn element_screenshot(&mut self, id: &str) -> Result<Vec<u8>, BackendError> {
        let element = self.find(id).await?;
        element
            .screenshot()
            .await
            .map_err(|e| BackendError::Screenshot {
                target: id.to_string(),
                reason: e.to_string(),
            })
    }

    async fn page_source(&mut self) -> Result<String, BackendError> {
        self.client()?
            .client
            .source()
            .await
            .map_err(|e| BackendError::Other(format!("Reading page source failed: {}", e)))
    }
}
