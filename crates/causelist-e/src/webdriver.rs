use causelist_engine::config::BrowserSettings;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;

pub struct WebDriverClient {
    pub client: Client,
}

impl WebDriverClient {
    pub async fn connect(
        url: &str,
        settings: &BrowserSettings,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(settings))
            .connect(url)
            .await
            .map_err(|e| format!("Failed to connect to WebDriver at {}: {}", url, e))?;

        client
            .update_timeouts(TimeoutConfiguration::new(
                None,
                None,
                Some(settings.implicit_wait()),
            ))
            .await
            .map_err(|e| format!("Failed to set implicit wait: {}", e))?;
        client
            .set_window_size(settings.window_width, settings.window_height)
            .await
            .map_err(|e| format!("Failed to size window: {}", e))?;

        Ok(Self { client })
    }

    pub async fn close(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.client
            .close()
            .await
            .map_err(|e| format!("Failed to close session: {}", e))?;
        Ok(())
    }
}

/// W3C capabilities for Chrome with the automation banner and flags hidden.
pub fn chrome_capabilities(settings: &BrowserSettings) -> serde_json::Map<String, serde_json::Value> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        format!(
            "--window-size={},{}",
            settings.window_width, settings.window_height
        ),
    ];
    if settings.headless {
        args.push("--headless=new".to_string());
    }

    let mut chrome_options = json!({
        "args": args,
        "excludeSwitches": ["enable-automation"],
        "useAutomationExtension": false,
    });
    if let Ok(chrome_bin) = std::env::var("CHROME_BIN") {
        chrome_options["binary"] = json!(chrome_bin);
    }

    let mut caps = serde_json::Map::new();
    caps.insert("browserName".into(), json!("chrome"));
    caps.insert("goog:chromeOptions".into(), chrome_options);
    caps
}
