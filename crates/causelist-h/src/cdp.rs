use causelist_engine::config::BrowserSettings;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

pub struct CdpClient {
    pub browser: Browser,
    pub handler_task: JoinHandle<()>,
    pub page: Page,
    user_data_dir: Option<PathBuf>,
    cleanup_user_data_dir: bool,
}

impl CdpClient {
    pub async fn launch(
        settings: &BrowserSettings,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut config_builder = BrowserConfig::builder()
            .no_sandbox() // Often needed in docker/CI/restricted envs
            .window_size(settings.window_width, settings.window_height)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled");
        let (user_data_dir, cleanup_user_data_dir) = resolve_user_data_dir()?;
        config_builder = config_builder.user_data_dir(&user_data_dir);

        if settings.headless {
            tracing::info!("Launching browser in headless mode");
        } else {
            tracing::info!("Launching browser in visible mode");
            config_builder = config_builder.with_head();
        }

        // Support custom Chrome path via CHROME_BIN environment variable
        if let Ok(chrome_bin) = std::env::var("CHROME_BIN") {
            tracing::info!("Using custom Chrome binary: {}", chrome_bin);
            config_builder = config_builder.chrome_executable(chrome_bin);
        }

        let config = match config_builder.build() {
            Ok(config) => config,
            Err(e) => {
                discard_user_data_dir(&user_data_dir, cleanup_user_data_dir);
                return Err(format!("Failed to build browser config: {}", e).into());
            }
        };

        let (mut browser, mut handler) = match Browser::launch(config).await {
            Ok(launched) => launched,
            Err(e) => {
                discard_user_data_dir(&user_data_dir, cleanup_user_data_dir);
                return Err(format!("Failed to launch browser: {}", e).into());
            }
        };

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(e) = h {
                    tracing::debug!("Browser handler error (ignoring): {}", e);
                    continue;
                }
            }
            tracing::info!("Browser handler task ended");
        });

        let page = match open_page(&browser).await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                discard_user_data_dir(&user_data_dir, cleanup_user_data_dir);
                return Err(e.into());
            }
        };

        Ok(Self {
            browser,
            handler_task,
            page,
            user_data_dir: Some(user_data_dir),
            cleanup_user_data_dir,
        })
    }

    pub async fn close(mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| format!("Error closing browser: {}", e));
        let _ = self.browser.wait().await;
        self.handler_task.abort();

        if let Some(dir) = &self.user_data_dir {
            discard_user_data_dir(dir, self.cleanup_user_data_dir);
        }

        closed?;
        Ok(())
    }
}

/// Blank page with JavaScript dialogs auto-accepted.
async fn open_page(browser: &Browser) -> Result<Page, String> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| format!("Failed to create page: {}", e))?;

    // The portal reports validation problems (bad CAPTCHA, no sitting) through
    // alert(); accept them so evaluation never blocks.
    let mut dialog_events = page
        .event_listener::<chromiumoxide::cdp::browser_protocol::page::EventJavascriptDialogOpening>()
        .await
        .map_err(|e| format!("Failed to subscribe to dialog events: {}", e))?;

    let page_clone = page.clone();
    tokio::spawn(async move {
        while let Some(event) = dialog_events.next().await {
            tracing::info!("Portal dialog: {} ({:?})", event.message, event.r#type);
            let cmd =
                chromiumoxide::cdp::browser_protocol::page::HandleJavaScriptDialogParams::new(true);
            if let Err(e) = page_clone.execute(cmd).await {
                tracing::warn!("Failed to accept dialog: {}", e);
            }
        }
    });

    Ok(page)
}

/// Remove a profile directory this client created; caller-provided ones stay.
fn discard_user_data_dir(dir: &Path, owned: bool) {
    if !owned {
        return;
    }
    if let Err(e) = std::fs::remove_dir_all(dir) {
        tracing::debug!("Failed to clean up user-data-dir {}: {}", dir.display(), e);
    }
}

fn resolve_user_data_dir() -> Result<(PathBuf, bool), Box<dyn std::error::Error + Send + Sync>> {
    if let Ok(dir) = std::env::var("CAUSELIST_USER_DATA_DIR") {
        let path = PathBuf::from(dir);
        std::fs::create_dir_all(&path)?;
        tracing::info!(
            "Using user data dir from CAUSELIST_USER_DATA_DIR: {}",
            path.display()
        );
        return Ok((path, false));
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("System clock error: {}", e))?
        .as_nanos();
    let unique = format!("causelist-chromium-profile-{}-{}", std::process::id(), nanos);
    let path = std::env::temp_dir().join(unique);
    std::fs::create_dir_all(&path)?;
    tracing::debug!("Using isolated user data dir: {}", path.display());
    Ok((path, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn own_profiles() -> usize {
        let prefix = format!("causelist-chromium-profile-{}-", std::process::id());
        std::fs::read_dir(std::env::temp_dir())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
                    .count()
            })
            .unwrap_or(0)
    }

    #[tokio::test]
    #[serial]
    async fn test_failed_launch_removes_temporary_profile() {
        // SAFETY: serialised; no other test in this binary reads these variables.
        unsafe {
            std::env::remove_var("CAUSELIST_USER_DATA_DIR");
            std::env::set_var("CHROME_BIN", "/nonexistent/causelist-chrome");
        }
        let before = own_profiles();

        let result = CdpClient::launch(&BrowserSettings::default()).await;

        unsafe {
            std::env::remove_var("CHROME_BIN");
        }
        assert!(result.is_err());
        assert_eq!(own_profiles(), before);
    }

    #[test]
    fn test_caller_profile_is_kept() {
        let dir = std::env::temp_dir().join(format!("causelist-kept-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        discard_user_data_dir(&dir, false);
        assert!(dir.exists());
        discard_user_data_dir(&dir, true);
        assert!(!dir.exists());
    }
}
