use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Common paths where chromedriver might be installed
const CHROMEDRIVER_PATHS: &[&str] = &[
    "/usr/bin/chromedriver",
    "/usr/local/bin/chromedriver",
    "/usr/lib/chromium/chromedriver",
    "/usr/lib/chromium-browser/chromedriver",
    "/snap/bin/chromium.chromedriver",
    "/opt/homebrew/bin/chromedriver",
];

const READY_ATTEMPTS: u32 = 30;
const READY_POLL: Duration = Duration::from_millis(200);

/// Find chromedriver: `CHROMEDRIVER` env var, then PATH, then common install paths.
pub fn find_chromedriver_binary() -> Option<String> {
    if let Ok(path) = std::env::var("CHROMEDRIVER") {
        if !path.trim().is_empty() {
            return Some(path);
        }
    }

    if let Ok(output) = Command::new("which").arg("chromedriver").output() {
        if output.status.success() {
            if let Ok(path) = String::from_utf8(output.stdout) {
                let path = path.trim();
                if !path.is_empty() {
                    return Some(path.to_string());
                }
            }
        }
    }

    CHROMEDRIVER_PATHS
        .iter()
        .find(|path| std::path::Path::new(path).exists())
        .map(|path| path.to_string())
}

/// Handle to a running chromedriver process; killed on drop.
pub struct ChromeDriverProcess {
    child: Child,
    port: u16,
}

impl ChromeDriverProcess {
    pub fn webdriver_url(&self) -> String {
        webdriver_url(self.port)
    }
}

impl Drop for ChromeDriverProcess {
    fn drop(&mut self) {
        info!("Shutting down chromedriver process...");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn webdriver_url(port: u16) -> String {
    format!("http://localhost:{}", port)
}

/// Spawn chromedriver on `port` and wait until its `/status` endpoint answers.
pub async fn launch_chromedriver(port: u16) -> Result<ChromeDriverProcess, String> {
    let binary = find_chromedriver_binary().ok_or_else(|| {
        "chromedriver not found (install it or set CHROMEDRIVER / browser.webdriver_url)"
            .to_string()
    })?;

    info!("Starting {} on port {}", binary, port);
    let child = Command::new(&binary)
        .arg(format!("--port={}", port))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("Failed to launch chromedriver: {}", e))?;

    info!("chromedriver launched with PID: {}", child.id());
    // Dropping the handle on any early return kills the process.
    let process = ChromeDriverProcess { child, port };

    let url = format!("{}/status", process.webdriver_url());
    let client = reqwest::Client::new();

    for attempt in 1..=READY_ATTEMPTS {
        sleep(READY_POLL).await;

        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("chromedriver ready after {} attempts", attempt);
                return Ok(process);
            }
            Ok(_) => {
                warn!(
                    "chromedriver responded but not ready yet (attempt {})",
                    attempt
                );
            }
            Err(_) => {
                if attempt % 5 == 0 {
                    info!("Waiting for chromedriver... (attempt {})", attempt);
                }
            }
        }
    }

    Err("chromedriver did not become ready within timeout".to_string())
}
