use causelist_common::catalog::FallbackCatalog;
use causelist_common::protocol::ListType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CauselistConfig {
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub captcha: CaptchaConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub fallback: FallbackCatalog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub form: FormIds,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            form: FormIds::default(),
        }
    }
}

fn default_base_url() -> String {
    "https://services.ecourts.gov.in/ecourtindia_v6/?p=cause_list/".to_string()
}

/// Element ids (and the results table class) of the cause-list form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormIds {
    pub state: String,
    pub district: String,
    pub court_complex: String,
    pub court: String,
    pub date: String,
    pub captcha: String,
    pub captcha_image: String,
    pub civil_submit: String,
    pub criminal_submit: String,
    pub results_table_class: String,
}

impl FormIds {
    pub fn submit_for(&self, list_type: ListType) -> &str {
        match list_type {
            ListType::Civil => &self.civil_submit,
            ListType::Criminal => &self.criminal_submit,
        }
    }
}

impl Default for FormIds {
    fn default() -> Self {
        Self {
            state: "state".into(),
            district: "district".into(),
            court_complex: "court_complex".into(),
            court: "court".into(),
            date: "date".into(),
            captcha: "captcha".into(),
            captcha_image: "captcha_image".into(),
            civil_submit: "civil_submit".into(),
            criminal_submit: "criminal_submit".into(),
            results_table_class: "cause-list-table".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub implicit_wait_ms: u64,
    /// External WebDriver server; a local chromedriver is spawned when absent.
    pub webdriver_url: Option<String>,
    pub chromedriver_port: u16,
}

impl BrowserSettings {
    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            implicit_wait_ms: 8000,
            webdriver_url: None,
            chromedriver_port: 9515,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait for the first selector after a fresh page load.
    pub page_ready_timeout_ms: u64,
    /// Wait for a dependent selector after its parent changed.
    pub dependent_timeout_ms: u64,
    /// Wait for the results table after submitting.
    pub results_timeout_ms: u64,
    pub page_settle_ms: u64,
    pub dependent_settle_ms: u64,
    pub selection_settle_ms: u64,
}

impl TimingConfig {
    pub fn page_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.page_ready_timeout_ms)
    }

    pub fn dependent_timeout(&self) -> Duration {
        Duration::from_millis(self.dependent_timeout_ms)
    }

    pub fn results_timeout(&self) -> Duration {
        Duration::from_millis(self.results_timeout_ms)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn dependent_settle(&self) -> Duration {
        Duration::from_millis(self.dependent_settle_ms)
    }

    pub fn selection_settle(&self) -> Duration {
        Duration::from_millis(self.selection_settle_ms)
    }

    /// All waits and delays zeroed; used by tests driving a mock backend.
    pub fn immediate() -> Self {
        Self {
            page_ready_timeout_ms: 0,
            dependent_timeout_ms: 0,
            results_timeout_ms: 0,
            page_settle_ms: 0,
            dependent_settle_ms: 0,
            selection_settle_ms: 0,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            page_ready_timeout_ms: 12000,
            dependent_timeout_ms: 8000,
            results_timeout_ms: 12000,
            page_settle_ms: 1500,
            dependent_settle_ms: 1000,
            selection_settle_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptchaConfig {
    /// Luminance above which a pixel becomes white.
    pub threshold: u8,
    pub tesseract_bin: String,
    pub page_seg_mode: u8,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            threshold: 160,
            tesseract_bin: "tesseract".into(),
            page_seg_mode: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub prefix: String,
    pub synthetic_records: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("downloads"),
            prefix: "cause_list".into(),
            synthetic_records: 7,
        }
    }
}
