#![allow(dead_code)]

use async_trait::async_trait;
use causelist_engine::backend::{Backend, BackendError, NavigationResult};
use causelist_engine::captcha::{RecognitionError, TextRecognizer};
use causelist_engine::config::{CauselistConfig, TimingConfig};
use causelist_engine::protocol::{Locator, SelectOption};
use causelist_engine::session::SessionManager;
use image::{GrayImage, ImageFormat, Luma};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Launch,
    Close,
    Navigate(String),
    WaitFor(Locator),
    Exists(Locator),
    Select(String, String),
    ReadOptions(String),
    SetValue(String, String),
    TypeText(String, String),
    Click(String),
    Screenshot(String),
    PageSource,
}

/// Scripted portal page. Every element exists unless listed in `missing`;
/// operations fail when registered in `failures` as `op` or `op:target`.
#[derive(Debug)]
pub struct MockBackend {
    pub options: HashMap<String, Vec<SelectOption>>,
    pub missing: HashSet<Locator>,
    pub failures: HashMap<String, BackendError>,
    pub fail_launch: bool,
    pub page_html: String,
    pub screenshot: Vec<u8>,
    pub calls: Vec<Call>,
    pub ready: bool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            options: HashMap::new(),
            missing: HashSet::new(),
            failures: HashMap::new(),
            fail_launch: false,
            page_html: String::new(),
            screenshot: captcha_png(),
            calls: Vec::new(),
            ready: false,
        }
    }
}

impl MockBackend {
    pub fn with_options(mut self, id: &str, pairs: &[(&str, &str)]) -> Self {
        let options = pairs
            .iter()
            .map(|(value, text)| SelectOption::new(*value, *text))
            .collect();
        self.options.insert(id.to_string(), options);
        self
    }

    pub fn failing(mut self, key: &str, error: BackendError) -> Self {
        self.failures.insert(key.to_string(), error);
        self
    }

    pub fn without(mut self, locator: Locator) -> Self {
        self.missing.insert(locator);
        self
    }

    pub fn with_page(mut self, html: &str) -> Self {
        self.page_html = html.to_string();
        self
    }

    pub fn navigations(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Navigate(_)))
            .count()
    }

    pub fn selections(&self) -> Vec<(String, String)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Select(id, value) => Some((id.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    fn check(&self, op: &str, target: Option<&str>) -> Result<(), BackendError> {
        let targeted = target.and_then(|t| self.failures.get(&format!("{}:{}", op, t)));
        match targeted.or_else(|| self.failures.get(op)) {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        self.calls.push(Call::Launch);
        if self.fail_launch {
            return Err(BackendError::Launch("chromedriver not found".into()));
        }
        self.ready = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.calls.push(Call::Close);
        self.ready = false;
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.ready
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        self.calls.push(Call::Navigate(url.to_string()));
        self.check("navigate", None)?;
        Ok(NavigationResult {
            url: url.to_string(),
            title: "Cause List".into(),
        })
    }

    async fn wait_for(&mut self, locator: &Locator, _: Duration) -> Result<(), BackendError> {
        self.calls.push(Call::WaitFor(locator.clone()));
        self.check("wait_for", Some(&locator.css()))?;
        if self.missing.contains(locator) {
            return Err(BackendError::timeout(format!("wait for {}", locator)));
        }
        Ok(())
    }

    async fn exists(&mut self, locator: &Locator) -> Result<bool, BackendError> {
        self.calls.push(Call::Exists(locator.clone()));
        self.check("exists", Some(&locator.css()))?;
        Ok(!self.missing.contains(locator))
    }

    async fn select_value(&mut self, id: &str, value: &str) -> Result<(), BackendError> {
        self.calls.push(Call::Select(id.into(), value.into()));
        self.check("select_value", Some(id))
    }

    async fn read_options(&mut self, id: &str) -> Result<Vec<SelectOption>, BackendError> {
        self.calls.push(Call::ReadOptions(id.into()));
        self.check("read_options", Some(id))?;
        Ok(self.options.get(id).cloned().unwrap_or_default())
    }

    async fn set_value(&mut self, id: &str, value: &str) -> Result<(), BackendError> {
        self.calls.push(Call::SetValue(id.into(), value.into()));
        self.check("set_value", Some(id))
    }

    async fn type_text(&mut self, id: &str, text: &str) -> Result<(), BackendError> {
        self.calls.push(Call::TypeText(id.into(), text.into()));
        self.check("type_text", Some(id))
    }

    async fn click(&mut self, id: &str) -> Result<(), BackendError> {
        self.calls.push(Call::Click(id.into()));
        self.check("click", Some(id))
    }

    async fn element_screenshot(&mut self, id: &str) -> Result<Vec<u8>, BackendError> {
        self.calls.push(Call::Screenshot(id.into()));
        self.check("element_screenshot", Some(id))?;
        Ok(self.screenshot.clone())
    }

    async fn page_source(&mut self) -> Result<String, BackendError> {
        self.calls.push(Call::PageSource);
        self.check("page_source", None)?;
        Ok(self.page_html.clone())
    }
}

/// Returns a fixed answer, or fails when constructed with `failing()`.
pub struct StubRecognizer {
    answer: Option<String>,
}

impl StubRecognizer {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { answer: None }
    }
}

#[async_trait]
impl TextRecognizer for StubRecognizer {
    async fn recognize(&self, _: &GrayImage) -> Result<String, RecognitionError> {
        self.answer.clone().ok_or(RecognitionError::Timeout)
    }
}

/// Small noisy grey image standing in for the portal's CAPTCHA.
pub fn captcha_png() -> Vec<u8> {
    let image = GrayImage::from_fn(24, 8, |x, y| Luma([((x * 11 + y * 7) % 256) as u8]));
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    png
}

pub fn session(backend: MockBackend) -> SessionManager<MockBackend> {
    SessionManager::new(Box::new(backend), "https://portal.test/cause_list")
}

/// Defaults with all waits zeroed and documents written under `output`.
pub fn test_config(output: &Path) -> CauselistConfig {
    let mut config = CauselistConfig::default();
    config.timing = TimingConfig::immediate();
    config.output.dir = output.to_path_buf();
    config
}

pub const RESULTS_PAGE: &str = r#"<html><body>
<table class="cause-list-table">
  <tr><th>Sr. No.</th><th>Case No.</th><th>Petitioner</th><th>Respondent</th><th>Purpose</th></tr>
  <tr><td> 1 </td><td>OS/101/2023</td><td> Ravi Kumar </td><td>State of Kerala</td><td>Hearing</td></tr>
  <tr><td>2</td><td>OS/17/2024</td><td>Anitha M.</td><td> Joseph K. </td><td> Evidence </td></tr>
</table>
</body></html>"#;
