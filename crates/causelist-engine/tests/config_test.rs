use causelist_engine::config::{CauselistConfig, ConfigError, ConfigLoader};
use causelist_engine::protocol::{ListType, SelectOption};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_defaults_match_portal() {
    let config = CauselistConfig::default();
    assert_eq!(
        config.portal.base_url,
        "https://services.ecourts.gov.in/ecourtindia_v6/?p=cause_list/"
    );
    assert_eq!(config.portal.form.results_table_class, "cause-list-table");
    assert_eq!(config.portal.form.submit_for(ListType::Criminal), "criminal_submit");
    assert!(config.browser.headless);
    assert_eq!(config.browser.implicit_wait(), Duration::from_secs(8));
    assert_eq!(config.captcha.threshold, 160);
    assert_eq!(config.captcha.page_seg_mode, 7);
    assert_eq!(config.output.dir, PathBuf::from("downloads"));
    assert_eq!(config.output.synthetic_records, 7);
    assert_eq!(config.fallback.states().len(), 4);
}

#[test]
fn test_partial_yaml_keeps_other_defaults() {
    let yaml = r#"
browser:
  headless: false
  webdriver_url: http://localhost:4444
timing:
  results_timeout_ms: 30000
output:
  dir: /var/lib/causelist
"#;
    let config: CauselistConfig = serde_yaml::from_str(yaml).unwrap();

    assert!(!config.browser.headless);
    assert_eq!(
        config.browser.webdriver_url.as_deref(),
        Some("http://localhost:4444")
    );
    assert_eq!(config.browser.window_width, 1920);
    assert_eq!(config.timing.results_timeout(), Duration::from_secs(30));
    assert_eq!(config.timing.page_ready_timeout(), Duration::from_secs(12));
    assert_eq!(config.output.dir, PathBuf::from("/var/lib/causelist"));
    assert_eq!(config.output.prefix, "cause_list");
    assert_eq!(config.portal.form.state, "state");
}

#[test]
fn test_fallback_catalog_replaced_from_yaml() {
    let yaml = r#"
fallback:
  states:
    - { value: GA, text: Goa }
  districts:
    GA:
      - { value: NG, text: North Goa }
"#;
    let config: CauselistConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.fallback.states(), vec![SelectOption::new("GA", "Goa")]);
    assert_eq!(config.fallback.districts("GA")[0].text, "North Goa");
    assert!(config.fallback.districts("KL").is_empty());
}

#[tokio::test]
async fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("causelist.yaml");
    std::fs::write(&path, "captcha:\n  tesseract_bin: /opt/tesseract/bin/tesseract\n").unwrap();

    let config = ConfigLoader::load(Some(&path)).await.unwrap();
    assert_eq!(config.captcha.tesseract_bin, "/opt/tesseract/bin/tesseract");
    assert_eq!(config.captcha.threshold, 160);
}

#[tokio::test]
async fn test_load_errors_carry_path() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("absent.yaml");
    let err = ConfigLoader::load_from(&missing).await.unwrap_err();
    assert!(matches!(err, ConfigError::Io { ref path, .. } if *path == missing));

    let broken = dir.path().join("broken.yaml");
    std::fs::write(&broken, "timing: [not, a, map").unwrap();
    let err = ConfigLoader::load_from(&broken).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("broken.yaml"));
}
