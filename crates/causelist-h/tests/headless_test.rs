use causelist_engine::backend::{Backend, BackendError};
use causelist_engine::protocol::{Locator, SelectOption};
use causelist_h::HeadlessBackend;
use serial_test::serial;
use std::time::Duration;

const FORM: &str = r#"<html><head><title>Cause List</title></head><body>
<select id="state">
  <option value="">Select State</option>
  <option value="KL">Kerala</option>
  <option value="DL">Delhi</option>
</select>
<select id="district"><option value="">Select District</option></select>
<input id="date" type="text">
<input id="captcha" type="text">
<canvas id="captcha_image" width="90" height="30"></canvas>
<button id="civil_submit" onclick="document.body.insertAdjacentHTML('beforeend',
  '<table class=\'cause-list-table\'><tr><th>h</th></tr></table>')">Civil</button>
<script>
  document.getElementById('state').addEventListener('change', function (e) {
    var d = document.getElementById('district');
    if (e.target.value === 'KL') {
      d.innerHTML = '<option value=\'\'>Select District</option>'
        + '<option value=\'KLM\'>Kochi</option><option value=\'KTR\'>Kottayam</option>';
    }
  });
  var ctx = document.getElementById('captcha_image').getContext('2d');
  ctx.fillStyle = '#fff'; ctx.fillRect(0, 0, 90, 30);
  ctx.fillStyle = '#000'; ctx.font = '20px sans-serif'; ctx.fillText('AB12', 10, 22);
</script>
</body></html>"#;

/// Launches Chromium, or returns `None` when it is not installed.
async fn launch() -> Option<HeadlessBackend> {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::INFO)
        .try_init()
        .ok();

    let mut backend = HeadlessBackend::default();
    match backend.launch().await {
        Ok(()) => Some(backend),
        Err(e) => {
            eprintln!("Failed to launch browser (is Chromium installed?): {}", e);
            None
        }
    }
}

fn form_url() -> String {
    format!("data:text/html,{}", FORM.replace('#', "%23"))
}

#[tokio::test]
#[serial]
async fn test_form_interaction() {
    let Some(mut backend) = launch().await else {
        return;
    };

    let nav = backend.navigate(&form_url()).await.expect("Navigation failed");
    assert_eq!(nav.title, "Cause List");

    backend
        .wait_for(&Locator::id("state"), Duration::from_secs(5))
        .await
        .expect("state selector missing");
    let states = backend.read_options("state").await.unwrap();
    assert_eq!(states.len(), 3);
    assert_eq!(states[1], SelectOption::new("KL", "Kerala"));

    backend.select_value("state", "KL").await.unwrap();
    let districts = backend.read_options("district").await.unwrap();
    assert_eq!(districts[1], SelectOption::new("KLM", "Kochi"));

    let err = backend.select_value("state", "TN").await.unwrap_err();
    assert!(matches!(err, BackendError::OptionNotFound { .. }));

    backend.set_value("date", "2024-01-15").await.unwrap();
    backend.type_text("captcha", "AB12").await.unwrap();
    let png = backend.element_screenshot("captcha_image").await.unwrap();
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

    assert!(backend.exists(&Locator::id("civil_submit")).await.unwrap());
    assert!(!backend.exists(&Locator::id("criminal_submit")).await.unwrap());
    backend.click("civil_submit").await.unwrap();
    backend
        .wait_for(&Locator::class("cause-list-table"), Duration::from_secs(5))
        .await
        .expect("results table did not appear");

    let html = backend.page_source().await.unwrap();
    assert!(html.contains("cause-list-table"));

    backend.close().await.expect("Close failed");
    assert!(!backend.is_ready().await);
}

#[tokio::test]
#[serial]
async fn test_wait_for_missing_element_times_out() {
    let Some(mut backend) = launch().await else {
        return;
    };

    backend.navigate(&form_url()).await.unwrap();
    let err = backend
        .wait_for(&Locator::id("no_such_id"), Duration::from_millis(600))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Timeout { .. }));

    let err = backend.click("no_such_id").await.unwrap_err();
    assert_eq!(err, BackendError::element_not_found("no_such_id"));

    backend.close().await.unwrap();
}

#[tokio::test]
async fn test_operations_before_launch_are_not_ready() {
    let mut backend = HeadlessBackend::default();
    assert!(!backend.is_ready().await);
    assert_eq!(
        backend.page_source().await.unwrap_err(),
        BackendError::NotReady
    );
    assert_eq!(
        backend.navigate("about:blank").await.unwrap_err(),
        BackendError::NotReady
    );
    backend.close().await.unwrap();
}
