//! Page-side scripts and their evaluation over CDP.

use causelist_engine::backend::BackendError;
use causelist_engine::protocol::Locator;
use chromiumoxide::Page;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// Default timeout for JavaScript evaluation (10 seconds).
/// This prevents hanging when dialogs (alert/confirm/prompt) block the JS thread.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum retries for context errors during page navigation.
const MAX_CONTEXT_RETRIES: u32 = 10;

/// Delay between retries when context is not found (page navigating).
const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Check if an error indicates the page context is unavailable (e.g., during navigation).
fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

/// Evaluate `expression` and deserialize its value, retrying while the page
/// is between execution contexts.
pub async fn evaluate<T: DeserializeOwned>(page: &Page, expression: &str) -> Result<T, BackendError> {
    let mut last_error = None;

    for attempt in 0..MAX_CONTEXT_RETRIES {
        match evaluate_with_timeout(page, expression).await {
            Ok(value) => return Ok(serde_json::from_value(value)?),
            Err(EvalError::Timeout) => {
                return Err(BackendError::timeout(
                    "script evaluation (possibly blocked by a dialog)",
                ));
            }
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    "Context error during evaluation (attempt {}/{}), retrying...",
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(EvalError::Other(err_str)) => return Err(BackendError::Script(err_str)),
        }
    }

    Err(BackendError::Script(last_error.unwrap_or_else(|| {
        "Evaluation failed after retries".to_string()
    })))
}

async fn evaluate_with_timeout(
    page: &Page,
    expression: &str,
) -> Result<serde_json::Value, EvalError> {
    let eval_result = tokio::time::timeout(EVAL_TIMEOUT, page.evaluate(expression)).await;

    match eval_result {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => {
            let err_str = e.to_string();
            if is_context_error(&err_str) {
                Err(EvalError::Context(err_str))
            } else {
                Err(EvalError::Other(err_str))
            }
        }
        // `undefined` carries no value; treat it like `null`.
        Ok(Ok(remote_object)) => Ok(remote_object
            .value()
            .cloned()
            .unwrap_or(serde_json::Value::Null)),
    }
}

/// What a mutating script found on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptOutcome {
    Ok,
    Missing,
    NoOption,
}

impl ScriptOutcome {
    pub fn into_result(self, id: &str, value: &str) -> Result<(), BackendError> {
        match self {
            ScriptOutcome::Ok => Ok(()),
            ScriptOutcome::Missing => Err(BackendError::element_not_found(id)),
            ScriptOutcome::NoOption => Err(BackendError::OptionNotFound {
                target: id.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

pub fn exists_script(locator: &Locator) -> String {
    match locator {
        Locator::Id(id) => format!("document.getElementById({}) !== null", json!(id)),
        Locator::Class(class) => format!(
            "document.getElementsByClassName({}).length > 0",
            json!(class)
        ),
    }
}

/// Select by value and fire `change` so the page reloads dependent selectors.
pub fn select_script(id: &str, value: &str) -> String {
    format!(
        r#"(function(id, value) {{
  const el = document.getElementById(id);
  if (!el) return 'missing';
  if (!Array.from(el.options || []).some(o => o.value === value)) return 'no-option';
  el.value = value;
  el.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return 'ok';
}})({}, {})"#,
        json!(id),
        json!(value)
    )
}

/// Options in document order, or `null` when the selector is absent.
pub fn options_script(id: &str) -> String {
    format!(
        r#"(function(id) {{
  const el = document.getElementById(id);
  if (!el) return null;
  return Array.from(el.options || []).map(o => ({{ value: o.value, text: o.text }}));
}})({})"#,
        json!(id)
    )
}

pub fn set_value_script(id: &str, value: &str) -> String {
    format!(
        r#"(function(id, value) {{
  const el = document.getElementById(id);
  if (!el) return 'missing';
  el.value = value;
  return 'ok';
}})({}, {})"#,
        json!(id),
        json!(value)
    )
}
