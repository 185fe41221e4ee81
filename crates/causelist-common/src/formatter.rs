use crate::protocol::{AcquisitionResult, OptionSource, RecordSource, ResolvedOptions};

/// Longest cell kept on a line before it is cut with "...".
const MAX_CELL_WIDTH: usize = 32;

pub fn format_options(resolved: &ResolvedOptions) -> String {
    let mut output = match &resolved.source {
        OptionSource::Live => format!("{} option(s) from live portal\n", resolved.total()),
        OptionSource::Fallback { reason } => format!(
            "{} option(s) from fallback catalog ({})\n",
            resolved.total(),
            reason
        ),
    };

    for option in &resolved.options {
        output.push_str(&format!("  {:<12} {}\n", option.value, option.text));
    }

    output.trim_end().to_string()
}

pub fn format_result(result: &AcquisitionResult) -> String {
    if !result.success {
        return format!(
            "Error: {}",
            result.error.as_deref().unwrap_or("Unknown error")
        );
    }

    let mut output = String::new();
    match result.source {
        Some(RecordSource::Live) => output.push_str("Cause list scraped successfully\n"),
        Some(RecordSource::Synthetic) | None => {
            output.push_str("Live portal unavailable, sample cause list generated\n")
        }
    }
    if let Some(reason) = &result.error {
        output.push_str(&format!("  reason: {}\n", reason));
    }
    if let Some(path) = &result.document_path {
        output.push_str(&format!("  document: {}\n", path.display()));
    }
    output.push_str(&format!("  records: {}\n", result.records.len()));

    for record in &result.records {
        let cells: Vec<String> = record.cells().iter().map(|c| truncate(c)).collect();
        output.push_str(&format!("  {}\n", cells.join(" | ")));
    }

    output.trim_end().to_string()
}

fn truncate(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL_WIDTH {
        return cell.to_string();
    }
    let kept: String = cell.chars().take(MAX_CELL_WIDTH - 3).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CaseRecord, SelectOption};
    use std::path::PathBuf;

    #[test]
    fn test_format_live_options() {
        let resolved = ResolvedOptions::live(vec![
            SelectOption::new("KL", "Kerala"),
            SelectOption::new("DL", "Delhi"),
        ]);
        let out = format_options(&resolved);
        assert!(out.starts_with("2 option(s) from live portal"));
        assert!(out.contains("KL"));
        assert!(out.contains("Delhi"));
    }

    #[test]
    fn test_format_fallback_options_shows_reason() {
        let resolved = ResolvedOptions::fallback(vec![], "Timeout: wait for #district");
        let out = format_options(&resolved);
        assert_eq!(
            out,
            "0 option(s) from fallback catalog (Timeout: wait for #district)"
        );
    }

    #[test]
    fn test_format_failed_result() {
        let out = format_result(&AcquisitionResult::failed("disk full"));
        assert_eq!(out, "Error: disk full");
    }

    #[test]
    fn test_format_synthetic_result() {
        let record = CaseRecord {
            sr_no: "1".into(),
            case_no: "KL/KLM/1".into(),
            petitioner: "Petitioner 1".into(),
            respondent: "A respondent with an unusually long registered name".into(),
            purpose: "Hearing".into(),
        };
        let result = AcquisitionResult::rendered(
            vec![record],
            PathBuf::from("downloads/cause_list_KL_KLM_20240115_101500.pdf"),
            RecordSource::Synthetic,
            Some("Element #civil_submit not found".into()),
        );
        let out = format_result(&result);
        assert!(out.contains("sample cause list generated"));
        assert!(out.contains("reason: Element #civil_submit not found"));
        assert!(out.contains("records: 1"));
        assert!(out.contains("KL/KLM/1"));
        assert!(out.contains("A respondent with an unusuall..."));
        assert!(!out.contains("registered name"));
    }
}
