use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::validation::ValidationError;

/// One entry of a dependent dropdown (state, district, complex or court).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }

    /// Placeholder entries ("Select State") carry an empty value or label.
    pub fn is_selectable(&self) -> bool {
        !self.value.trim().is_empty() && !self.text.trim().is_empty()
    }
}

/// Which branch of a resolver level produced its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OptionSource {
    Live,
    Fallback { reason: String },
}

/// Options for one hierarchy level, tagged with the branch that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOptions {
    pub options: Vec<SelectOption>,
    pub source: OptionSource,
}

impl ResolvedOptions {
    pub fn live(options: Vec<SelectOption>) -> Self {
        Self {
            options,
            source: OptionSource::Live,
        }
    }

    pub fn fallback(options: Vec<SelectOption>, reason: impl Into<String>) -> Self {
        Self {
            options,
            source: OptionSource::Fallback {
                reason: reason.into(),
            },
        }
    }

    pub fn total(&self) -> usize {
        self.options.len()
    }

    pub fn is_live(&self) -> bool {
        matches!(self.source, OptionSource::Live)
    }
}

/// `(state, district, complex, court)` codes, each a child of the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPath {
    pub state: String,
    pub district: String,
    pub complex: String,
    pub court: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Civil,
    Criminal,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Civil => "civil",
            ListType::Criminal => "criminal",
        }
    }

    /// The variant whose submit button is tried when ours is missing.
    pub fn other(&self) -> ListType {
        match self {
            ListType::Civil => ListType::Criminal,
            ListType::Criminal => ListType::Civil,
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "civil" => Ok(ListType::Civil),
            "criminal" => Ok(ListType::Criminal),
            _ => Err(ValidationError::InvalidListType(s.to_string())),
        }
    }
}

/// Immutable input to one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CauseListRequest {
    pub location: LocationPath,
    pub date: String,
    pub list_type: ListType,
}

impl CauseListRequest {
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            state: self.location.state.clone(),
            district: self.location.district.clone(),
            complex: self.location.complex.clone(),
            court: self.location.court.clone(),
            date: self.date.clone(),
            list_type: self.list_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub sr_no: String,
    pub case_no: String,
    pub petitioner: String,
    pub respondent: String,
    pub purpose: String,
}

impl CaseRecord {
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.sr_no,
            &self.case_no,
            &self.petitioner,
            &self.respondent,
            &self.purpose,
        ]
    }
}

/// Everything the renderer prints around the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub state: String,
    pub district: String,
    pub complex: String,
    pub court: String,
    pub date: String,
    pub list_type: ListType,
}

/// Where the records of a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Live,
    Synthetic,
}

/// Outcome of a pipeline run. `success` means a document was produced,
/// whether the records are live or synthetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<CaseRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RecordSource>,
}

impl AcquisitionResult {
    pub fn rendered(
        records: Vec<CaseRecord>,
        document_path: PathBuf,
        source: RecordSource,
        error: Option<String>,
    ) -> Self {
        Self {
            success: true,
            records,
            document_path: Some(document_path),
            error,
            source: Some(source),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            records: Vec::new(),
            document_path: None,
            error: Some(error.into()),
            source: None,
        }
    }

    /// Basename of the generated document, as handed to the download route.
    pub fn document_name(&self) -> Option<&str> {
        self.document_path
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
    }
}

/// How a backend finds an element on the portal page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    Class(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn class(class: impl Into<String>) -> Self {
        Locator::Class(class.into())
    }

    pub fn css(&self) -> String {
        match self {
            Locator::Id(id) => format!("#{}", id),
            Locator::Class(class) => format!(".{}", class),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_type_parse_is_case_insensitive() {
        assert_eq!("Civil".parse::<ListType>().unwrap(), ListType::Civil);
        assert_eq!(" criminal ".parse::<ListType>().unwrap(), ListType::Criminal);
        assert!("family".parse::<ListType>().is_err());
        assert_eq!(ListType::Civil.other(), ListType::Criminal);
    }

    #[test]
    fn test_placeholder_options_are_not_selectable() {
        assert!(SelectOption::new("KL", "Kerala").is_selectable());
        assert!(!SelectOption::new("", "Select State").is_selectable());
        assert!(!SelectOption::new("0", "  ").is_selectable());
    }

    #[test]
    fn test_document_name_is_basename() {
        let result = AcquisitionResult::rendered(
            vec![],
            PathBuf::from("/srv/downloads/cause_list_KL_KLM_20240115_101500.pdf"),
            RecordSource::Live,
            None,
        );
        assert_eq!(
            result.document_name(),
            Some("cause_list_KL_KLM_20240115_101500.pdf")
        );
        assert_eq!(AcquisitionResult::failed("disk full").document_name(), None);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let record = CaseRecord {
            sr_no: "1".into(),
            case_no: "OS/12/2024".into(),
            petitioner: "A".into(),
            respondent: "B".into(),
            purpose: "Hearing".into(),
        };
        let result = AcquisitionResult::rendered(
            vec![record],
            PathBuf::from("downloads/x.pdf"),
            RecordSource::Synthetic,
            Some("timeout".into()),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["documentPath"], "downloads/x.pdf");
        assert_eq!(json["records"][0]["caseNo"], "OS/12/2024");
        assert_eq!(json["source"], "synthetic");
    }

    #[test]
    fn test_locator_css() {
        assert_eq!(Locator::id("state").css(), "#state");
        assert_eq!(Locator::class("cause-list-table").to_string(), ".cause-list-table");
    }
}
