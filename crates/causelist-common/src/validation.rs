//! Request validation performed before a pipeline run is started.

use serde::{Deserialize, Serialize};

use crate::protocol::{CauseListRequest, ListType, LocationPath};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing field {0}")]
    MissingField(&'static str),

    #[error("Unknown list type '{0}' (expected civil or criminal)")]
    InvalidListType(String),
}

/// Raw request body as it arrives from a caller; every field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFields {
    pub state: Option<String>,
    pub district: Option<String>,
    pub complex: Option<String>,
    pub court: Option<String>,
    pub date: Option<String>,
    pub list_type: Option<String>,
}

impl RequestFields {
    /// Rejects the first missing or blank field, in declaration order.
    pub fn validate(self) -> Result<CauseListRequest, ValidationError> {
        let state = required("state", self.state)?;
        let district = required("district", self.district)?;
        let complex = required("complex", self.complex)?;
        let court = required("court", self.court)?;
        let date = required("date", self.date)?;
        let list_type: ListType = required("listType", self.list_type)?.parse()?;

        Ok(CauseListRequest {
            location: LocationPath {
                state,
                district,
                complex,
                court,
            },
            date,
            list_type,
        })
    }
}

fn required(name: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ValidationError::MissingField(name)),
    }
}
