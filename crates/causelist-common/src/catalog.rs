//! Static option catalog served when the live portal cannot be read.
//!
//! Keying is deliberately uneven and must stay that way: districts are keyed
//! by state code, complexes by district code alone, and courts by complex code
//! alone. Callers that pass a full path only ever look up the nearest parent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::protocol::SelectOption;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackCatalog {
    #[serde(default)]
    pub states: Vec<SelectOption>,
    /// state code -> districts
    #[serde(default)]
    pub districts: BTreeMap<String, Vec<SelectOption>>,
    /// district code -> court complexes
    #[serde(default)]
    pub complexes: BTreeMap<String, Vec<SelectOption>>,
    /// complex code -> courts
    #[serde(default)]
    pub courts: BTreeMap<String, Vec<SelectOption>>,
}

impl FallbackCatalog {
    pub fn states(&self) -> Vec<SelectOption> {
        self.states.clone()
    }

    pub fn districts(&self, state: &str) -> Vec<SelectOption> {
        lookup(&self.districts, state)
    }

    pub fn complexes(&self, district: &str) -> Vec<SelectOption> {
        lookup(&self.complexes, district)
    }

    pub fn courts(&self, complex: &str) -> Vec<SelectOption> {
        lookup(&self.courts, complex)
    }
}

fn lookup(map: &BTreeMap<String, Vec<SelectOption>>, key: &str) -> Vec<SelectOption> {
    map.get(key).cloned().unwrap_or_default()
}

fn options(pairs: &[(&str, &str)]) -> Vec<SelectOption> {
    pairs
        .iter()
        .map(|(value, text)| SelectOption::new(*value, *text))
        .collect()
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        let states = options(&[
            ("KL", "Kerala"),
            ("DL", "Delhi"),
            ("MH", "Maharashtra"),
            ("UP", "Uttar Pradesh"),
        ]);

        let districts = BTreeMap::from([
            (
                "KL".to_string(),
                options(&[("KLM", "Kochi"), ("KTR", "Kottayam")]),
            ),
            (
                "DL".to_string(),
                options(&[("DLI", "New Delhi"), ("ND", "North Delhi")]),
            ),
            (
                "MH".to_string(),
                options(&[("MUM", "Mumbai"), ("PUN", "Pune")]),
            ),
            (
                "UP".to_string(),
                options(&[("LUC", "Lucknow"), ("KAN", "Kanpur")]),
            ),
        ]);

        let complexes = BTreeMap::from([
            (
                "KLM".to_string(),
                options(&[("KLM-C1", "Kochi Court Complex")]),
            ),
            ("DLI".to_string(), options(&[("DLI-C1", "Tis Hazari")])),
            (
                "MUM".to_string(),
                options(&[("MUM-C1", "Bombay High Court")]),
            ),
        ]);

        let courts = BTreeMap::from([
            ("KLM-C1".to_string(), options(&[("KLM-01", "Civil Court 1")])),
            (
                "DLI-C1".to_string(),
                options(&[("DLI-01", "District Court 1")]),
            ),
            ("MUM-C1".to_string(), options(&[("MUM-01", "Civil Court A")])),
        ]);

        Self {
            states,
            districts,
            complexes,
            courts,
        }
    }
}
