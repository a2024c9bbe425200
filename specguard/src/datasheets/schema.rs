//! Specification Record Schema
//!
//! Structured key/value extraction of a datasheet plus the lines that could
//! not be read as key/value pairs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Specification parameters keyed by the datasheet's own parameter names.
pub type SpecMap = BTreeMap<String, String>;

/// Output of one extraction: the on-disk shape of a per-device document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSpec {
    #[serde(rename = "Specification", default)]
    pub specification: SpecMap,

    /// Unparsed lines, in input order
    #[serde(default)]
    pub notes: Vec<String>,
}

impl ExtractedSpec {
    pub fn is_empty(&self) -> bool {
        self.specification.is_empty() && self.notes.is_empty()
    }
}

/// One device's record as held by the store. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationRecord {
    #[serde(rename = "device", default)]
    device_id: String,

    #[serde(rename = "Specification", default)]
    specification: SpecMap,

    #[serde(default)]
    notes: Vec<String>,
}

impl SpecificationRecord {
    pub fn new(device_id: impl Into<String>, extracted: ExtractedSpec) -> Self {
        Self {
            device_id: device_id.into(),
            specification: extracted.specification,
            notes: extracted.notes,
        }
    }

    /// Same record filed under another id.
    pub(crate) fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn specification(&self) -> &SpecMap {
        &self.specification
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Look up a single parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.specification.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let mut specification = SpecMap::new();
        specification.insert("Operating Voltage".to_string(), "3.3V".to_string());
        let record = SpecificationRecord::new(
            "SEN0203",
            ExtractedSpec {
                specification,
                notes: vec!["Gravity interface".to_string()],
            },
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["device"], "SEN0203");
        assert_eq!(json["Specification"]["Operating Voltage"], "3.3V");
        assert_eq!(json["notes"][0], "Gravity interface");
        assert_eq!(record.get("Operating Voltage"), Some("3.3V"));
    }

    #[test]
    fn test_extracted_spec_missing_fields_default() {
        let spec: ExtractedSpec = serde_json::from_str("{}").unwrap();
        assert!(spec.is_empty());
    }
}
