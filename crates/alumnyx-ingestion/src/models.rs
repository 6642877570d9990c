//! Data models for the alumni ingestion pipeline.

use serde::{Deserialize, Serialize};

/// Display name used when a record has none.
pub const UNKNOWN_NAME: &str = "Unknown";

/// One scraped alumni profile as it appears in the export file.
///
/// Every field may be missing; use the accessors to read them with defaults
/// applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlumniRecord {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "LinkedIn URL", default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(rename = "Past Companies", default, skip_serializing_if = "Option::is_none")]
    pub past_companies: Option<Vec<String>>,
}

impl AlumniRecord {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_NAME)
    }

    pub fn linkedin_url(&self) -> &str {
        self.linkedin_url.as_deref().unwrap_or("")
    }

    /// Raw career-history entries, empty if absent.
    pub fn past_companies(&self) -> &[String] {
        self.past_companies.as_deref().unwrap_or(&[])
    }
}

/// Top-level shape of the alumni export: `{ "alumni": [ ... ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlumniExport {
    #[serde(default)]
    pub alumni: Vec<AlumniRecord>,
}

/// Metadata stored alongside each vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    pub name: String,
    pub linkedin_url: String,
    pub past_companies: Vec<String>,
    /// Number of raw entries before cleaning.
    pub raw_count: usize,
}

/// A record ready for embedding: stable id, composed document, metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedRecord {
    pub id: String,
    pub text: String,
    pub metadata: ProfileMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_fields() {
        let rec: AlumniRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(rec.name(), "Unknown");
        assert_eq!(rec.linkedin_url(), "");
        assert!(rec.past_companies().is_empty());
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let rec: AlumniRecord = serde_json::from_str(
            r#"{"Name": null, "LinkedIn URL": null, "Past Companies": null}"#,
        ).unwrap();
        assert_eq!(rec.name(), "Unknown");
        assert!(rec.past_companies().is_empty());
    }

    #[test]
    fn test_parses_export_field_names() {
        let json = r#"{"alumni": [{
            "Name": "Asha Rao",
            "LinkedIn URL": "https://www.linkedin.com/in/asharao",
            "Past Companies": ["Google", "McKinsey & Company"]
        }]}"#;
        let export: AlumniExport = serde_json::from_str(json).unwrap();
        assert_eq!(export.alumni.len(), 1);
        let rec = &export.alumni[0];
        assert_eq!(rec.name(), "Asha Rao");
        assert_eq!(rec.past_companies().len(), 2);
    }

    #[test]
    fn test_missing_alumni_key_is_empty() {
        let export: AlumniExport = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert!(export.alumni.is_empty());
    }
}
