//! Composition of the per-profile document that gets embedded.

use crate::models::AlumniRecord;

/// Affiliation used when none is configured.
pub const DEFAULT_AFFILIATION: &str = "BITSoM MBA";

/// Text used in place of the company list when nothing survived cleaning.
pub const NO_COMPANIES: &str = "No verified past companies";

/// Rendered in the document when the record has no URL field at all.
const MISSING_URL: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentComposer {
    affiliation: String,
}

impl Default for DocumentComposer {
    fn default() -> Self {
        Self::new(DEFAULT_AFFILIATION)
    }
}

impl DocumentComposer {
    pub fn new(affiliation: impl Into<String>) -> Self {
        Self { affiliation: affiliation.into() }
    }

    /// Three-line description: affiliation, profile link, company list.
    pub fn compose(&self, name: &str, url: &str, companies: &[String]) -> String {
        let companies_text = if companies.is_empty() {
            NO_COMPANIES.to_string()
        } else {
            companies.join(", ")
        };
        format!(
            "{name} is a {affiliation} Alumni.\n\
             LinkedIn profile: {url}.\n\
             Verified past companies: {companies_text}.",
            affiliation = self.affiliation,
        )
    }

    /// Compose for a raw record and its cleaned company list.
    pub fn compose_record(&self, record: &AlumniRecord, companies: &[String]) -> String {
        let url = record.linkedin_url.as_deref().unwrap_or(MISSING_URL);
        self.compose(record.name(), url, companies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_with_companies() {
        let doc = DocumentComposer::default().compose(
            "Asha Rao",
            "https://www.linkedin.com/in/asharao",
            &["Google".to_string(), "Microsoft".to_string()],
        );
        assert_eq!(
            doc,
            "Asha Rao is a BITSoM MBA Alumni.\n\
             LinkedIn profile: https://www.linkedin.com/in/asharao.\n\
             Verified past companies: Google, Microsoft."
        );
    }

    #[test]
    fn test_compose_empty_list_uses_fallback() {
        let doc = DocumentComposer::new("IIM Ahmedabad PGP").compose("Ravi", "u", &[]);
        assert!(doc.starts_with("Ravi is a IIM Ahmedabad PGP Alumni.\n"));
        assert!(doc.ends_with("Verified past companies: No verified past companies."));
    }

    #[test]
    fn test_compose_record_defaults() {
        let doc = DocumentComposer::default().compose_record(&AlumniRecord::default(), &[]);
        assert!(doc.starts_with("Unknown is a BITSoM MBA Alumni."));
        assert!(doc.contains("LinkedIn profile: N/A."));
    }
}
