//! Loading the alumni export and turning records into embeddable documents.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::dedup::clean_companies;
use crate::document::DocumentComposer;
use crate::ids::record_id;
use crate::models::{AlumniExport, AlumniRecord, PreparedRecord, ProfileMetadata};

/// Read the alumni export JSON from disk.
#[instrument]
pub fn load_alumni(path: &Path) -> Result<Vec<AlumniRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read alumni export {}", path.display()))?;
    let records = parse_alumni(&content)
        .with_context(|| format!("malformed alumni export {}", path.display()))?;
    info!(path = %path.display(), n = records.len(), "Loaded alumni records");
    Ok(records)
}

/// Parse an alumni export from a JSON string.
pub fn parse_alumni(json: &str) -> Result<Vec<AlumniRecord>> {
    let export: AlumniExport = serde_json::from_str(json)?;
    Ok(export.alumni)
}

/// Clean, compose and identify a single record.
pub fn prepare_record(record: &AlumniRecord, composer: &DocumentComposer) -> PreparedRecord {
    let companies = clean_companies(record.past_companies());
    let text = composer.compose_record(record, &companies);
    debug!(
        name = record.name(),
        raw = record.past_companies().len(),
        kept = companies.len(),
        "Record prepared"
    );
    PreparedRecord {
        id: record_id(record),
        text,
        metadata: ProfileMetadata {
            name: record.name().to_string(),
            linkedin_url: record.linkedin_url().to_string(),
            past_companies: companies,
            raw_count: record.past_companies().len(),
        },
    }
}

/// Prepare every record, preserving input order.
pub fn prepare_records(records: &[AlumniRecord], composer: &DocumentComposer) -> Vec<PreparedRecord> {
    records.iter().map(|r| prepare_record(r, composer)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{"alumni": [
        {
            "Name": "Asha Rao",
            "LinkedIn URL": "https://www.linkedin.com/in/asharao",
            "Past Companies": [
                "GoogleGoogle · Full-time",
                "Google 2 yrs 3 mos",
                "McKinsey & Company Jun 2019 - Aug 2021"
            ]
        },
        { "Name": "Ravi" }
    ]}"#;

    #[test]
    fn test_parse_and_prepare() {
        let records = parse_alumni(SAMPLE).unwrap();
        let prepared = prepare_records(&records, &DocumentComposer::default());
        assert_eq!(prepared.len(), 2);

        let asha = &prepared[0];
        assert_eq!(asha.metadata.past_companies, vec!["Google", "Mc Kinsey & Company"]);
        assert_eq!(asha.metadata.raw_count, 3);
        assert!(asha.text.ends_with("Verified past companies: Google, Mc Kinsey & Company."));

        let ravi = &prepared[1];
        assert_eq!(ravi.metadata.linkedin_url, "");
        assert_eq!(ravi.metadata.raw_count, 0);
        assert!(ravi.text.contains("No verified past companies"));
    }

    #[test]
    fn test_prepare_does_not_mutate_input() {
        let records = parse_alumni(SAMPLE).unwrap();
        let before = records.clone();
        let _ = prepare_records(&records, &DocumentComposer::default());
        assert_eq!(records, before);
    }

    #[test]
    fn test_load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(SAMPLE.as_bytes()).unwrap();
        let records = load_alumni(f.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"{not json").unwrap();
        let err = load_alumni(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("malformed alumni export"));

        let missing = load_alumni(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{missing:#}").contains("failed to read"));
    }
}
