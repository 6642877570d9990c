//! Offline end-to-end pipeline test: stub embedder + in-memory index.
//!
//! ```bash
//! cargo test --package alumnyx-ingestion --test test_pipeline_offline
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alumnyx_ingestion::embedding::{Embedder, ZeroEmbedder};
use alumnyx_ingestion::index::InMemoryIndex;
use alumnyx_ingestion::ids::record_id;
use alumnyx_ingestion::loader::parse_alumni;
use alumnyx_ingestion::pipeline::{run_ingestion, IngestionJob};
use async_trait::async_trait;

const EXPORT: &str = r#"{"alumni": [
    {
        "Name": "Asha Rao",
        "LinkedIn URL": "https://www.linkedin.com/in/asharao",
        "Past Companies": [
            "GoogleGoogle · Full-time",
            "Google 2 yrs 3 mos",
            "Amazon Web Services (AWS)Full-time Jun 2019 - Aug 2021"
        ]
    },
    {
        "Name": "Ravi Kumar",
        "LinkedIn URL": "https://www.linkedin.com/in/ravikumar",
        "Past Companies": ["A", "Jan 2020 - Present"]
    },
    {
        "LinkedIn URL": "https://www.linkedin.com/in/anon",
        "Past Companies": ["Beta Co", "Alpha Co", "BETA CO 2021"]
    }
]}"#;

/// Embedder that fails every `fail_every`-th call.
struct FlakyEmbedder {
    calls: AtomicUsize,
    fail_every: usize,
}

#[async_trait]
impl Embedder for FlakyEmbedder {
    fn dim(&self) -> usize { 2 }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n % self.fail_every == 0 {
            anyhow::bail!("simulated embedding outage");
        }
        Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
    }
}

/// Embedder that keeps every text it was asked to embed.
#[derive(Default)]
struct RecordingEmbedder {
    texts: Mutex<Vec<String>>,
}

#[async_trait]
impl Embedder for RecordingEmbedder {
    fn dim(&self) -> usize { 2 }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.texts.lock().unwrap().extend_from_slice(texts);
        Ok(vec![vec![0.0; 2]; texts.len()])
    }
}

#[tokio::test]
async fn test_pipeline_upserts_every_record() {
    let records = parse_alumni(EXPORT).unwrap();
    let index = InMemoryIndex::new();
    let job = IngestionJob { batch_size: 2, ..Default::default() };

    let result = run_ingestion(&job, &records, &ZeroEmbedder::new(8), &index, None).await;

    assert_eq!(result.records_loaded, 3);
    assert_eq!(result.records_prepared, 3);
    assert_eq!(result.batches_total, 2);
    assert_eq!(result.batches_failed, 0);
    assert_eq!(result.vectors_upserted, 3);
    assert!(result.errors.is_empty());
    assert_eq!(index.len("linkedin_profiles").await, 3);

    let asha = index.get("linkedin_profiles", &record_id(&records[0])).await.unwrap();
    assert_eq!(asha.metadata.past_companies, vec!["Google", "Amazon Web Services (AWS)"]);
    assert_eq!(asha.metadata.raw_count, 3);
    assert_eq!(asha.values.len(), 8);

    let ravi = index.get("linkedin_profiles", &record_id(&records[1])).await.unwrap();
    assert!(ravi.metadata.past_companies.is_empty());

    let anon = index.get("linkedin_profiles", &record_id(&records[2])).await.unwrap();
    assert_eq!(anon.metadata.name, "Unknown");
    assert_eq!(anon.metadata.past_companies, vec!["Beta Co", "Alpha Co"]);
}

#[tokio::test]
async fn test_failed_batch_is_skipped_and_reported() {
    let records = parse_alumni(EXPORT).unwrap();
    let index = InMemoryIndex::new();
    let job = IngestionJob { batch_size: 1, namespace: "test".to_string(), ..Default::default() };
    let embedder = FlakyEmbedder { calls: AtomicUsize::new(0), fail_every: 2 };

    let result = run_ingestion(&job, &records, &embedder, &index, None).await;

    assert_eq!(result.batches_total, 3);
    assert_eq!(result.batches_failed, 1);
    assert_eq!(result.vectors_upserted, 2);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("simulated embedding outage"));
    assert_eq!(index.len("test").await, 2);
    assert!(index.get("test", &record_id(&records[1])).await.is_none());
}

#[tokio::test]
async fn test_progress_events_are_broadcast() {
    let records = parse_alumni(EXPORT).unwrap();
    let index = InMemoryIndex::new();
    let (tx, mut rx) = tokio::sync::broadcast::channel(16);
    let job = IngestionJob { batch_size: 2, ..Default::default() };

    run_ingestion(&job, &records, &ZeroEmbedder::new(2), &index, Some(tx)).await;

    let mut stages = Vec::new();
    while let Ok(p) = rx.try_recv() {
        stages.push(p.stage.clone());
    }
    assert_eq!(stages, vec!["prepare", "upsert", "upsert", "complete"]);
}

#[tokio::test]
async fn test_documents_carry_affiliation() {
    let records = parse_alumni(EXPORT).unwrap();
    let index = InMemoryIndex::new();
    let job = IngestionJob { affiliation: "IIM Bangalore PGP".to_string(), ..Default::default() };
    let embedder = RecordingEmbedder::default();

    let result = run_ingestion(&job, &records, &embedder, &index, None).await;
    assert_eq!(result.batches_failed, 0);

    let texts = embedder.texts.lock().unwrap();
    assert_eq!(texts.len(), 3);
    assert!(texts[0].starts_with("Asha Rao is a IIM Bangalore PGP Alumni."));
    assert!(texts[1].starts_with("Ravi Kumar is a IIM Bangalore PGP Alumni."));
    assert!(texts[1].ends_with("Verified past companies: No verified past companies."));
    assert!(texts.iter().all(|t| !t.contains("BITSoM")));
}
