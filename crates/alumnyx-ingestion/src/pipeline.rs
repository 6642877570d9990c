//! End-to-end ingestion pipeline.
//!
//! Orchestrates the full flow for a single ingestion job:
//!   1. Clean each record's company list and compose its document
//!   2. Derive a stable id per record
//!   3. Embed documents in fixed-size batches
//!   4. Upsert (id, vector, metadata) into the namespaced index
//!   5. Emit progress events via broadcast channel
//!
//! The pipeline is non-destructive: a failed batch is logged, recorded and
//! skipped, and the run continues with the next batch.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::document::{DocumentComposer, DEFAULT_AFFILIATION};
use crate::embedding::Embedder;
use crate::index::{VectorIndex, VectorRecord};
use crate::loader::prepare_records;
use crate::models::{AlumniRecord, PreparedRecord};

pub const DEFAULT_NAMESPACE: &str = "linkedin_profiles";
pub const DEFAULT_BATCH_SIZE: usize = 50;

// ── Job config ────────────────────────────────────────────────────────────────

/// Parameters for a single ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionJob {
    pub namespace: String,
    pub batch_size: usize,
    pub affiliation: String,
}

impl Default for IngestionJob {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            affiliation: DEFAULT_AFFILIATION.to_string(),
        }
    }
}

// ── Progress events ───────────────────────────────────────────────────────────

/// Progress event emitted during a pipeline run (cloneable for broadcast).
#[derive(Debug, Clone, Serialize)]
pub struct IngestionProgress {
    pub job_id: Uuid,
    pub stage: String,
    pub message: String,
    pub records_prepared: usize,
    pub batches_total: usize,
    pub batches_done: usize,
    pub vectors_upserted: usize,
    pub error: Option<String>,
}

impl IngestionProgress {
    fn new(job_id: Uuid, stage: &str, message: &str) -> Self {
        Self {
            job_id,
            stage: stage.to_string(),
            message: message.to_string(),
            records_prepared: 0,
            batches_total: 0,
            batches_done: 0,
            vectors_upserted: 0,
            error: None,
        }
    }
}

// ── Result summary ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct IngestionResult {
    pub job_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub namespace: String,
    pub records_loaded: usize,
    pub records_prepared: usize,
    /// Ids produced by more than one record in this run; later ones overwrite.
    pub duplicate_ids: usize,
    pub vectors_upserted: usize,
    pub batches_total: usize,
    pub batches_failed: usize,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

// ── Pipeline orchestrator ─────────────────────────────────────────────────────

/// Runs the ingestion pipeline for one job over already-loaded records.
///
/// Progress events are sent via `progress_tx` if provided.
#[instrument(skip(records, embedder, index, progress_tx), fields(n = records.len()))]
pub async fn run_ingestion(
    job: &IngestionJob,
    records: &[AlumniRecord],
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    progress_tx: Option<broadcast::Sender<IngestionProgress>>,
) -> IngestionResult {
    let job_id = Uuid::new_v4();
    let started_at = Utc::now();
    let t0 = std::time::Instant::now();

    info!(job_id = %job_id, namespace = %job.namespace, "Starting ingestion pipeline");

    let emit = |stage: &str, msg: &str, mut prog: IngestionProgress| {
        prog.stage = stage.to_string();
        prog.message = msg.to_string();
        if let Some(ref tx) = progress_tx {
            let _ = tx.send(prog);
        }
    };

    let mut result = IngestionResult {
        job_id,
        started_at,
        namespace: job.namespace.clone(),
        records_loaded: records.len(),
        records_prepared: 0,
        duplicate_ids: 0,
        vectors_upserted: 0,
        batches_total: 0,
        batches_failed: 0,
        errors: Vec::new(),
        duration_ms: 0,
    };

    // ── 1. Clean + compose ────────────────────────────────────────────────────
    let composer = DocumentComposer::new(job.affiliation.clone());
    let prepared = prepare_records(records, &composer);
    result.records_prepared = prepared.len();
    result.duplicate_ids = count_duplicate_ids(&prepared);
    if result.duplicate_ids > 0 {
        warn!(duplicates = result.duplicate_ids, "Records share ids; later records overwrite earlier ones");
    }

    let batch_size = job.batch_size.max(1);
    result.batches_total = prepared.len().div_ceil(batch_size);

    let mut prog = IngestionProgress::new(job_id, "prepare", "");
    prog.records_prepared = result.records_prepared;
    prog.batches_total = result.batches_total;
    emit("prepare", &format!("Prepared {} cleaned records", prepared.len()), prog.clone());

    // ── 2. Embed + upsert per batch ───────────────────────────────────────────
    for (batch_no, batch) in prepared.chunks(batch_size).enumerate() {
        match embed_and_upsert(&job.namespace, batch, embedder, index).await {
            Ok(n) => {
                result.vectors_upserted += n;
                prog.error = None;
            }
            Err(e) => {
                let msg = format!("batch {batch_no} failed: {e:#}");
                warn!("{}", &msg);
                result.errors.push(msg.clone());
                result.batches_failed += 1;
                prog.error = Some(msg);
            }
        }
        prog.batches_done = batch_no + 1;
        prog.vectors_upserted = result.vectors_upserted;
        emit("upsert", &format!("Batch {}/{}", batch_no + 1, result.batches_total), prog.clone());
    }

    result.duration_ms = t0.elapsed().as_millis() as u64;

    info!(
        job_id = %job_id,
        records          = result.records_prepared,
        vectors_upserted = result.vectors_upserted,
        batches_failed   = result.batches_failed,
        duration_ms      = result.duration_ms,
        "Ingestion pipeline complete"
    );

    prog.error = None;
    emit("complete", &format!(
        "Done. {} vectors upserted to `{}`, {} failed batches.",
        result.vectors_upserted, result.namespace, result.batches_failed
    ), prog);

    result
}

async fn embed_and_upsert(
    namespace: &str,
    batch: &[PreparedRecord],
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
) -> anyhow::Result<usize> {
    let texts: Vec<String> = batch.iter().map(|r| r.text.clone()).collect();
    let vectors = embedder.embed_batch(&texts).await?;
    if vectors.len() != batch.len() {
        anyhow::bail!("embedder returned {} vectors for {} documents", vectors.len(), batch.len());
    }
    let dim = embedder.dim();
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        anyhow::bail!("embedder returned a vector of dimension {}, expected {dim}", bad.len());
    }
    let records: Vec<VectorRecord> = batch
        .iter()
        .zip(vectors)
        .map(|(r, values)| VectorRecord {
            id: r.id.clone(),
            values,
            metadata: r.metadata.clone(),
        })
        .collect();
    index.upsert(namespace, &records).await
}

fn count_duplicate_ids(prepared: &[PreparedRecord]) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in prepared {
        *counts.entry(r.id.as_str()).or_default() += 1;
    }
    counts.values().map(|c| c - 1).sum()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
