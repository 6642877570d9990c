//! alumnyx-ingestion: Alumni profile ingestion pipeline.
//! - Company-entry normalisation (spacing, repeated phrases, noise truncation)
//! - Case-insensitive, order-preserving company list deduplication
//! - Document composition and stable record ids
//! - Embedding and vector index clients
//! - Batched embed + upsert pipeline

pub mod normalise;
pub mod dedup;
pub mod models;
pub mod document;
pub mod ids;
pub mod loader;
pub mod embedding;
pub mod index;
pub mod pipeline;

pub use dedup::clean_companies;
pub use normalise::clean_company_entry;
