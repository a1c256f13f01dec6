mod ingest_engine;

pub use ingest_engine::{IngestConfig, IngestEngine};
