//! Symptom surveillance
//!
//! Regional, privacy-safe symptom counts for public-health reporting:
//! - `aggregator`: per-region, per-window symptom counts
//! - `store`: storage collaborator with memory and file backends, query retry
//! - `intake`: anonymize → validate → store pipeline
//!
//! ```text
//! RawSymptomReport → IntakePipeline ─→ SymptomStore
//!                                          │ query_with_retry
//!                                          ↓
//!                          RegionAggregator → RegionAggregate
//! ```

pub mod aggregator;
pub mod handler;
pub mod intake;
pub mod store;

pub use aggregator::{aggregate, RegionAggregate, RegionAggregator, RegionKey};
pub use handler::{surveillance_router, SurveillanceState};
pub use intake::{BatchOutcome, IntakePipeline, RejectedReport};
pub use store::{
    open_store, query_with_retry, FileSymptomStore, MemorySymptomStore, RetryPolicy, SymptomStore,
};
