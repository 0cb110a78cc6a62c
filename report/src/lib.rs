//! # VRM Report
//!
//! Extraction and aggregation engine for the report documents a Bosch VRM
//! (Video Recording Manager) exposes.
//!
//! ## Features
//!
//! - **Archive unpacking**: MHTML snapshots of the VRM cockpit are split into parts, transfer and charset decoded,
//!   and the rendered page is repaired from UTF-8/Latin-1 mojibake
//! - **Channel counters**: a cascade of extraction strategies recovers the global counters (total, offline, active,
//!   idle, signal loss) in English, Spanish and Portuguese firmware builds
//! - **Camera grid**: `showCameras` and `showDevices` tables are correlated by base address and classified into
//!   issue buckets
//! - **Storage**: `showTargets` summaries (targets, LUNs, blocks) and per-target capacity rows
//! - **Aggregation**: per-endpoint reports are merged into one snapshot
//!
//! ## Architecture
//!
//! - **`archive`**: multipart unpacking and mojibake repair
//! - **`extract`**: the counter extraction cascade and the per-unit breakdown
//! - **`cameras`**: camera/device correlation and issue classification
//! - **`storage`**: storage summary parsing
//! - **`aggregate`**: the cross-endpoint merge
//! - **`metrics`**: the data model shared by all of the above
//!
//! Everything in this crate is synchronous and free of I/O: callers hand in document contents and get owned values
//! back. No stage returns an error for malformed input, each one falls back to zeroed or empty values instead.
//!
//! ## Usage
//!
//! ```no_run
//! use vrm_report::{
//!     EndpointDocuments,
//!     EndpointReport,
//!     Snapshot,
//! };
//!
//! let documents = EndpointDocuments {
//!     index: Some(std::fs::read("index.mhtml").unwrap()),
//!     ..Default::default()
//! };
//! let mut snapshot = Snapshot::default();
//! snapshot.merge(EndpointReport::from_documents(&documents));
//! println!("{}", snapshot.overview_final.totals.total_channels);
//! ```

#[macro_use]
extern crate tracing;

pub mod aggregate;
pub mod archive;
pub mod cameras;
pub mod endpoint;
pub mod extract;
pub mod metrics;
pub mod storage;
mod text;

pub use aggregate::{
    MergePolicy,
    Snapshot,
};
pub use archive::{
    repair_mojibake,
    unpack,
    Archive,
    ArchiveError,
};
pub use cameras::correlate;
pub use endpoint::{
    EndpointDocuments,
    EndpointReport,
};
pub use extract::{
    extract_overview,
    parse_index,
};
pub use metrics::*;
pub use storage::parse_targets;
