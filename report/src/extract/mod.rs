//! # Counter Extraction
//!
//! The cockpit page shows five channel counters, but where and how depends on firmware version and UI language. The
//! extraction is an ordered cascade of independent strategies, each one less precise than the previous:
//!
//! 1. [`TableScan`]: the devices table, recognized by its row labels
//! 2. [`LabelScan`]: `label`/`value` styled element pairs anywhere in the DOM
//! 3. [`WindowScan`]: regular expressions in a window around the devices heading
//! 4. [`PlainTextScan`]: `label: number` in the tag-stripped text
//!
//! The first strategy that reports success provides the totals. The per-unit breakdown is extracted independently of
//! the cascade, see [`per_unit`].

mod dom;
pub(crate) mod labels;
mod label_scan;
pub mod per_unit;
mod plain_scan;
mod table_scan;
mod window_scan;

use crate::{
    archive,
    metrics::{
        ExtractionSource,
        GlobalCounters,
        OverviewReport,
    },
};
pub use label_scan::LabelScan;
pub use plain_scan::PlainTextScan;
use scraper::Html;
pub use table_scan::TableScan;
pub use window_scan::WindowScan;

/// Repaired cockpit HTML, kept both as text and as parsed DOM.
pub struct Document {
    pub html: String,
    pub dom: Html,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: html.to_string(),
            dom: Html::parse_document(html),
        }
    }
}

/// One way of recovering the global counters from a document.
pub trait Strategy {
    fn source(&self) -> ExtractionSource;

    /// `None` when the strategy does not consider its findings conclusive.
    fn extract(&self, document: &Document) -> Option<GlobalCounters>;
}

/// Strategies in order of precedence.
pub const CASCADE: &[&dyn Strategy] = &[&TableScan, &LabelScan, &WindowScan, &PlainTextScan];

/// Runs the cascade and the per-unit extraction over repaired cockpit HTML.
pub fn extract_overview(html: &str) -> OverviewReport {
    let document = Document::parse(html);

    let (source, totals) = CASCADE
        .iter()
        .find_map(|strategy| strategy.extract(&document).map(|totals| (strategy.source(), totals)))
        .unwrap_or((ExtractionSource::PlainFallback, GlobalCounters::default()));
    debug!(%source, ?totals, "Extracted global counters");

    let per_vrm = per_unit::extract(&document);
    if !per_vrm.is_empty() {
        debug!(units = per_vrm.len(), "Extracted per-unit counters");
    }

    OverviewReport {
        totals,
        per_vrm,
        source,
    }
}

/// Unpacks a cockpit archive (`index.mhtml`) and extracts its counters.
///
/// An archive without a recognizable boundary yields zeroed totals and an empty breakdown.
pub fn parse_index(raw: &[u8]) -> OverviewReport {
    match archive::unpack(raw) {
        Ok(archive) => extract_overview(&archive.rendered_html()),
        Err(err) => {
            warn!(%err, "Cockpit archive is unusable, reporting zeroed counters");
            OverviewReport::default()
        }
    }
}
