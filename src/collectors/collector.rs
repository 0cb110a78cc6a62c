use color_eyre::Result;
use vrm_report::Snapshot;

/// A view over the aggregated snapshot that can render itself as a table or as JSON.
pub trait Collector {
    /// Take the data this collector reports on from the snapshot
    fn collect(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Format data for display
    fn format(&self) -> String;

    /// Get data summary as JSON, keyed by the dashboard's field names
    fn summary(&self) -> serde_json::Value;

    /// Get the name of this collector
    fn name(&self) -> &'static str;
}
