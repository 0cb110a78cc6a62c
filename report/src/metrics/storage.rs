use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;

/// Verbatim row label (e.g. `Total number of targets`) to its value.
pub type LabelMap = BTreeMap<String, f64>;

/// One positional row of the `showTargets` detail table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetDetail {
    pub target: String,
    pub bitrate: f64,
    pub total: f64,
    pub available: f64,
    pub empty: f64,
    pub protected: f64,
}

/// Where a per-unit storage entry came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMeta {
    pub bvms: String,
    pub vrm: String,
    pub ip: String,
}

impl UnitMeta {
    /// `<bvms>/<vrm>`, or `<bvms>/<ip>` for units configured without a name.
    pub fn label(&self) -> String {
        let unit = if self.vrm.is_empty() { &self.ip } else { &self.vrm };
        format!("{}/{}", self.bvms, unit)
    }
}

/// Storage figures of a single unit inside an aggregated snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStorage {
    pub meta: UnitMeta,
    pub targets_summary: LabelMap,
    pub luns_summary: LabelMap,
    pub blocks_summary: LabelMap,
    pub details: Vec<TargetDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSummary {
    pub targets_summary: LabelMap,
    pub luns_summary: LabelMap,
    pub blocks_summary: LabelMap,
    pub details: Vec<TargetDetail>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub per_vrm: BTreeMap<String, UnitStorage>,
}

/// Adds every value of `from` onto `to`, inserting labels `to` does not know yet.
pub fn add_labels(to: &mut LabelMap, from: &LabelMap) {
    for (label, value) in from {
        *to.entry(label.clone()).or_default() += value;
    }
}
