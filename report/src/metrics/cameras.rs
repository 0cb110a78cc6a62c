use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::BTreeMap,
    ops::AddAssign,
};

/// One row of the camera grid, after correlation with the device table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraRecord {
    pub camera_name: String,
    pub address: String,
    /// `address` up to its first backslash, the key shared with [`DeviceRecord`].
    pub base_address: String,
    pub fw_version: String,
    pub recording_state: String,
    pub max_bitrate: String,
    pub connection_time: String,
    pub primary_target: String,
    pub current_block_class: String,
}

/// A `showDevices` row. Only lives until it has been merged into the camera grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRecord {
    pub base_address: String,
    pub fw_version: String,
    pub connection_time: String,
    pub max_bitrate: String,
}

/// Issue buckets per primary target. A camera may count as both offline and BVMS issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCounters {
    pub bvms_issues: u64,
    pub offline: u64,
    pub total: u64,
}

impl AddAssign for IssueCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.bvms_issues = self.bvms_issues.saturating_add(rhs.bvms_issues);
        self.offline = self.offline.saturating_add(rhs.offline);
        self.total = self.total.saturating_add(rhs.total);
    }
}

/// Counters derived from the live camera states rather than the cockpit snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalTotals {
    pub total_channels: u64,
    pub active_recordings: u64,
    pub offline_channels: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetActivity {
    pub total: u64,
    pub active: u64,
    pub offline: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedOverview {
    pub totals: OperationalTotals,
    pub per_vrm_derived: BTreeMap<String, TargetActivity>,
}

/// Output of the camera/device correlation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraReport {
    pub merged: Vec<CameraRecord>,
    pub per_vrm_counters: BTreeMap<String, IssueCounters>,
    pub derived_overview: DerivedOverview,
}
