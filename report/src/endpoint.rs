//! Everything one VRM endpoint contributes to a snapshot.

use crate::{
    cameras,
    extract,
    metrics::{
        CameraRecord,
        DerivedOverview,
        ExtractionSource,
        IssueCounters,
        OverviewFinal,
        OverviewReport,
        StorageSummary,
        UnitMeta,
    },
    storage,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;

/// The four pages fetched from an endpoint. Any of them may be missing.
#[derive(Debug, Clone, Default)]
pub struct EndpointDocuments {
    /// Cockpit snapshot (`index.mhtml`), kept as bytes so Latin-1 bodies survive.
    pub index: Option<Vec<u8>>,
    /// `showCameras.html`
    pub cameras: Option<String>,
    /// `showDevices.html`
    pub devices: Option<String>,
    /// `showTargets.html`
    pub targets: Option<String>,
    pub unit: Option<UnitMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointReport {
    pub overview_final: OverviewFinal,
    pub per_vrm_counters: BTreeMap<String, IssueCounters>,
    pub targets: StorageSummary,
    pub cameras: Vec<CameraRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_overview: Option<DerivedOverview>,
    /// The strategy that produced the archive totals.
    pub source: ExtractionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitMeta>,
}

impl EndpointReport {
    /// Runs every parser whose input is present.
    ///
    /// The camera grid is only correlated when both the camera and the device page are present. When it is, the
    /// number of cameras actually recording replaces the cockpit's `activeRecordings`.
    pub fn from_documents(documents: &EndpointDocuments) -> Self {
        let OverviewReport {
            mut totals,
            per_vrm,
            source,
        } = documents.index.as_deref().map(extract::parse_index).unwrap_or_default();

        let grid = match (&documents.cameras, &documents.devices) {
            (Some(cameras_html), Some(devices_html)) => Some(cameras::correlate(cameras_html, devices_html)),
            _ => None,
        };
        if let Some(grid) = &grid {
            totals.active_recordings = grid.derived_overview.totals.active_recordings;
        }

        let targets = documents.targets.as_deref().map(storage::parse_targets).unwrap_or_default();

        let (cameras, per_vrm_counters, derived_overview) = match grid {
            Some(grid) => (grid.merged, grid.per_vrm_counters, Some(grid.derived_overview)),
            None => Default::default(),
        };

        Self {
            overview_final: OverviewFinal { totals, per_vrm },
            per_vrm_counters,
            targets,
            cameras,
            derived_overview,
            source,
            unit: documents.unit.clone(),
        }
    }
}
