//! Cross-endpoint aggregation.
//!
//! Endpoints are merged one at a time into a [`Snapshot`] in configured order. Counters and storage labels add up and
//! lists are concatenated. How a unit that shows up in more than one cockpit is combined is up to the [`MergePolicy`].

use crate::{
    endpoint::EndpointReport,
    metrics::{
        add_labels,
        CameraRecord,
        IssueCounters,
        OverviewFinal,
        StorageSummary,
        UnitStorage,
    },
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;
use strum::{
    Display,
    EnumString,
};

/// How per-unit cockpit counters are combined when two endpoints report the same unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// The endpoint merged last wins.
    #[default]
    Overwrite,
    /// Counters are added field by field, like the issue counters.
    Sum,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub overview_final: OverviewFinal,
    pub per_vrm_counters: BTreeMap<String, IssueCounters>,
    pub cameras: Vec<CameraRecord>,
    pub targets: StorageSummary,
    /// Number of endpoint reports merged so far.
    pub endpoints: usize,
    #[serde(skip)]
    policy: MergePolicy,
}

impl Snapshot {
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Folds reports in iteration order into an empty snapshot.
    pub fn from_reports(policy: MergePolicy, reports: impl IntoIterator<Item = EndpointReport>) -> Self {
        reports.into_iter().fold(Self::new(policy), |mut snapshot, report| {
            snapshot.merge(report);
            snapshot
        })
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn merge(&mut self, report: EndpointReport) {
        let EndpointReport {
            overview_final,
            per_vrm_counters,
            targets,
            cameras,
            unit,
            ..
        } = report;

        self.overview_final.totals += overview_final.totals;
        for (unit_key, counters) in overview_final.per_vrm {
            match self.policy {
                MergePolicy::Overwrite => {
                    self.overview_final.per_vrm.insert(unit_key, counters);
                }
                MergePolicy::Sum => *self.overview_final.per_vrm.entry(unit_key).or_default() += counters,
            }
        }

        for (target, counters) in per_vrm_counters {
            *self.per_vrm_counters.entry(target).or_default() += counters;
        }

        self.cameras.extend(cameras);

        add_labels(&mut self.targets.targets_summary, &targets.targets_summary);
        add_labels(&mut self.targets.luns_summary, &targets.luns_summary);
        add_labels(&mut self.targets.blocks_summary, &targets.blocks_summary);

        if let Some(meta) = unit {
            let entry = self.targets.per_vrm.entry(meta.label()).or_insert_with(|| UnitStorage {
                meta,
                ..Default::default()
            });
            add_labels(&mut entry.targets_summary, &targets.targets_summary);
            add_labels(&mut entry.luns_summary, &targets.luns_summary);
            add_labels(&mut entry.blocks_summary, &targets.blocks_summary);
            entry.details.extend(targets.details.iter().cloned());
        }
        self.targets.details.extend(targets.details);

        self.endpoints += 1;
    }
}
