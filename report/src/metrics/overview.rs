use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::BTreeMap,
    ops::AddAssign,
};
use strum::{
    Display,
    EnumIter,
};

/// The five channel counters a VRM reports for itself and for each of its units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalCounters {
    pub total_channels: u64,
    pub offline_channels: u64,
    pub active_recordings: u64,
    pub idle: u64,
    pub signal_loss: u64,
}

/// Identifies one of the [`GlobalCounters`] fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Field {
    TotalChannels,
    OfflineChannels,
    ActiveRecordings,
    Idle,
    SignalLoss,
}

impl GlobalCounters {
    pub fn get(&self, field: Field) -> u64 {
        match field {
            Field::TotalChannels => self.total_channels,
            Field::OfflineChannels => self.offline_channels,
            Field::ActiveRecordings => self.active_recordings,
            Field::Idle => self.idle,
            Field::SignalLoss => self.signal_loss,
        }
    }

    pub fn set(&mut self, field: Field, value: u64) {
        let slot = match field {
            Field::TotalChannels => &mut self.total_channels,
            Field::OfflineChannels => &mut self.offline_channels,
            Field::ActiveRecordings => &mut self.active_recordings,
            Field::Idle => &mut self.idle,
            Field::SignalLoss => &mut self.signal_loss,
        };
        *slot = value;
    }

    /// `true` when every counter is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign for GlobalCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.total_channels = self.total_channels.saturating_add(rhs.total_channels);
        self.offline_channels = self.offline_channels.saturating_add(rhs.offline_channels);
        self.active_recordings = self.active_recordings.saturating_add(rhs.active_recordings);
        self.idle = self.idle.saturating_add(rhs.idle);
        self.signal_loss = self.signal_loss.saturating_add(rhs.signal_loss);
    }
}

/// Unit identifier (usually `<ip>\<group>`) to that unit's counters.
pub type PerUnitCounters = BTreeMap<String, GlobalCounters>;

/// Which extraction strategy produced a set of totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionSource {
    DevicesTable,
    Anywhere,
    DevicesSection,
    PlainFallback,
    /// The archive could not be unpacked, totals are zeroed.
    #[default]
    NoBoundary,
}

/// Counters recovered from the cockpit archive (`index.mhtml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewReport {
    pub totals: GlobalCounters,
    pub per_vrm: PerUnitCounters,
    pub source: ExtractionSource,
}

/// The overview as handed to consumers: totals after the camera-derived override, and the per-unit breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewFinal {
    pub totals: GlobalCounters,
    pub per_vrm: PerUnitCounters,
}
