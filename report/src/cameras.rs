//! Camera grid: `showCameras` and `showDevices` correlated by base address.
//!
//! Both pages are plain tables whose column order differs between firmware versions, so columns are resolved by
//! header text. Missing columns yield empty strings, the row is still reported.

use crate::{
    metrics::{
        CameraRecord,
        CameraReport,
        DerivedOverview,
        DeviceRecord,
        IssueCounters,
        OperationalTotals,
        TargetActivity,
    },
    text::{
        element_text,
        header_key,
    },
};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{
    ElementRef,
    Html,
    Selector,
};
use std::collections::{
    BTreeMap,
    HashMap,
};

const UNKNOWN_TARGET: &str = "unknown";

lazy_static! {
    static ref TABLE_ROW: Selector = Selector::parse("table tr").expect("row selector");
    static ref HEADER_CELL: Selector = Selector::parse("th").expect("header selector");
    static ref DATA_CELL: Selector = Selector::parse("td").expect("cell selector");
    static ref LINK: Selector = Selector::parse("a").expect("link selector");
    static ref CLASS_ATTRIBUTE: Regex = Regex::new(r#"(?i)class=['"]([^'"]+)['"]"#).expect("class pattern");
    static ref RECORDING_DISABLED: Regex = Regex::new(r"(?i)recording\s*disabled").expect("pattern");
    static ref PENDING: Regex = Regex::new(r"(?i)pending").expect("pattern");
    static ref PENDING_REASON: Regex =
        Regex::new(r"(?i)no\s*blocks?|connecting\s*to\s*storage").expect("pattern");
    static ref STORAGE_ERROR: Regex = Regex::new(r"(?i)error\s*\(storage\)").expect("pattern");
    static ref OFFLINE: Regex = Regex::new(r"(?i)\boffline\b").expect("pattern");
    static ref RECORDING: Regex = Regex::new(r"(?i)^\s*recording\b").expect("pattern");
    static ref DISABLED: Regex = Regex::new(r"(?i)disabled").expect("pattern");
}

/// The rows of every table in a page, with the first row's header cells normalized for lookup.
struct HeaderTable<'a> {
    headers: Vec<String>,
    rows: Vec<Vec<ElementRef<'a>>>,
}

impl<'a> HeaderTable<'a> {
    fn parse(dom: &'a Html) -> Self {
        let mut rows = dom.select(&TABLE_ROW);
        let headers = rows
            .next()
            .map(|first| first.select(&HEADER_CELL).map(|th| header_key(&element_text(th))).collect())
            .unwrap_or_default();
        let rows = rows
            .map(|row| row.select(&DATA_CELL).collect::<Vec<_>>())
            .filter(|cells| !cells.is_empty())
            .collect();
        Self { headers, rows }
    }

    fn column(&self, like: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.contains(like))
    }

    fn column_where(&self, predicate: impl Fn(&str) -> bool) -> Option<usize> {
        self.headers.iter().position(|h| predicate(h))
    }
}

fn cell_text(cells: &[ElementRef<'_>], column: Option<usize>) -> String {
    column
        .and_then(|i| cells.get(i))
        .map(|cell| element_text(*cell).trim().to_string())
        .unwrap_or_default()
}

fn base_address(address: &str) -> String {
    address.split('\\').next().unwrap_or_default().trim().to_string()
}

fn parse_cameras(html: &str) -> Vec<CameraRecord> {
    let dom = Html::parse_document(html);
    let table = HeaderTable::parse(&dom);

    let name = table.column("camera name");
    let address = table.column("address");
    let state = table.column("recording state");
    let connection = table.column("connection time");
    let target = table.column("primary target");
    let block_class = table.column("current block class");
    let bitrate = table.column("max bitrate");

    table
        .rows
        .iter()
        .map(|cells| {
            let address = address
                .and_then(|i| cells.get(i))
                .map(|cell| {
                    let linked: String = cell.select(&LINK).map(element_text).collect();
                    let linked = linked.trim();
                    if linked.is_empty() {
                        element_text(*cell).trim().to_string()
                    } else {
                        linked.to_string()
                    }
                })
                .unwrap_or_default();
            let current_block_class = block_class
                .and_then(|i| cells.get(i))
                .map(|cell| {
                    let text = element_text(*cell);
                    let text = text.trim();
                    if text.is_empty() {
                        CLASS_ATTRIBUTE
                            .captures(&cell.inner_html())
                            .map(|c| c[1].to_string())
                            .unwrap_or_default()
                    } else {
                        text.to_string()
                    }
                })
                .unwrap_or_default();

            CameraRecord {
                camera_name: cell_text(cells, name),
                base_address: base_address(&address),
                address,
                fw_version: String::new(),
                recording_state: cell_text(cells, state),
                max_bitrate: cell_text(cells, bitrate),
                connection_time: cell_text(cells, connection),
                primary_target: cell_text(cells, target),
                current_block_class,
            }
        })
        .collect()
}

fn parse_devices(html: &str) -> Vec<DeviceRecord> {
    let dom = Html::parse_document(html);
    let table = HeaderTable::parse(&dom);

    let device = table.column("device");
    let firmware = table.column_where(|h| (h.contains("fw") || h.contains("firmware")) && h.contains("version"));
    let connection = table.column("connection time").or_else(|| table.column("remap time"));
    let bitrate = table.column("max bitrate");

    table
        .rows
        .iter()
        .map(|cells| DeviceRecord {
            base_address: base_address(&cell_text(cells, device)),
            fw_version: cell_text(cells, firmware),
            connection_time: cell_text(cells, connection),
            max_bitrate: cell_text(cells, bitrate),
        })
        .collect()
}

fn non_empty_or(preferred: &str, fallback: &str) -> String {
    if preferred.is_empty() { fallback } else { preferred }.to_string()
}

/// Issue buckets a recording state falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub bvms_issue: bool,
    pub offline: bool,
    pub recording: bool,
}

impl Classification {
    pub fn of(state: &str) -> Self {
        let bvms_issue = RECORDING_DISABLED.is_match(state)
            || (PENDING.is_match(state) && PENDING_REASON.is_match(state))
            || STORAGE_ERROR.is_match(state);
        Self {
            bvms_issue,
            offline: OFFLINE.is_match(state),
            recording: RECORDING.is_match(state) && !DISABLED.is_match(state),
        }
    }
}

fn target_key(camera: &CameraRecord) -> String {
    if camera.primary_target.is_empty() {
        UNKNOWN_TARGET.to_string()
    } else {
        camera.primary_target.clone()
    }
}

/// Parses both pages, attaches device data to each camera and counts issues per primary target.
pub fn correlate(cameras_html: &str, devices_html: &str) -> CameraReport {
    let cameras = parse_cameras(cameras_html);
    // A later row for the same address replaces an earlier one.
    let devices: HashMap<String, DeviceRecord> = parse_devices(devices_html)
        .into_iter()
        .map(|d| (d.base_address.clone(), d))
        .collect();
    debug!(cameras = cameras.len(), devices = devices.len(), "Correlating camera grid");

    let mut per_vrm_counters = BTreeMap::<String, IssueCounters>::new();
    let mut per_vrm_derived = BTreeMap::<String, TargetActivity>::new();
    let mut totals = OperationalTotals::default();

    let merged = cameras
        .into_iter()
        .map(|camera| {
            let key = target_key(&camera);
            let class = Classification::of(&camera.recording_state);

            let issues = per_vrm_counters.entry(key.clone()).or_default();
            issues.total += 1;
            issues.bvms_issues += u64::from(class.bvms_issue);
            issues.offline += u64::from(class.offline);

            let activity = per_vrm_derived.entry(key).or_default();
            activity.total += 1;
            activity.active += u64::from(class.recording);
            activity.offline += u64::from(class.offline);

            totals.total_channels += 1;
            totals.active_recordings += u64::from(class.recording);
            totals.offline_channels += u64::from(class.offline);

            match devices.get(&camera.base_address) {
                Some(device) => CameraRecord {
                    fw_version: device.fw_version.clone(),
                    max_bitrate: non_empty_or(&device.max_bitrate, &camera.max_bitrate),
                    connection_time: non_empty_or(&camera.connection_time, &device.connection_time),
                    ..camera
                },
                None => camera,
            }
        })
        .collect();

    CameraReport {
        merged,
        per_vrm_counters,
        derived_overview: DerivedOverview {
            totals,
            per_vrm_derived,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CAMERAS: &str = r#"<table>
        <tr><th>Camera name</th><th>Address</th><th>Recording state</th><th>Max. bitrate [kbit/s]</th>
            <th>Connection time</th><th>Primary target</th><th>Current block class</th></tr>
        <tr><td>Lobby</td><td><a href="/cam?1">172.25.0.30\1</a></td><td>Recording</td><td>4000</td>
            <td></td><td>172.25.0.100</td><td><span class="blk-a"></span></td></tr>
        <tr><td>Gate</td><td>172.25.0.31\1</td><td>Recording disabled</td><td>2000</td>
            <td>2024-01-01 10:00</td><td></td><td>B</td></tr>
        <tr><td>Dock</td><td>172.25.0.32\1</td><td>Pending (connecting to storage)</td><td></td>
            <td></td><td>172.25.0.100</td><td></td></tr>
    </table>"#;

    const DEVICES: &str = r#"<table>
        <tr><th>Device</th><th>FW version</th><th>Connection time</th><th>Max bitrate</th></tr>
        <tr><td>172.25.0.30\1</td><td>7.10</td><td>2024-01-02 08:00</td><td>6000</td></tr>
        <tr><td>172.25.0.31</td><td>6.30</td><td>2023-12-01 00:00</td><td></td></tr>
        <tr><td>172.25.0.30\2</td><td>7.60</td><td>2024-02-02 09:00</td><td></td></tr>
    </table>"#;

    #[test]
    fn merges_device_fields_by_base_address() {
        let report = correlate(CAMERAS, DEVICES);
        assert_eq!(report.merged.len(), 3);

        let lobby = &report.merged[0];
        assert_eq!(lobby.address, r"172.25.0.30\1");
        assert_eq!(lobby.base_address, "172.25.0.30");
        // The later device row for the same base address wins.
        assert_eq!(lobby.fw_version, "7.60");
        assert_eq!(lobby.max_bitrate, "4000");
        assert_eq!(lobby.connection_time, "2024-02-02 09:00");
        assert_eq!(lobby.current_block_class, "blk-a");

        let gate = &report.merged[1];
        assert_eq!(gate.fw_version, "6.30");
        assert_eq!(gate.max_bitrate, "2000");
        assert_eq!(gate.connection_time, "2024-01-01 10:00");

        let dock = &report.merged[2];
        assert_eq!(dock.fw_version, "");
    }

    #[test]
    fn counts_issues_per_primary_target() {
        let report = correlate(CAMERAS, DEVICES);
        assert_eq!(
            report.per_vrm_counters["172.25.0.100"],
            IssueCounters {
                bvms_issues: 1,
                offline: 0,
                total: 2,
            }
        );
        assert_eq!(
            report.per_vrm_counters[UNKNOWN_TARGET],
            IssueCounters {
                bvms_issues: 1,
                offline: 0,
                total: 1,
            }
        );
        assert_eq!(
            report.derived_overview.totals,
            OperationalTotals {
                total_channels: 3,
                active_recordings: 1,
                offline_channels: 0,
            }
        );
    }

    #[test]
    fn classification() {
        assert_eq!(
            Classification::of("Offline"),
            Classification {
                bvms_issue: false,
                offline: true,
                recording: false,
            }
        );
        assert!(Classification::of("ERROR (storage)").bvms_issue);
        assert!(Classification::of("Pending - no block").bvms_issue);
        assert!(!Classification::of("Pending").bvms_issue);
        assert!(!Classification::of("Recording disabled").recording);
        assert!(Classification::of("  recording (alarm)").recording);
        assert!(!Classification::of("Not recording").recording);
    }

    #[test]
    fn missing_columns_yield_empty_fields() {
        let html = r"<table><tr><th>Name</th></tr><tr><td>x</td></tr></table>";
        let report = correlate(html, "");
        assert_eq!(report.merged, vec![CameraRecord::default()]);
        assert_eq!(report.per_vrm_counters[UNKNOWN_TARGET].total, 1);
    }

    #[test]
    fn firmware_header_variants() {
        let devices = r"<table><tr><th>Device</th><th>Firmware Version</th></tr><tr><td>10.0.0.1</td><td>9.0</td></tr></table>";
        let cameras = r"<table><tr><th>Address</th></tr><tr><td>10.0.0.1\3</td></tr></table>";
        assert_eq!(correlate(cameras, devices).merged[0].fw_version, "9.0");
    }
}
