use pretty_assertions::assert_eq;
use vrm_report::{
    correlate,
    parse_index,
    parse_targets,
    EndpointReport,
    ExtractionSource,
    IssueCounters,
    LabelMap,
    MergePolicy,
    Snapshot,
};

#[test]
fn camera_grid_without_devices() {
    let cameras = r"<table>
        <tr><th>Camera name</th><th>Address</th><th>Recording state</th></tr>
        <tr><td>Cam1</td><td>10.0.0.5\1</td><td>Recording</td></tr>
        <tr><td>Cam2</td><td>10.0.0.6\1</td><td>Offline</td></tr>
    </table>";
    let devices = r"<table><tr><th>Device</th><th>FW version</th></tr></table>";

    let report = correlate(cameras, devices);
    let bases: Vec<_> = report.merged.iter().map(|c| c.base_address.as_str()).collect();
    assert_eq!(bases, ["10.0.0.5", "10.0.0.6"]);
    assert!(report.merged.iter().all(|c| c.fw_version.is_empty()));
    assert_eq!(
        report.per_vrm_counters["unknown"],
        IssueCounters {
            bvms_issues: 0,
            offline: 1,
            total: 2,
        }
    );
}

#[test]
fn targets_summary_keeps_labels_verbatim() {
    let html = "<h1>Targets</h1><table>\
        <tr><td>Total number of targets</td><td>10</td></tr>\
        <tr><td>Offline Targets</td><td>2</td></tr></table>";
    assert_eq!(
        parse_targets(html).targets_summary,
        LabelMap::from([("Total number of targets".to_string(), 10.0), ("Offline Targets".to_string(), 2.0)])
    );
}

#[test]
fn two_endpoints_sum_their_totals() {
    let mut first = EndpointReport::default();
    first.overview_final.totals.total_channels = 5;
    let mut second = EndpointReport::default();
    second.overview_final.totals.total_channels = 7;

    let snapshot = Snapshot::from_reports(MergePolicy::default(), [first, second]);
    assert_eq!(snapshot.overview_final.totals.total_channels, 12);
}

#[test]
fn base64_archive_goes_through_the_table_scan() {
    // <table><tr><td>Total channels</td><td>42</td></tr><tr><td>Idle</td><td>3</td></tr>
    // <tr><td>Signal loss</td><td>1</td></tr></table>
    let body = "PHRhYmxlPjx0cj48dGQ+VG90YWwgY2hhbm5lbHM8L3RkPjx0ZD40MjwvdGQ+PC90cj48dHI+PHRkPklkbGU8L3Rk\r\n\
                Pjx0ZD4zPC90ZD48L3RyPjx0cj48dGQ+U2lnbmFsIGxvc3M8L3RkPjx0ZD4xPC90ZD48L3RyPjwvdGFibGU+";
    let archive = format!(
        "MIME-Version: 1.0\r\nContent-Type: multipart/related;\r\n\ttype=\"text/html\";\r\n\tboundary=\"XYZ\"\r\n\r\n\
         --XYZ\r\nContent-Type: text/html\r\nContent-Transfer-Encoding: base64\r\n\r\n{body}\r\n--XYZ--\r\n"
    );

    let report = parse_index(archive.as_bytes());
    assert_eq!(report.source, ExtractionSource::DevicesTable);
    assert_eq!(report.totals.total_channels, 42);
    assert_eq!(report.totals.idle, 3);
    assert_eq!(report.totals.signal_loss, 1);
}
