use pretty_assertions::assert_eq;
use temp_dir::TempDir;
use vrm_dashboard::{
    collectors::Orchestrator,
    source::{
        DirectorySource,
        CAMERAS_FILE,
        DEVICES_FILE,
        INDEX_FILE,
        TARGETS_FILE,
    },
};
use vrm_dashboard_config::EndpointConfig;
use vrm_report::MergePolicy;

const INDEX: &str = "MIME-Version: 1.0\r\n\
    Content-Type: multipart/related; boundary=\"XYZ\"\r\n\r\n\
    --XYZ\r\nContent-Type: text/html\r\n\r\n\
    <table><tr><td>Total channels</td><td>10</td></tr>\
    <tr><td>Active recordings</td><td>9</td></tr></table>\r\n\
    --XYZ--\r\n";

const CAMERAS: &str = r"<table>
    <tr><th>Camera name</th><th>Address</th><th>Recording state</th><th>Primary target</th></tr>
    <tr><td>Gate</td><td>10.1.0.5\1</td><td>Recording</td><td>10.1.0.100</td></tr>
    <tr><td>Dock</td><td>10.1.0.6\1</td><td>Offline</td><td>10.1.0.100</td></tr>
</table>";

const DEVICES: &str = r"<table>
    <tr><th>Device</th><th>FW version</th></tr>
    <tr><td>10.1.0.5</td><td>7.10</td></tr>
</table>";

const TARGETS: &str = "<h1>Targets</h1><table><tr><td>Total number of targets</td><td>2</td></tr></table>";

fn endpoint(vrm: &str, ip: &str) -> EndpointConfig {
    EndpointConfig {
        bvms: "Site A".to_string(),
        vrm: vrm.to_string(),
        ip: ip.to_string(),
    }
}

#[tokio::test]
async fn scans_the_data_directory() {
    let data = TempDir::new().unwrap();
    let complete = endpoint("VRM 1", "10.1.0.1");
    let storage_only = endpoint("", "10.2.0.1");
    let missing = endpoint("VRM 3", "10.3.0.1");

    let dir = complete.document_dir(data.path());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(INDEX_FILE), INDEX).unwrap();
    std::fs::write(dir.join(CAMERAS_FILE), CAMERAS).unwrap();
    std::fs::write(dir.join(DEVICES_FILE), DEVICES).unwrap();
    std::fs::write(dir.join(TARGETS_FILE), TARGETS).unwrap();

    let dir = storage_only.document_dir(data.path());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(TARGETS_FILE), TARGETS).unwrap();

    let source = DirectorySource::new(data.path(), vec![complete, storage_only, missing], false);
    let mut orchestrator = Orchestrator::new(Box::new(source), MergePolicy::Overwrite);
    orchestrator.collect().await.unwrap();

    let snapshot = orchestrator.snapshot().unwrap();
    assert_eq!(snapshot.endpoints, 2);
    assert_eq!(snapshot.overview_final.totals.total_channels, 10);
    // One of the two cameras is recording, which replaces the cockpit's 9.
    assert_eq!(snapshot.overview_final.totals.active_recordings, 1);
    assert_eq!(snapshot.cameras.len(), 2);
    assert_eq!(snapshot.cameras[0].fw_version, "7.10");
    assert_eq!(snapshot.per_vrm_counters["10.1.0.100"].offline, 1);
    assert_eq!(snapshot.targets.targets_summary["Total number of targets"], 4.0);

    let units: Vec<_> = snapshot.targets.per_vrm.keys().cloned().collect();
    assert_eq!(units, ["Site A/10.2.0.1", "Site A/VRM 1"]);

    assert_eq!(orchestrator.omitted().len(), 1);
    assert_eq!(orchestrator.omitted()[0].endpoint, "Site A/VRM 3");
    assert!(orchestrator.omitted()[0].error.contains("no documents found"));
}

#[tokio::test]
async fn dumps_decoded_archives_on_request() {
    let data = TempDir::new().unwrap();
    let unit = endpoint("VRM 1", "10.1.0.1");
    let dir = unit.document_dir(data.path());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(INDEX_FILE), INDEX).unwrap();

    let source = DirectorySource::new(data.path(), vec![unit], true);
    let mut orchestrator = Orchestrator::new(Box::new(source), MergePolicy::Sum);
    orchestrator.collect().await.unwrap();

    let decoded = std::fs::read_to_string(dir.join("index.decoded.html")).unwrap();
    assert!(decoded.contains("Total channels"), "{decoded}");
}
