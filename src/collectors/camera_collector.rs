use crate::collectors::{
    format_count,
    Collector,
};
use color_eyre::Result;
use comfy_table::{
    presets,
    Attribute,
    Cell,
    Color,
    ContentArrangement,
    Table,
};
use std::collections::BTreeMap;
use vrm_report::{
    cameras::Classification,
    CameraRecord,
    IssueCounters,
    Snapshot,
};

/// Camera grid and issue counters per primary target.
#[derive(Default)]
pub struct CameraCollector {
    data: Option<(Vec<CameraRecord>, BTreeMap<String, IssueCounters>)>,
}

impl CameraCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn state_color(state: &str) -> Color {
        let class = Classification::of(state);
        if class.offline {
            Color::Red
        } else if class.bvms_issue {
            Color::Yellow
        } else if class.recording {
            Color::Green
        } else {
            Color::Reset
        }
    }
}

impl Collector for CameraCollector {
    fn collect(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.data = Some((snapshot.cameras.clone(), snapshot.per_vrm_counters.clone()));
        Ok(())
    }

    fn format(&self) -> String {
        let (cameras, counters) = match &self.data {
            Some((cameras, counters)) => (cameras, counters),
            None => return "No cameras collected yet. Call collect() first.".to_string(),
        };

        let mut output = String::new();

        let mut issues = Table::new();
        issues
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Target").add_attribute(Attribute::Bold).fg(Color::Cyan),
                Cell::new("Cameras").add_attribute(Attribute::Bold),
                Cell::new("BVMS issues").add_attribute(Attribute::Bold),
                Cell::new("Offline").add_attribute(Attribute::Bold),
            ]);
        for (target, c) in counters {
            issues.add_row(vec![
                Cell::new(target),
                Cell::new(format_count(c.total)),
                Cell::new(format_count(c.bvms_issues)).fg(if c.bvms_issues == 0 { Color::Green } else { Color::Yellow }),
                Cell::new(format_count(c.offline)).fg(if c.offline == 0 { Color::Green } else { Color::Red }),
            ]);
        }
        output.push_str(&format!("{issues}\n"));

        if cameras.is_empty() {
            output.push_str("No cameras reported.\n");
            return output;
        }

        let mut grid = Table::new();
        grid.load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Camera",
                "Address",
                "FW",
                "Recording state",
                "Max bitrate",
                "Connection time",
                "Primary target",
                "Block class",
            ]);
        for camera in cameras {
            grid.add_row(vec![
                Cell::new(&camera.camera_name),
                Cell::new(&camera.address),
                Cell::new(&camera.fw_version),
                Cell::new(&camera.recording_state).fg(Self::state_color(&camera.recording_state)),
                Cell::new(&camera.max_bitrate),
                Cell::new(&camera.connection_time),
                Cell::new(&camera.primary_target),
                Cell::new(&camera.current_block_class),
            ]);
        }
        output.push_str(&format!("{grid}\n"));

        output
    }

    fn summary(&self) -> serde_json::Value {
        match &self.data {
            Some((cameras, counters)) => serde_json::json!({
                "perVrmCounters": counters,
                "cameras": cameras,
            }),
            None => serde_json::json!({"error": "No cameras collected yet"}),
        }
    }

    fn name(&self) -> &'static str {
        "CameraCollector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lists_cameras_and_issue_counters() {
        let mut snapshot = Snapshot::default();
        snapshot.cameras.push(CameraRecord {
            camera_name: "Lobby".to_string(),
            recording_state: "Offline".to_string(),
            primary_target: "10.0.0.100".to_string(),
            ..Default::default()
        });
        snapshot.per_vrm_counters.insert(
            "10.0.0.100".to_string(),
            IssueCounters {
                bvms_issues: 0,
                offline: 1,
                total: 1,
            },
        );

        let mut collector = CameraCollector::new();
        collector.collect(&snapshot).unwrap();
        let text = collector.format();
        assert!(text.contains("Lobby"), "{text}");
        assert!(text.contains("10.0.0.100"), "{text}");

        let json = collector.summary();
        assert_eq!(json["cameras"][0]["cameraName"], "Lobby");
        assert_eq!(json["perVrmCounters"]["10.0.0.100"]["offline"], 1);
    }

    #[test]
    fn state_colors() {
        assert_eq!(CameraCollector::state_color("Offline"), Color::Red);
        assert_eq!(CameraCollector::state_color("Recording disabled"), Color::Yellow);
        assert_eq!(CameraCollector::state_color("Recording"), Color::Green);
    }
}
