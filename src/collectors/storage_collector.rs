use crate::collectors::{
    format_amount,
    Collector,
};
use color_eyre::Result;
use comfy_table::{
    presets,
    Attribute,
    Cell,
    CellAlignment,
    Color,
    ContentArrangement,
    Table,
};
use vrm_report::{
    LabelMap,
    Snapshot,
    StorageSummary,
};

/// Storage summaries (targets, LUNs, blocks) and per-target capacities.
#[derive(Default)]
pub struct StorageCollector {
    storage: Option<StorageSummary>,
}

impl StorageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn label_table(title: &str, labels: &LabelMap) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new(title).add_attribute(Attribute::Bold).fg(Color::Cyan),
                Cell::new(""),
            ]);
        for (label, value) in labels {
            table.add_row(vec![
                Cell::new(label).add_attribute(Attribute::Bold),
                Cell::new(format_amount(*value)).set_alignment(CellAlignment::Right),
            ]);
        }
        table
    }

    /// Share of the capacity still available, colored by how little is left.
    fn available_cell(available: f64, total: f64) -> Cell {
        if total <= 0.0 {
            return Cell::new(format_amount(available));
        }
        let percent = available / total * 100.0;
        let color = if percent >= 20.0 {
            Color::Green
        } else if percent >= 5.0 {
            Color::Yellow
        } else {
            Color::Red
        };
        Cell::new(format!("{} ({percent:.1}%)", format_amount(available))).fg(color)
    }
}

impl Collector for StorageCollector {
    fn collect(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.storage = Some(snapshot.targets.clone());
        Ok(())
    }

    fn format(&self) -> String {
        let storage = match &self.storage {
            Some(s) => s,
            None => return "No storage collected yet. Call collect() first.".to_string(),
        };

        let mut output = String::new();

        for (title, labels) in [
            ("TARGETS", &storage.targets_summary),
            ("LUNS", &storage.luns_summary),
            ("BLOCKS", &storage.blocks_summary),
        ] {
            if !labels.is_empty() {
                output.push_str(&format!("{}\n", Self::label_table(title, labels)));
            }
        }

        if !storage.details.is_empty() {
            let mut details = Table::new();
            details
                .load_preset(presets::UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Target", "Bitrate", "Total", "Available", "Empty", "Protected"]);
            for detail in &storage.details {
                details.add_row(vec![
                    Cell::new(&detail.target),
                    Cell::new(format_amount(detail.bitrate)),
                    Cell::new(format_amount(detail.total)),
                    Self::available_cell(detail.available, detail.total),
                    Cell::new(format_amount(detail.empty)),
                    Cell::new(format_amount(detail.protected)),
                ]);
            }
            output.push_str(&format!("{details}\n"));
        }

        if !storage.per_vrm.is_empty() {
            let mut units = Table::new();
            units
                .load_preset(presets::UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Unit", "IP", "Targets", "Total capacity", "Available"]);
            for (label, unit) in &storage.per_vrm {
                let total: f64 = unit.details.iter().map(|d| d.total).sum();
                let available: f64 = unit.details.iter().map(|d| d.available).sum();
                units.add_row(vec![
                    Cell::new(label),
                    Cell::new(&unit.meta.ip),
                    Cell::new(unit.details.len()),
                    Cell::new(format_amount(total)),
                    Self::available_cell(available, total),
                ]);
            }
            output.push_str(&format!("{units}\n"));
        }

        if output.is_empty() {
            output.push_str("No storage reported.\n");
        }
        output
    }

    fn summary(&self) -> serde_json::Value {
        match &self.storage {
            Some(storage) => serde_json::json!({ "targets": storage }),
            None => serde_json::json!({"error": "No storage collected yet"}),
        }
    }

    fn name(&self) -> &'static str {
        "StorageCollector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vrm_report::TargetDetail;

    #[test]
    fn renders_summaries_and_details() {
        let mut snapshot = Snapshot::default();
        snapshot.targets.targets_summary.insert("Total number of targets".to_string(), 10.0);
        snapshot.targets.details.push(TargetDetail {
            target: "iqn.2004-01.example:disk1".to_string(),
            total: 1000.0,
            available: 10.0,
            ..Default::default()
        });

        let mut collector = StorageCollector::new();
        collector.collect(&snapshot).unwrap();
        let text = collector.format();
        assert!(text.contains("Total number of targets"), "{text}");
        assert!(text.contains("10 (1.0%)"), "{text}");

        let json = collector.summary();
        assert_eq!(json["targets"]["targetsSummary"]["Total number of targets"], 10.0);
        assert_eq!(json["targets"]["details"][0]["available"], 10.0);
    }

    #[test]
    fn nothing_to_show() {
        let mut collector = StorageCollector::new();
        collector.collect(&Snapshot::default()).unwrap();
        assert_eq!(collector.format(), "No storage reported.\n");
    }
}
