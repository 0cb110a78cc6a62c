use crate::collectors::{
    format_count,
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
    OverviewFinal,
    Snapshot,
};

/// Channel counters: the aggregated totals and the per-unit breakdown.
#[derive(Default)]
pub struct OverviewCollector {
    overview: Option<OverviewFinal>,
}

impl OverviewCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Red for any non-zero problem counter.
    fn problem_color(value: u64) -> Color {
        if value == 0 {
            Color::Green
        } else {
            Color::Red
        }
    }
}

impl Collector for OverviewCollector {
    fn collect(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.overview = Some(snapshot.overview_final.clone());
        Ok(())
    }

    fn format(&self) -> String {
        let overview = match &self.overview {
            Some(o) => o,
            None => return "No overview collected yet. Call collect() first.".to_string(),
        };
        let totals = &overview.totals;

        let mut output = String::new();

        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("CHANNELS").add_attribute(Attribute::Bold).fg(Color::Cyan),
                Cell::new(""),
            ]);

        table.add_row(vec![
            Cell::new("Total channels").add_attribute(Attribute::Bold),
            Cell::new(format_count(totals.total_channels)).set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new("Active recordings").add_attribute(Attribute::Bold),
            Cell::new(format_count(totals.active_recordings)).set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new("Idle").add_attribute(Attribute::Bold),
            Cell::new(format_count(totals.idle)).set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new("Offline channels").add_attribute(Attribute::Bold),
            Cell::new(format_count(totals.offline_channels))
                .fg(Self::problem_color(totals.offline_channels))
                .set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new("Signal loss").add_attribute(Attribute::Bold),
            Cell::new(format_count(totals.signal_loss))
                .fg(Self::problem_color(totals.signal_loss))
                .set_alignment(CellAlignment::Right),
        ]);

        output.push_str(&format!("{table}\n"));

        if !overview.per_vrm.is_empty() {
            let mut units = Table::new();
            units
                .load_preset(presets::UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Unit", "Total", "Active", "Idle", "Offline", "Signal loss"]);
            for (unit, counters) in &overview.per_vrm {
                units.add_row(vec![
                    Cell::new(unit),
                    Cell::new(format_count(counters.total_channels)),
                    Cell::new(format_count(counters.active_recordings)),
                    Cell::new(format_count(counters.idle)),
                    Cell::new(format_count(counters.offline_channels)).fg(Self::problem_color(counters.offline_channels)),
                    Cell::new(format_count(counters.signal_loss)).fg(Self::problem_color(counters.signal_loss)),
                ]);
            }
            output.push_str(&format!("{units}\n"));
        }

        output
    }

    fn summary(&self) -> serde_json::Value {
        match &self.overview {
            Some(overview) => serde_json::json!({ "overviewFinal": overview }),
            None => serde_json::json!({"error": "No overview collected yet"}),
        }
    }

    fn name(&self) -> &'static str {
        "OverviewCollector"
    }
}
