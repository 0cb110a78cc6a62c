use super::{
    dom::{
        CELL,
        ROW,
        TABLE,
    },
    labels,
    Document,
    Strategy,
};
use crate::{
    metrics::{
        ExtractionSource,
        Field,
        GlobalCounters,
    },
    text::{
        element_text,
        fold,
        to_count,
    },
};
use std::collections::BTreeSet;

/// Minimum number of distinct fields a table has to show to count as the devices table.
const MIN_FIELDS: usize = 3;

/// Picks the table whose row labels cover the most counter fields and reads each value from the row's last cell.
pub struct TableScan;

impl Strategy for TableScan {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::DevicesTable
    }

    fn extract(&self, document: &Document) -> Option<GlobalCounters> {
        let mut best: Option<(usize, GlobalCounters)> = None;

        for table in document.dom.select(&TABLE) {
            let mut values = GlobalCounters::default();
            let mut recognized = BTreeSet::<Field>::new();

            for row in table.select(&ROW) {
                let cells: Vec<_> = row.select(&CELL).collect();
                let (Some(first), Some(last)) = (cells.first(), cells.last()) else {
                    continue;
                };
                if cells.len() < 2 {
                    continue;
                }
                let Some(field) = labels::lookup(&fold(&element_text(*first))) else {
                    continue;
                };
                values.set(field, to_count(&element_text(*last)));
                recognized.insert(field);
            }

            let score = recognized.len();
            if score > best.as_ref().map_or(0, |(best_score, _)| *best_score) {
                best = Some((score, values));
            }
        }

        best.filter(|(score, _)| *score >= MIN_FIELDS).map(|(_, values)| values)
    }
}
