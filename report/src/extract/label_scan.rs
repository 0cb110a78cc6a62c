use super::{
    dom::{
        emphasized_count,
        following_value,
        next_cell,
        selector,
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
        GlobalCounters,
    },
    text::{
        element_text,
        fold,
    },
};
use lazy_static::lazy_static;
use scraper::Selector;

lazy_static! {
    static ref LABEL_MARKER: Selector = selector(".label, .leftLabel, .rightLabel");
}

/// Reads `label`/`value` element pairs anywhere in the DOM, falling back to every two-cell table row.
pub struct LabelScan;

impl LabelScan {
    fn from_label_markers(document: &Document, out: &mut GlobalCounters) {
        for label in document.dom.select(&LABEL_MARKER) {
            let Some(field) = labels::match_field(&fold(&element_text(label))) else {
                continue;
            };
            let Some(value) = following_value(label).or_else(|| next_cell(label)) else {
                continue;
            };
            let count = emphasized_count(value);
            if count != 0 {
                out.set(field, count);
            }
        }
    }

    fn from_table_rows(document: &Document, out: &mut GlobalCounters) {
        for row in document.dom.select(&TABLE).flat_map(|table| table.select(&ROW)) {
            let cells: Vec<_> = row.select(&CELL).collect();
            if cells.len() < 2 {
                continue;
            }
            let Some(field) = labels::match_field(&fold(&element_text(cells[0]))) else {
                continue;
            };
            let count = emphasized_count(cells[1]);
            if count != 0 {
                out.set(field, count);
            }
        }
    }
}

impl Strategy for LabelScan {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::Anywhere
    }

    fn extract(&self, document: &Document) -> Option<GlobalCounters> {
        let mut out = GlobalCounters::default();
        Self::from_label_markers(document, &mut out);
        if out.is_zero() {
            Self::from_table_rows(document, &mut out);
        }
        (!out.is_zero()).then_some(out)
    }
}
