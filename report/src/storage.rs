//! `showTargets` parsing: the three summary tables and the per-target capacity rows.

use crate::{
    metrics::{
        LabelMap,
        StorageSummary,
        TargetDetail,
    },
    text::{
        element_text,
        to_amount,
    },
};
use lazy_static::lazy_static;
use scraper::{
    ElementRef,
    Html,
    Selector,
};

/// Detail rows shorter than this are layout rows, not targets.
const DETAIL_COLUMNS: usize = 13;

lazy_static! {
    static ref HEADING: Selector = Selector::parse("h1, h2, h3, h4, h5, h6").expect("heading selector");
    static ref TABLE: Selector = Selector::parse("table").expect("table selector");
    static ref ROW: Selector = Selector::parse("tr").expect("row selector");
    static ref DATA_CELL: Selector = Selector::parse("td").expect("cell selector");
}

/// Summary tables and the heading text that introduces each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Targets,
    Luns,
    Blocks,
}

impl Section {
    const ALL: [Section; 3] = [Section::Targets, Section::Luns, Section::Blocks];

    fn heading(self) -> &'static str {
        match self {
            Section::Targets => "Targets",
            Section::Luns => "LUNs",
            Section::Blocks => "Blocks",
        }
    }
}

fn cells<'a>(row: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    row.select(&DATA_CELL).collect()
}

/// Signed: a cell reading `-12 GB` yields `-12.0`, it is not clamped.
fn cell_amount(cells: &[ElementRef<'_>], index: usize) -> f64 {
    cells.get(index).map_or(0.0, |cell| to_amount(&element_text(*cell)))
}

/// The table right after the first heading mentioning `section`, read as label/value rows.
fn summary_table(dom: &Html, section: Section) -> LabelMap {
    let mut summary = LabelMap::new();
    let Some(table) = dom
        .select(&HEADING)
        .filter(|heading| element_text(*heading).contains(section.heading()))
        .find_map(|heading| {
            heading
                .next_siblings()
                .find_map(ElementRef::wrap)
                .filter(|sibling| sibling.value().name() == "table")
        })
    else {
        return summary;
    };

    for row in table.select(&ROW) {
        let cells = cells(row);
        if cells.len() < 2 {
            continue;
        }
        summary.insert(element_text(cells[0]).trim().to_string(), cell_amount(&cells, 1));
    }
    summary
}

/// Positional rows of the document's first table; its first row is the header.
fn detail_rows(dom: &Html) -> Vec<TargetDetail> {
    let Some(table) = dom.select(&TABLE).next() else {
        return Vec::new();
    };
    table
        .select(&ROW)
        .skip(1)
        .map(cells)
        .filter(|cells| cells.len() >= DETAIL_COLUMNS)
        .map(|cells| TargetDetail {
            target: element_text(cells[0]).trim().to_string(),
            bitrate: cell_amount(&cells, 5),
            total: cell_amount(&cells, 6),
            available: cell_amount(&cells, 7),
            empty: cell_amount(&cells, 8),
            protected: cell_amount(&cells, 9),
        })
        .collect()
}

pub fn parse_targets(html: &str) -> StorageSummary {
    let dom = Html::parse_document(html);
    let [targets_summary, luns_summary, blocks_summary] = Section::ALL.map(|section| summary_table(&dom, section));
    let details = detail_rows(&dom);
    debug!(targets = targets_summary.len(), details = details.len(), "Parsed storage page");

    StorageSummary {
        targets_summary,
        luns_summary,
        blocks_summary,
        details,
        ..Default::default()
    }
}
