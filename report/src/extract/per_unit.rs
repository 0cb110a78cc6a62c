//! Per-unit counters.
//!
//! A cockpit that manages several units may list counters under each unit's address (`172.25.0.24\1`). Two heuristics
//! are tried, the first that finds anything wins: windows after every address in the markup, then a walk over the text
//! elements that tracks the most recent address heading. Units without a single non-zero counter are dropped.

use super::{
    dom::{
        emphasized_first_count,
        next_cell,
        next_element,
        own_text,
        selector,
        value_near,
    },
    labels::{
        self,
        LABELS,
    },
    Document,
};
use crate::{
    metrics::{
        Field,
        GlobalCounters,
        PerUnitCounters,
    },
    text::{
        ceil_boundary,
        element_text,
        first_count,
        to_count,
    },
};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{
    ElementRef,
    Selector,
};

/// How far after an address the labels are searched for.
const UNIT_SCOPE: usize = 20_000;
/// How far after a label its value is searched for.
const VALUE_SCOPE: usize = 4_000;

lazy_static! {
    static ref UNIT_ADDRESS: Regex =
        Regex::new(r"\b([0-9]{1,3}(?:\.[0-9]{1,3}){3})\\([0-9]+)\b").expect("unit address pattern");
    static ref UNIT_HEADING: Regex =
        labels::pattern(r"^(?:VRM\s+)?([0-9]{1,3}(?:\.[0-9]{1,3}){3}\\[0-9])\b");
    static ref FIELD_LABELS: Vec<(Field, Regex)> =
        LABELS.iter().map(|l| (l.field, labels::pattern(l.pattern))).collect();
    static ref STRONG_VALUE: Regex = labels::pattern(r"<strong[^>]*>([0-9][0-9.,]*)");
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9][0-9.,]*").expect("digit run pattern");
    static ref TEXT_ELEMENTS: Selector = selector("h1, h2, h3, h4, h5, th, td, span, div, p, li");
}

pub fn extract(document: &Document) -> PerUnitCounters {
    let by_address = by_address_windows(&document.html);
    if !by_address.is_empty() {
        return by_address;
    }
    by_heading_walk(document)
}

fn retain_non_zero(mut units: PerUnitCounters) -> PerUnitCounters {
    units.retain(|_, counters| !counters.is_zero());
    units
}

/// For every `ip\group` occurrence, looks for each label in the markup that follows it.
fn by_address_windows(html: &str) -> PerUnitCounters {
    let mut units = PerUnitCounters::new();
    for captures in UNIT_ADDRESS.captures_iter(html) {
        let Some(found) = captures.get(0) else {
            continue;
        };
        let key = format!("{}\\{}", &captures[1], &captures[2]);
        let scope = &html[found.start()..ceil_boundary(html, found.start() + UNIT_SCOPE)];

        let mut counters = GlobalCounters::default();
        for (field, label) in FIELD_LABELS.iter() {
            counters.set(*field, value_after_label(scope, label));
        }
        units.insert(key, counters);
    }
    retain_non_zero(units)
}

fn value_after_label(scope: &str, label: &Regex) -> u64 {
    let Some(found) = label.find(scope) else {
        return 0;
    };
    let window = &scope[found.start()..ceil_boundary(scope, found.start() + VALUE_SCOPE)];
    STRONG_VALUE
        .captures(window)
        .map(|c| to_count(&c[1]))
        .or_else(|| DIGIT_RUN.find(window).map(|m| to_count(m.as_str())))
        .unwrap_or(0)
}

/// Walks text elements in document order; an element starting with a unit address opens that unit, labels seen
/// afterwards are attributed to it.
fn by_heading_walk(document: &Document) -> PerUnitCounters {
    let mut units = PerUnitCounters::new();
    let mut current: Option<String> = None;

    for element in document.dom.select(&TEXT_ELEMENTS) {
        let text = element_text(element);
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if let Some(captures) = UNIT_HEADING.captures(text) {
            let key = captures[1].to_string();
            units.entry(key.clone()).or_default();
            current = Some(key);
            continue;
        }
        let Some(unit) = current.as_ref() else {
            continue;
        };
        let Some(field) = FIELD_LABELS.iter().find(|(_, re)| re.is_match(text)).map(|(f, _)| *f) else {
            continue;
        };
        if let Some(value) = value_beside(element) {
            units.entry(unit.clone()).or_default().set(field, value);
        }
    }
    retain_non_zero(units)
}

/// The number shown next to a label element, in order of preference: next sibling, next cell of the row, a `.value`
/// under the same parent, the element's own text, its first child that holds a digit.
fn value_beside(element: ElementRef<'_>) -> Option<u64> {
    next_element(element)
        .and_then(emphasized_first_count)
        .or_else(|| next_cell(element).and_then(|cell| first_count(&element_text(cell))))
        .or_else(|| value_near(element).and_then(emphasized_first_count))
        .or_else(|| first_count(&own_text(element)))
        .or_else(|| {
            element
                .children()
                .filter_map(ElementRef::wrap)
                .find(|child| element_text(*child).chars().any(|c| c.is_ascii_digit()))
                .and_then(|child| first_count(&element_text(child)))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn address_windows() {
        let html = r#"
            <h3>172.25.0.24\1</h3>
            <div>Total channels <strong>16</strong></div><div>Offline channels 2</div>
            <h3>172.25.0.25\1</h3>
            <div>Total channels <strong>8</strong></div>"#;
        let units = extract(&Document::parse(html));
        assert_eq!(units.len(), 2);
        assert_eq!(units[r"172.25.0.24\1"].total_channels, 16);
        // The window after a label reaches into the next unit; a bold number there beats the plain one nearby.
        assert_eq!(units[r"172.25.0.24\1"].offline_channels, 8);
        assert_eq!(units[r"172.25.0.25\1"].total_channels, 8);
    }

    #[test]
    fn units_without_counters_are_dropped() {
        let units = extract(&Document::parse(r"<p>Camera 10.0.0.5\1 is offline</p>"));
        assert!(units.is_empty());
    }

    #[test]
    fn heading_walk_attributes_labels_to_the_current_unit() {
        let html = r#"
            <ul>
              <li>VRM 10.1.1.1\1</li>
              <li><span>Total channels</span><span><b>12</b></span></li>
              <li><span>Idle</span><span>x</span></li>
            </ul>"#;
        let document = Document::parse(html);
        let units = by_heading_walk(&document);
        assert_eq!(units.len(), 1);
        assert_eq!(units[r"10.1.1.1\1"].total_channels, 12);
        assert_eq!(units[r"10.1.1.1\1"].idle, 0);
    }

    #[test]
    fn value_preference_order() {
        let html = r#"<table><tr><td><span>Signal loss</span></td><td>3</td></tr></table>"#;
        let document = Document::parse(html);
        let span = document.dom.select(&selector("span")).next().unwrap();
        assert_eq!(value_beside(span), Some(3));

        let html = r#"<div><p>Idle 4 <i>5</i></p></div>"#;
        let document = Document::parse(html);
        let p = document.dom.select(&selector("p")).next().unwrap();
        assert_eq!(value_beside(p), Some(4));
    }
}
