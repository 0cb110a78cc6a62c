//! DOM navigation the strategies share.

use crate::text::{
    element_text,
    first_count,
    to_count,
};
use lazy_static::lazy_static;
use scraper::{
    ElementRef,
    Selector,
};

lazy_static! {
    pub(crate) static ref TABLE: Selector = selector("table");
    pub(crate) static ref ROW: Selector = selector("tr");
    pub(crate) static ref CELL: Selector = selector("td, th");
    static ref EMPHASIS: Selector = selector("strong, b");
    static ref VALUE: Selector = selector(".value");
}

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid selector {css:?}: {err}"))
}

pub(crate) fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

fn is_cell(element: ElementRef<'_>) -> bool {
    matches!(element.value().name(), "td" | "th")
}

/// The element itself or its nearest ancestor with one of the given tag names.
pub(crate) fn closest<'a>(element: ElementRef<'a>, names: &[&str]) -> Option<ElementRef<'a>> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|e| names.contains(&e.value().name()))
}

/// The first following sibling element.
pub(crate) fn next_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// The first following sibling classed `value`.
pub(crate) fn following_value(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| has_class(*sibling, "value"))
}

/// The cell right of the one containing `element`, within the same row.
pub(crate) fn next_cell(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let cell = closest(element, &["td", "th"])?;
    let row = closest(cell, &["tr"])?;
    let cells: Vec<ElementRef<'_>> = row.children().filter_map(ElementRef::wrap).filter(|c| is_cell(*c)).collect();
    let index = cells.iter().position(|c| *c == cell)?;
    cells.get(index + 1).copied()
}

/// The first `.value` element anywhere below `element`'s parent.
pub(crate) fn value_near(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let parent = element.parent().and_then(ElementRef::wrap)?;
    parent.select(&VALUE).next()
}

/// Digits of the first bold descendant, or of the whole element when that yields nothing.
pub(crate) fn emphasized_count(element: ElementRef<'_>) -> u64 {
    let emphasized = element
        .select(&EMPHASIS)
        .next()
        .map(|e| to_count(&element_text(e)))
        .unwrap_or(0);
    if emphasized != 0 {
        emphasized
    } else {
        to_count(&element_text(element))
    }
}

/// Like [`emphasized_count`] but distinguishes "no digits at all" from zero.
pub(crate) fn emphasized_first_count(element: ElementRef<'_>) -> Option<u64> {
    element
        .select(&EMPHASIS)
        .next()
        .and_then(|e| first_count(&element_text(e)))
        .or_else(|| first_count(&element_text(element)))
}

/// Text of the element's own text nodes, children excluded.
pub(crate) fn own_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for child in element.children() {
        if let Some(t) = child.value().as_text() {
            text.push_str(t);
        }
    }
    text
}
