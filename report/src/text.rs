//! Text helpers shared by the parsers: folding, digit coercion, markup stripping.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::ElementRef;
use unicode_normalization::{
    char::is_combining_mark,
    UnicodeNormalization,
};

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]+>").expect("tag pattern");
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9][0-9.,]*").expect("digit run pattern");
}

/// Diacritic fold, lowercase and collapse whitespace: `"  Pérdida de  Señal "` becomes `"perdida de senal"`.
pub(crate) fn fold(s: &str) -> String {
    let stripped: String = s.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Folds like [`fold`] and additionally turns every non-alphanumeric character into a separator.
/// Used to match table headers such as `Max. bitrate [kbit/s]`.
pub(crate) fn header_key(s: &str) -> String {
    fold(s)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops every non-digit and parses what is left. Empty or overflowing input yields 0.
pub(crate) fn to_count(s: &str) -> u64 {
    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Coerces the first digit run in `s`, `None` when there is none.
pub(crate) fn first_count(s: &str) -> Option<u64> {
    DIGIT_RUN.find(s).map(|m| to_count(m.as_str()))
}

/// Capacity coercion: keeps digits, `.` and `-` and parses a float.
pub(crate) fn to_amount(s: &str) -> f64 {
    let kept: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    match kept.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Replaces every tag with a space.
pub(crate) fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, " ").into_owned()
}

/// All descendant text of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

pub(crate) fn floor_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

pub(crate) fn ceil_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index += 1;
    }
    index
}
