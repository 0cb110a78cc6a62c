use super::{
    labels::{
        self,
        DEVICES_HEADING,
        LABELS,
    },
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
        ceil_boundary,
        floor_boundary,
        strip_tags,
        to_count,
    },
};
use lazy_static::lazy_static;
use regex::Regex;

const BEFORE_HEADING: usize = 4_000;
const AFTER_HEADING: usize = 20_000;

/// Three patterns per field, from most to least precise.
struct Probe {
    field: Field,
    /// `<span class="value">…<strong>N` after the label.
    value_span: Regex,
    /// `>N<` after the label, i.e. the first text node that is a number.
    bare_value: Regex,
    /// Any digit run shortly after the label, on tag-stripped text.
    nearby: Regex,
}

impl Probe {
    fn read(&self, section: &str, stripped: &str) -> u64 {
        [(&self.value_span, section), (&self.bare_value, section), (&self.nearby, stripped)]
            .into_iter()
            .find_map(|(re, haystack)| re.captures(haystack).map(|c| to_count(&c[1])))
            .unwrap_or(0)
    }
}

lazy_static! {
    static ref PROBES: Vec<Probe> = LABELS
        .iter()
        .map(|l| Probe {
            field: l.field,
            value_span: labels::pattern(&format!(
                r#"(?s)(?:{})(?:.){{0,1000}}?<span[^>]*class=["'][^"']*\bvalue\b[^"']*["'][^>]*>(?:.){{0,200}}?<strong[^>]*>([0-9.,]+)"#,
                l.pattern
            )),
            bare_value: labels::pattern(&format!(r"(?s)(?:{})(?:.){{0,400}}?>\s*([0-9.,]+)\s*<", l.pattern)),
            nearby: labels::pattern(&format!(r"(?s)(?:{})(?:.){{0,200}}?([0-9][0-9.,]*)", l.pattern)),
        })
        .collect();
}

/// Pattern matching in a window of markup around the first devices heading.
pub struct WindowScan;

impl Strategy for WindowScan {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::DevicesSection
    }

    fn extract(&self, document: &Document) -> Option<GlobalCounters> {
        let html = document.html.as_str();
        let anchor = DEVICES_HEADING.find(html)?.start();
        let start = floor_boundary(html, anchor.saturating_sub(BEFORE_HEADING));
        let end = ceil_boundary(html, anchor + AFTER_HEADING);
        let section = &html[start..end];
        let stripped = strip_tags(section);

        let mut out = GlobalCounters::default();
        for probe in PROBES.iter() {
            out.set(probe.field, probe.read(section, &stripped));
        }
        (!out.is_zero()).then_some(out)
    }
}
