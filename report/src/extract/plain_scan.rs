use super::{
    labels::{
        self,
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
        strip_tags,
        to_count,
    },
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LABEL_THEN_NUMBER: Vec<(Field, Regex)> = LABELS
        .iter()
        .map(|l| (l.field, labels::pattern(&format!(r"(?:{})\s*[:\-]?\s*([0-9][0-9.,]*)", l.pattern))))
        .collect();
}

/// `label: number` on the tag-stripped text. Last resort, always produces a result.
pub struct PlainTextScan;

impl Strategy for PlainTextScan {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::PlainFallback
    }

    fn extract(&self, document: &Document) -> Option<GlobalCounters> {
        let text = strip_tags(&document.html);
        let mut out = GlobalCounters::default();
        for (field, re) in LABEL_THEN_NUMBER.iter() {
            if let Some(captures) = re.captures(&text) {
                out.set(*field, to_count(&captures[1]));
            }
        }
        Some(out)
    }
}
