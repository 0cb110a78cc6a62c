//! The multilingual label dictionary.
//!
//! Adding a locale means adding phrases and alternatives here, none of the strategies need to change.

use crate::metrics::Field;
use lazy_static::lazy_static;
use regex::{
    Regex,
    RegexBuilder,
};

pub(crate) struct FieldLabels {
    pub(crate) field: Field,
    /// Folded phrases (lowercase, no diacritics) the table scan looks for inside a row label.
    pub(crate) phrases: &'static [&'static str],
    /// Case-insensitive pattern that matches the label in raw markup as well as in folded text.
    pub(crate) pattern: &'static str,
}

pub(crate) const LABELS: &[FieldLabels] = &[
    FieldLabels {
        field: Field::TotalChannels,
        phrases: &["total channels", "total de canales", "canales totales", "canais totais"],
        pattern: r"total\s*channels|total\s*de\s*canales|canales\s*totales|canais\s*totais",
    },
    FieldLabels {
        field: Field::OfflineChannels,
        phrases: &["offline channels", "canales offline", "canales fuera de linea", "canais offline"],
        pattern: r"offline\s*channels|canales\s*offline|canales\s*fuera\s*de\s*l[ií]nea|canais\s*offline",
    },
    FieldLabels {
        field: Field::ActiveRecordings,
        phrases: &["active recordings", "grabaciones activas", "gravacoes ativas"],
        pattern: r"active\s*recordings|grabaciones\s*activas|grava(?:ções|coes)\s*ativas",
    },
    FieldLabels {
        field: Field::Idle,
        phrases: &["idle", "inactivo", "inactivos"],
        pattern: r"\b(?:idle|inactivos?)\b",
    },
    FieldLabels {
        field: Field::SignalLoss,
        phrases: &["signal loss", "perdida de senal", "perda de sinal"],
        pattern: r"signal\s*loss|p[eé]rdida\s*de\s*se[nñ]al|perda\s*de\s*sinal",
    },
];

lazy_static! {
    static ref FIELD_PATTERNS: Vec<(Field, Regex)> = LABELS
        .iter()
        .map(|labels| (labels.field, pattern(labels.pattern)))
        .collect();
    /// The heading of the devices panel in the cockpit.
    pub(crate) static ref DEVICES_HEADING: Regex = pattern(r"(?:>|\b)(?:devices|dispositivos)\b");
}

/// Compiles a case-insensitive pattern. The window probes use long bounded repetitions, hence the raised size limit.
pub(crate) fn pattern(source: &str) -> Regex {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .size_limit(64 * (1 << 20))
        .build()
        .unwrap_or_else(|err| panic!("invalid label pattern {source:?}: {err}"))
}

/// Table dictionary lookup: the first phrase contained in the folded label decides.
pub(crate) fn lookup(folded: &str) -> Option<Field> {
    LABELS
        .iter()
        .find(|labels| labels.phrases.iter().any(|phrase| folded.contains(phrase)))
        .map(|labels| labels.field)
}

/// First field whose pattern matches `text`, in dictionary order.
pub(crate) fn match_field(text: &str) -> Option<Field> {
    FIELD_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(field, _)| *field)
}
