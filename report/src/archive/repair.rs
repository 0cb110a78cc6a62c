use std::borrow::Cow;

/// UTF-8 sequences that were decoded as Latin-1 (or Windows-1252) and what they should have been.
/// The first char of every pair is either `Ã` (lead byte 0xC3) or `Â` (lead byte 0xC2).
const SUBSTITUTIONS: &[(char, char, char)] = &[
    // lowercase
    ('Ã', '¡', 'á'),
    ('Ã', '©', 'é'),
    ('Ã', '\u{ad}', 'í'),
    ('Ã', '³', 'ó'),
    ('Ã', 'º', 'ú'),
    ('Ã', '±', 'ñ'),
    ('Ã', '¼', 'ü'),
    ('Ã', '§', 'ç'),
    ('Ã', '£', 'ã'),
    ('Ã', 'µ', 'õ'),
    ('Ã', '¢', 'â'),
    ('Ã', 'ª', 'ê'),
    ('Ã', '´', 'ô'),
    // uppercase, Latin-1 control range
    ('Ã', '\u{81}', 'Á'),
    ('Ã', '\u{89}', 'É'),
    ('Ã', '\u{8d}', 'Í'),
    ('Ã', '\u{93}', 'Ó'),
    ('Ã', '\u{9a}', 'Ú'),
    ('Ã', '\u{91}', 'Ñ'),
    ('Ã', '\u{9c}', 'Ü'),
    ('Ã', '\u{87}', 'Ç'),
    ('Ã', '\u{83}', 'Ã'),
    ('Ã', '\u{95}', 'Õ'),
    // uppercase, Windows-1252 glyphs for the same bytes
    ('Ã', '‰', 'É'),
    ('Ã', '“', 'Ó'),
    ('Ã', 'š', 'Ú'),
    ('Ã', '‘', 'Ñ'),
    ('Ã', 'œ', 'Ü'),
    ('Ã', '‡', 'Ç'),
    ('Ã', 'ƒ', 'Ã'),
    ('Ã', '•', 'Õ'),
    // punctuation
    ('Â', '¿', '¿'),
    ('Â', '¡', '¡'),
    ('Â', '°', '°'),
    ('Â', 'º', 'º'),
    ('Â', 'ª', 'ª'),
    ('Â', '·', '·'),
    ('Â', '«', '«'),
    ('Â', '»', '»'),
    ('Â', '\u{a0}', '\u{a0}'),
];

fn substitute(lead: char, trail: char) -> Option<char> {
    SUBSTITUTIONS
        .iter()
        .find(|(l, t, _)| *l == lead && *t == trail)
        .map(|(_, _, fixed)| *fixed)
}

fn repair_once(s: &str) -> Option<String> {
    if !s.contains(['Ã', 'Â']) {
        return None;
    }
    let mut out = String::with_capacity(s.len());
    let mut changed = false;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == 'Ã' || c == 'Â' {
            if let Some(fixed) = chars.peek().and_then(|&next| substitute(c, next)) {
                chars.next();
                out.push(fixed);
                changed = true;
                continue;
            }
        }
        out.push(c);
    }
    changed.then_some(out)
}

/// Repairs UTF-8 text that went through a Latin-1 decoder (`lÃ­nea` becomes `línea`).
///
/// Substitutions run until nothing changes, so a repaired string is a fixed point: running the repair again returns it
/// unchanged.
pub fn repair_mojibake(s: &str) -> Cow<'_, str> {
    let Some(mut repaired) = repair_once(s) else {
        return Cow::Borrowed(s);
    };
    while let Some(next) = repair_once(&repaired) {
        repaired = next;
    }
    Cow::Owned(repaired)
}
