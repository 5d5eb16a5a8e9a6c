use std::{borrow::Cow, sync::LazyLock};

use deunicode::deunicode;
use regex::Regex;

/// Abbreviation marks dropped before transliteration, so `Nº` becomes `n`.
const ORDINAL_MARKS: [char; 3] = ['\u{00BA}', '\u{00AA}', '\u{00B0}'];

static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z0-9]+").expect("separator pattern compiles"));

/// Rewrites a spreadsheet label into the destination column name: ASCII,
/// lowercase, `_`-joined words, no leading or trailing underscores.
///
/// Already-normalized labels are returned borrowed and unchanged.
pub fn normalize_label(label: &str) -> Cow<'_, str> {
    if is_normalized(label) {
        return Cow::Borrowed(label);
    }
    let stripped = label
        .chars()
        .filter(|ch| !ORDINAL_MARKS.contains(ch))
        .collect::<String>();
    let ascii = deunicode(&stripped).to_lowercase();
    let joined = SEPARATOR_RUNS.replace_all(&ascii, "_");
    Cow::Owned(joined.trim_matches('_').to_string())
}

fn is_normalized(label: &str) -> bool {
    label
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
        && !label.starts_with('_')
        && !label.ends_with('_')
        && !label.contains("__")
}
