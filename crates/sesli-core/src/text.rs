//! Turkish-aware text folding shared by search and keyword matching.
//!
//! `str::to_lowercase` maps `I` to `i` and `İ` to `i̇` (with a combining dot),
//! which breaks matching of upper-case Turkish input such as `"HAYIR"`.
//! The folds here apply the Turkish casing rules first.

/// Lower-case `text` using Turkish rules (`I -> ı`, `İ -> i`).
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'I' => out.push('ı'),
            'İ' => out.push('i'),
            other => out.extend(other.to_lowercase()),
        }
    }
    out
}

/// Fold and then strip Turkish diacritics (`ı ğ ş ç ö ü` to ASCII).
///
/// Used for the command vocabulary, where "hayir" typed on a keyboard
/// without Turkish letters should still count as "hayır".
pub fn fold_loose(text: &str) -> String {
    fold(text)
        .chars()
        .map(|c| match c {
            'ı' => 'i',
            'ğ' => 'g',
            'ş' => 's',
            'ç' => 'c',
            'ö' => 'o',
            'ü' => 'u',
            'â' => 'a',
            'î' => 'i',
            'û' => 'u',
            other => other,
        })
        .collect()
}
