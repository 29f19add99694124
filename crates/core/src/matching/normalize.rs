//! Text normalization shared by the matcher, the command classifier, and
//! funnel scoring. Absorbs the common transliteration noise of chat input
//! (dropped accents, doubled letters, stray punctuation) without a
//! dictionary.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, strip diacritics (NFD and drop combining marks), collapse any
/// run of two or more identical consecutive letters to one, replace
/// punctuation with spaces, and collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut collapsed = String::with_capacity(lowered.len());
    let mut previous: Option<char> = None;

    for ch in lowered.nfd().filter(|ch| !is_combining_mark(*ch)) {
        let ch = if ch.is_alphanumeric() { ch } else { ' ' };
        if ch.is_alphabetic() && previous == Some(ch) {
            continue;
        }
        collapsed.push(ch);
        previous = Some(ch);
    }

    collapsed.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text).split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize, tokenize};

    #[test]
    fn lowercases_and_strips_accents() {
        assert_eq!(normalize("Café con Azúcar"), "cafe con azucar");
        assert_eq!(normalize("Jalapeño"), "jalapeno");
    }

    #[test]
    fn collapses_doubled_letters() {
        assert_eq!(normalize("cappuccino"), "capucino");
        assert_eq!(normalize("croissant"), "croisant");
    }

    #[test]
    fn digits_are_not_collapsed() {
        assert_eq!(normalize("quiero 22 empanadas"), "quiero 22 empanadas");
    }

    #[test]
    fn punctuation_becomes_whitespace() {
        assert_eq!(normalize("hola!!! quiero... un cafe, por favor."), "hola quiero un cafe por favor");
    }

    #[test]
    fn doubled_letter_runs_do_not_collapse_across_words() {
        // Trailing and leading identical letters of adjacent words survive.
        assert_eq!(normalize("mas salsa"), "mas salsa");
    }

    #[test]
    fn tokenizes_on_normalized_whitespace() {
        assert_eq!(tokenize("  Dos   Cappuccinos! "), vec!["dos", "capucinos"]);
    }
}
