//! French tokenization, stop words and accent folding.
//!
//! Splitting rules: digit runs, letter runs (an elided article keeps its
//! apostrophe, `l'électricité` → `l'` `électricité`), and every other
//! non-space character as its own token. `12km` therefore yields `12` `km`.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::PartOfSpeech;

static RE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+|[\p{L}\p{M}]+['’]?|\S").unwrap());

/// French function words, lower case.
const STOP_WORDS: &[&str] = &[
    "a", "à", "ai", "aie", "ainsi", "alors", "as", "au", "aucun", "aucune", "aussi", "autre",
    "aux", "avais", "avait", "avec", "avez", "avoir", "avons", "beaucoup", "bien", "c'", "ça",
    "car", "ce", "ceci", "cela", "celle", "celui", "ces", "cet", "cette", "chaque", "chez",
    "comme", "comment", "d'", "dans", "de", "des", "donc", "dont", "du", "elle", "elles", "en",
    "encore", "entre", "es", "est", "et", "été", "étais", "était", "être", "eu", "eux", "fait",
    "faire", "fois", "hors", "il", "ils", "j'", "jamais", "je", "jusqu'", "l'", "la", "le",
    "les", "leur", "leurs", "lui", "m'", "ma", "mais", "me", "même", "mes", "moi", "moins",
    "mon", "n'", "ne", "ni", "nos", "notre", "nous", "on", "ont", "ou", "où", "par", "parce",
    "pas", "peu", "peut", "plus", "pour", "pourquoi", "qu'", "quand", "que", "quel", "quelle",
    "quelles", "quels", "qui", "quoi", "s'", "sa", "sans", "se", "ses", "si", "son", "sont",
    "sous", "suis", "sur", "t'", "ta", "te", "tes", "toi", "ton", "tous", "tout", "toute",
    "toutes", "très", "trop", "tu", "un", "une", "vos", "votre", "vous", "y",
];

static STOP_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// A token before embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub text: String,
    pub pos: PartOfSpeech,
    pub is_stop: bool,
}

/// Split a text into tokens.
pub fn tokenize(text: &str) -> Vec<RawToken> {
    RE_TOKEN
        .find_iter(text)
        .map(|m| {
            let surface = m.as_str();
            let pos = classify(surface);
            RawToken {
                text: surface.to_string(),
                pos,
                is_stop: pos == PartOfSpeech::Word && is_stop_word(surface),
            }
        })
        .collect()
}

fn classify(surface: &str) -> PartOfSpeech {
    if surface.chars().all(|c| c.is_ascii_digit()) {
        PartOfSpeech::Num
    } else if surface.chars().next().is_some_and(char::is_alphabetic) {
        PartOfSpeech::Word
    } else {
        PartOfSpeech::Punct
    }
}

/// Whether a word is a French function word (case-insensitive).
pub fn is_stop_word(word: &str) -> bool {
    let lower = word.to_lowercase().replace('’', "'");
    STOP_SET.contains(lower.as_str())
}

/// Lower-case and strip diacritics: `Électricité` → `electricite`.
pub fn fold(word: &str) -> String {
    word.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Whether the whole (trimmed) text is an unsigned decimal integer.
pub fn is_numeric(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn splits_numbers_from_units() {
        assert_eq!(texts("12km par semaine"), ["12", "km", "par", "semaine"]);
    }

    #[test]
    fn keeps_elided_articles_apart() {
        assert_eq!(texts("J'ai l'électricité"), ["J'", "ai", "l'", "électricité"]);
    }

    #[test]
    fn punctuation_is_its_own_token() {
        let tokens = tokenize("bois, gaz !");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1].pos, PartOfSpeech::Punct);
        assert_eq!(tokens[3].pos, PartOfSpeech::Punct);
        assert_eq!(tokens[0].pos, PartOfSpeech::Word);
    }

    #[test]
    fn stop_words_are_flagged() {
        let tokens = tokenize("Je mange de tout");
        let flags: Vec<bool> = tokens.iter().map(|t| t.is_stop).collect();
        assert_eq!(flags, [true, false, true, true]);
    }

    #[test]
    fn numbers_are_never_stop_words() {
        let tokens = tokenize("3 personnes");
        assert_eq!(tokens[0].pos, PartOfSpeech::Num);
        assert!(!tokens[0].is_stop);
    }

    #[test]
    fn fold_strips_accents_and_case() {
        assert_eq!(fold("Électricité"), "electricite");
        assert_eq!(fold("BIOMÉTHANE"), "biomethane");
        assert_eq!(fold("végé"), "vege");
    }

    #[test]
    fn numeric_detection() {
        assert!(is_numeric("42"));
        assert!(is_numeric(" 42 "));
        assert!(!is_numeric(""));
        assert!(!is_numeric("4 2"));
        assert!(!is_numeric("42km"));
        assert!(!is_numeric("-3"));
    }
}
