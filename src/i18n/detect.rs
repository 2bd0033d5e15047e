//! Language identification.
//!
//! Statistical detection via `whatlang` first, then a Unicode-script table for
//! the Indic and Arabic scripts the statistical model often misses on short
//! input, then the pivot language.

use crate::i18n::{Language, LanguageCatalog};
use std::ops::RangeInclusive;
use tracing::debug;
use whatlang::Lang;

/// Maps a Unicode block to the language assumed for text written in it.
#[derive(Debug, Clone)]
pub struct ScriptRule {
    pub script: &'static str,
    pub range: RangeInclusive<char>,
    pub language: &'static str,
}

/// Evaluated top to bottom; the first rule with any matching character wins.
pub const SCRIPT_RULES: &[ScriptRule] = &[
    ScriptRule {
        script: "Devanagari",
        range: '\u{0900}'..='\u{097F}',
        language: "hi",
    },
    ScriptRule {
        script: "Bengali",
        range: '\u{0980}'..='\u{09FF}',
        language: "bn",
    },
    ScriptRule {
        script: "Gujarati",
        range: '\u{0A80}'..='\u{0AFF}',
        language: "gu",
    },
    ScriptRule {
        script: "Gurmukhi",
        range: '\u{0A00}'..='\u{0A7F}',
        language: "pa",
    },
    ScriptRule {
        script: "Tamil",
        range: '\u{0B80}'..='\u{0BFF}',
        language: "ta",
    },
    ScriptRule {
        script: "Telugu",
        range: '\u{0C00}'..='\u{0C7F}',
        language: "te",
    },
    ScriptRule {
        script: "Arabic",
        range: '\u{0600}'..='\u{06FF}',
        language: "ur",
    },
];

/// Guess the language of `text`. Never fails: inconclusive input, including
/// empty or whitespace-only text, yields the catalog's pivot language.
///
/// A statistical result the catalog knows takes priority over the script
/// table, so Devanagari text identified as Marathi stays `mr`. The script
/// table only decides when the statistical guess is missing or uncatalogued.
pub fn detect(catalog: &LanguageCatalog, text: &str) -> Language {
    if text.trim().is_empty() {
        return catalog.pivot();
    }

    if let Some(language) = detect_statistically(catalog, text) {
        debug!("Statistical detector identified '{}'", language);
        return language;
    }

    if let Some(language) = detect_by_script(text) {
        debug!("Script fallback identified '{}'", language);
        return language;
    }

    catalog.pivot()
}

/// Statistical guess, kept only when the catalog knows the language.
fn detect_statistically(catalog: &LanguageCatalog, text: &str) -> Option<Language> {
    let info = whatlang::detect(text)?;
    iso_639_1(info.lang()).and_then(|code| catalog.resolve(code))
}

/// First script rule that matches any character of `text`.
pub fn detect_by_script(text: &str) -> Option<Language> {
    SCRIPT_RULES
        .iter()
        .find(|rule| text.chars().any(|c| rule.range.contains(&c)))
        .map(|rule| Language::from_static(rule.language))
}

fn iso_639_1(lang: Lang) -> Option<&'static str> {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Hin => "hi",
        Lang::Ben => "bn",
        Lang::Guj => "gu",
        Lang::Mar => "mr",
        Lang::Pan => "pa",
        Lang::Tam => "ta",
        Lang::Tel => "te",
        Lang::Urd => "ur",
        Lang::Fra => "fr",
        Lang::Spa => "es",
        Lang::Deu => "de",
        Lang::Rus => "ru",
        Lang::Cmn => "zh",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LanguageConfig;
    use proptest::prelude::*;

    fn catalog() -> LanguageCatalog {
        LanguageCatalog::builtin()
    }

    /// Catalog with no Indic languages, so statistical Hindi or Marathi
    /// guesses cannot be resolved.
    fn latin_only_catalog() -> LanguageCatalog {
        LanguageCatalog::new(
            vec![
                LanguageConfig::new("en", "English", "", "en_XX"),
                LanguageConfig::new("fr", "French", "", "fr_XX"),
            ],
            [("en", "fr"), ("fr", "en")],
            "en",
        )
    }

    #[test]
    fn test_empty_text_defaults_to_pivot() {
        assert_eq!(detect(&catalog(), ""), Language::ENGLISH);
        assert_eq!(detect(&catalog(), "   \n\t "), Language::ENGLISH);
    }

    #[test]
    fn test_digits_and_punctuation_default_to_pivot() {
        assert_eq!(detect(&catalog(), "12345 !!! ???"), Language::ENGLISH);
    }

    #[test]
    fn test_detects_long_english_text() {
        let text = "The committee published its annual report on Tuesday, \
                    describing how the new policy affected small businesses \
                    across the country during the last financial year.";
        assert_eq!(detect(&catalog(), text).code(), "en");
    }

    #[test]
    fn test_detects_long_french_text() {
        let text = "Le gouvernement a annoncé hier une série de mesures destinées \
                    à soutenir les petites entreprises pendant la crise économique \
                    qui touche actuellement l'ensemble du pays.";
        assert_eq!(detect(&catalog(), text).code(), "fr");
    }

    #[test]
    fn test_script_rules_priority_order() {
        let order: Vec<_> = SCRIPT_RULES.iter().map(|rule| rule.language).collect();
        assert_eq!(order, vec!["hi", "bn", "gu", "pa", "ta", "te", "ur"]);
    }

    #[test]
    fn test_script_fallback_each_script() {
        assert_eq!(detect_by_script("নমস্কার").unwrap().code(), "bn");
        assert_eq!(detect_by_script("નમસ્તે").unwrap().code(), "gu");
        assert_eq!(detect_by_script("ਸਤ ਸ੍ਰੀ ਅਕਾਲ").unwrap().code(), "pa");
        assert_eq!(detect_by_script("வணக்கம்").unwrap().code(), "ta");
        assert_eq!(detect_by_script("నమస్కారం").unwrap().code(), "te");
        assert_eq!(detect_by_script("السلام علیکم").unwrap().code(), "ur");
    }

    #[test]
    fn test_script_fallback_prefers_earlier_rule() {
        // Tamil appears first in the text but Devanagari has higher priority
        assert_eq!(detect_by_script("வணக்கம் नमस्ते").unwrap().code(), "hi");
    }

    #[test]
    fn test_script_fallback_latin_is_none() {
        assert!(detect_by_script("plain ascii text").is_none());
    }

    #[test]
    fn test_uncatalogued_statistical_guess_uses_script_table() {
        let text = "भारत एक विशाल देश है और यहाँ अनेक भाषाएँ बोली जाती हैं।";
        assert_eq!(detect(&latin_only_catalog(), text).code(), "hi");
    }

    #[test]
    fn test_catalogued_statistical_guess_beats_script_table() {
        // The script table alone would answer "hi" for the Devanagari word
        let text = "Le gouvernement a annoncé hier une série de mesures destinées \
                    à soutenir les petites entreprises, selon le journal नमस्ते.";
        assert_eq!(detect_by_script(text).unwrap().code(), "hi");
        assert_eq!(detect(&catalog(), text).code(), "fr");
    }

    #[test]
    fn test_iso_mapping_unknown_language() {
        assert_eq!(iso_639_1(Lang::Ita), None);
        assert_eq!(iso_639_1(Lang::Cmn), Some("zh"));
    }

    proptest! {
        #[test]
        fn prop_devanagari_text_falls_back_to_hindi(
            text in "[\u{0900}-\u{097F}]{1,40}"
        ) {
            prop_assert_eq!(detect_by_script(&text).map(|l| l.code()), Some("hi"));
        }

        #[test]
        fn prop_detect_devanagari_resolves_to_hindi_when_uncatalogued(
            text in "[\u{0900}-\u{097F}]{1,40}( [\u{0900}-\u{097F}]{1,12}){0,6}"
        ) {
            prop_assert_eq!(detect(&latin_only_catalog(), &text).code(), "hi");
        }

        #[test]
        fn prop_detect_never_panics(text in "\\PC{0,64}") {
            let language = detect(&catalog(), &text);
            prop_assert!(!language.code().is_empty());
        }
    }
}
