//! Language catalog: single source of truth for supported languages and the
//! translation pairs between them.
//!
//! The catalog is an immutable value built once at startup and shared behind
//! an `Arc`. Tests build reduced catalogs with [`LanguageCatalog::new`].

use crate::i18n::Language;
use std::collections::HashSet;

/// Configuration for a supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "hi")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Hindi")
    pub name: &'static str,

    /// Flag glyph shown next to the name; empty when there is none
    pub flag: &'static str,

    /// Language tag expected by the remote translation model (e.g., "hi_IN")
    pub service_tag: &'static str,
}

impl LanguageConfig {
    pub const fn new(
        code: &'static str,
        name: &'static str,
        flag: &'static str,
        service_tag: &'static str,
    ) -> Self {
        Self {
            code,
            name,
            flag,
            service_tag,
        }
    }
}

/// Immutable registry of languages, translation pairs and the pivot language.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    languages: Vec<LanguageConfig>,
    pairs: HashSet<(&'static str, &'static str)>,
    pivot: &'static str,
}

impl LanguageCatalog {
    /// Build a catalog from explicit parts. Language order is preserved and
    /// defines the order of [`SupportedTargets`].
    pub fn new(
        languages: Vec<LanguageConfig>,
        pairs: impl IntoIterator<Item = (&'static str, &'static str)>,
        pivot: &'static str,
    ) -> Self {
        Self {
            languages,
            pairs: pairs.into_iter().collect(),
            pivot,
        }
    }

    /// The catalog shipped with the application.
    pub fn builtin() -> Self {
        Self::new(default_languages(), default_pairs(), "en")
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Resolve a user-supplied code into a `Language` if the catalog knows it.
    pub fn resolve(&self, code: &str) -> Option<Language> {
        self.get_by_code(code)
            .map(|config| Language::from_static(config.code))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// All languages in catalog order.
    pub fn list(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// The pivot language every cross-language translation is routed through.
    pub fn pivot(&self) -> Language {
        Language::from_static(self.pivot)
    }

    /// English name for a code, or the code itself when it is not catalogued.
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.get_by_code(code).map(|lang| lang.name).unwrap_or(code)
    }

    /// Flag glyph for a code, empty when unknown.
    pub fn flag(&self, code: &str) -> &'static str {
        self.get_by_code(code).map(|lang| lang.flag).unwrap_or("")
    }

    /// Remote service tag for a code. Unknown codes map to the pivot's tag.
    pub fn service_tag(&self, code: &str) -> &'static str {
        self.get_by_code(code)
            .or_else(|| self.get_by_code(self.pivot))
            .map(|lang| lang.service_tag)
            .unwrap_or("en_XX")
    }

    /// Whether `(source, target)` is registered. Identity pairs always are.
    pub fn is_pair_supported(&self, source: &str, target: &str) -> bool {
        source == target || self.pairs.contains(&(source, target))
    }

    /// Every catalogued language reachable from `source`, plus `source`
    /// itself when it is catalogued, in catalog order.
    pub fn supported_targets(&self, source: Language) -> SupportedTargets {
        let entries = self
            .languages
            .iter()
            .filter(|lang| {
                lang.code == source.code() || self.pairs.contains(&(source.code(), lang.code))
            })
            .map(|lang| (Language::from_static(lang.code), lang.name))
            .collect();

        SupportedTargets { entries }
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Ordered mapping of output languages valid for one source language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedTargets {
    entries: Vec<(Language, &'static str)>,
}

impl SupportedTargets {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|(lang, _)| lang.code() == code)
    }

    /// First entry in catalog order.
    pub fn first(&self) -> Option<Language> {
        self.entries.first().map(|(lang, _)| *lang)
    }

    /// Pick the requested language when it is a valid target, otherwise the
    /// first target. `None` only when there are no targets at all.
    pub fn resolve(&self, requested: Option<&str>) -> Option<Language> {
        requested
            .and_then(|code| {
                self.entries
                    .iter()
                    .find(|(lang, _)| lang.code() == code)
                    .map(|(lang, _)| *lang)
            })
            .or_else(|| self.first())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Language, &'static str)> + '_ {
        self.entries.iter().copied()
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig::new("en", "English", "🇬🇧", "en_XX"),
        LanguageConfig::new("hi", "Hindi", "🇮🇳", "hi_IN"),
        LanguageConfig::new("bn", "Bengali", "🇧🇩", "bn_IN"),
        LanguageConfig::new("gu", "Gujarati", "🇮🇳", "gu_IN"),
        LanguageConfig::new("mr", "Marathi", "🇮🇳", "mr_IN"),
        LanguageConfig::new("pa", "Punjabi", "🇮🇳", "pa_IN"),
        LanguageConfig::new("ta", "Tamil", "🇮🇳", "ta_IN"),
        LanguageConfig::new("te", "Telugu", "🇮🇳", "te_IN"),
        LanguageConfig::new("ur", "Urdu", "🇵🇰", "ur_PK"),
        LanguageConfig::new("fr", "French", "🇫🇷", "fr_XX"),
        LanguageConfig::new("es", "Spanish", "🇪🇸", "es_XX"),
        LanguageConfig::new("de", "German", "🇩🇪", "de_DE"),
        LanguageConfig::new("ru", "Russian", "🇷🇺", "ru_RU"),
        LanguageConfig::new("zh", "Chinese", "🇨🇳", "zh_CN"),
    ]
}

/// Pairs the translation model is known to handle.
fn default_pairs() -> Vec<(&'static str, &'static str)> {
    let from_english = [
        "hi", "bn", "mr", "pa", "ta", "te", "ur", "fr", "es", "de", "ru", "zh",
    ];
    let from_hindi = ["en", "bn", "gu", "mr", "pa", "ta", "te", "ur"];
    let to_english = ["bn", "fr", "es", "de", "ru", "zh"];

    from_english
        .iter()
        .map(|target| ("en", *target))
        .chain(from_hindi.iter().map(|target| ("hi", *target)))
        .chain(to_english.iter().map(|source| (*source, "en")))
        .collect()
}
