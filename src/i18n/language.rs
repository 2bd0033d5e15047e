//! Language type: a validated language code.
//!
//! A `Language` can only be obtained from a [`LanguageCatalog`], from the
//! script-fallback rules, or from the `ENGLISH` constant, so every code that
//! flows through the pipeline is a `&'static str` owned by static data.
//!
//! [`LanguageCatalog`]: crate::i18n::LanguageCatalog

use serde::{Serialize, Serializer};
use std::fmt;

/// A language code such as `"en"` or `"hi"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "hi")
    code: &'static str,
}

impl Language {
    /// English, the pivot language of the built-in catalog.
    pub const ENGLISH: Language = Language { code: "en" };

    /// Wrap a static code. Callers outside the `i18n` module go through
    /// `LanguageCatalog::resolve` instead.
    pub(crate) const fn from_static(code: &'static str) -> Language {
        Language { code }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
