//! Internationalization (i18n) module.
//!
//! Everything language-related lives here: the catalog of supported
//! languages and translation pairs, language identification, and the
//! user-facing messages for unsupported languages.
//!
//! # Architecture
//!
//! - `registry`: the immutable language catalog and support matrix
//! - `language`: the `Language` code type
//! - `detect`: statistical detection with a Unicode-script fallback
//! - `strings`: message templates for unsupported outcomes
//!
//! # Example
//!
//! ```rust,ignore
//! use multilingual_summarizer::i18n::{detect, LanguageCatalog};
//!
//! let catalog = LanguageCatalog::builtin();
//! let source = detect(&catalog, "नमस्ते दुनिया");
//! let targets = catalog.supported_targets(source);
//! ```

mod detect;
mod language;
mod registry;
mod strings;

pub use detect::{detect, detect_by_script, ScriptRule, SCRIPT_RULES};
pub use language::Language;
pub use registry::{LanguageCatalog, LanguageConfig, SupportedTargets};
pub use strings::{fill, UnsupportedMessages, UNSUPPORTED_MESSAGES};
