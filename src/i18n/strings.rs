/// User-facing messages for outcomes that could not produce a summary.
///
/// Strings are stored as templates. Placeholders are substituted by
/// [`fill`] with display names from the catalog.
#[derive(Debug, Clone)]
pub struct UnsupportedMessages {
    /// The detected source language has no translation targets.
    /// Placeholders: {source}
    pub source_language: &'static str,

    /// Translating the input into the pivot language failed.
    /// Placeholders: {source}, {pivot}
    pub source_to_pivot: &'static str,

    /// Translating the pivot summary into the output language failed.
    /// Placeholders: {pivot}, {target}
    pub pivot_to_target: &'static str,

    /// Translating a short input straight into the output language failed.
    /// Placeholders: {source}, {target}
    pub source_to_target: &'static str,

    /// The summarization service did not answer.
    pub summarization: &'static str,
}

pub const UNSUPPORTED_MESSAGES: UnsupportedMessages = UnsupportedMessages {
    source_language: "Sorry, translation from {source} is not supported yet.",
    source_to_pivot: "Sorry, translation from {source} to {pivot} is not supported yet.",
    pivot_to_target: "Sorry, translation from {pivot} to {target} is not supported yet.",
    source_to_target: "Sorry, translation from {source} to {target} is not supported yet.",
    summarization: "Sorry, the summarization service is unavailable right now.",
};

/// Replace every `{key}` in `template` with its value.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{}}}", key), value)
        })
}
