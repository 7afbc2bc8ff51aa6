use anyhow::{anyhow, Result};
use isolang::Language;

/// Language utilities for prompt construction
///
/// The target language may be configured either as an ISO 639 code ("zh",
/// "fra", "ger") or as a free-form name ("Simplified Chinese", "中文"). Codes
/// are expanded to their English name before they are put into a prompt;
/// anything else is passed through unchanged.

/// ISO 639-2/B codes that differ from their ISO 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Resolve a 2- or 3-letter code to a language
fn lookup(code: &str) -> Option<Language> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => {
            let terminological = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(bibliographic, _)| *bibliographic == normalized)
                .map(|(_, terminological)| *terminological)
                .unwrap_or(normalized.as_str());
            Language::from_639_3(terminological)
        }
        _ => None,
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// The language as it should appear in a prompt
pub fn display_language(language: &str) -> String {
    get_language_name(language).unwrap_or_else(|_| language.trim().to_string())
}
