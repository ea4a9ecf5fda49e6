/*!
 * Language utilities for target language handling.
 *
 * Target languages are given as BCP 47 style tags such as `zh-Hant` or
 * `pt-BR`. Only the primary subtag is checked against ISO 639; script and
 * region subtags are passed through to the provider untouched.
 */

use anyhow::{Result, anyhow};
use isolang::Language;

/// Extract the primary language subtag of a tag
pub fn primary_subtag(tag: &str) -> &str {
    tag.trim().split(['-', '_']).next().unwrap_or_default()
}

/// Validate a target language tag
///
/// Accepts ISO 639-1 (2-letter) and ISO 639-3 (3-letter) primary subtags.
pub fn validate_language_tag(tag: &str) -> Result<()> {
    let primary = primary_subtag(tag).to_lowercase();

    let known = match primary.len() {
        2 => Language::from_639_1(&primary).is_some(),
        3 => Language::from_639_3(&primary).is_some(),
        _ => false,
    };

    if known {
        Ok(())
    } else {
        Err(anyhow!("Invalid language code: {}", tag))
    }
}

/// Get the English display name for a language tag, falling back to the tag itself
pub fn get_language_name(tag: &str) -> String {
    let primary = primary_subtag(tag).to_lowercase();
    let language = match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    };

    match language {
        Some(lang) => lang.to_name().to_string(),
        None => tag.to_string(),
    }
}
