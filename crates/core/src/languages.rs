//! Static registry of supported languages.
//!
//! Codes are ISO 639-1 (with a region suffix where the dialect matters for
//! subtitling). The registry is a pure lookup table.

use serde::Serialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    pub direction: TextDirection,
}

const fn ltr(code: &'static str, name: &'static str, native_name: &'static str) -> Language {
    Language {
        code,
        name,
        native_name,
        direction: TextDirection::Ltr,
    }
}

const fn rtl(code: &'static str, name: &'static str, native_name: &'static str) -> Language {
    Language {
        code,
        name,
        native_name,
        direction: TextDirection::Rtl,
    }
}

pub const LANGUAGES: &[Language] = &[
    ltr("en", "English", "English"),
    ltr("es", "Spanish", "Español"),
    ltr("fr", "French", "Français"),
    ltr("de", "German", "Deutsch"),
    ltr("it", "Italian", "Italiano"),
    ltr("pt", "Portuguese", "Português"),
    ltr("pt-BR", "Portuguese (Brazil)", "Português (Brasil)"),
    ltr("nl", "Dutch", "Nederlands"),
    ltr("sv", "Swedish", "Svenska"),
    ltr("no", "Norwegian", "Norsk"),
    ltr("da", "Danish", "Dansk"),
    ltr("fi", "Finnish", "Suomi"),
    ltr("pl", "Polish", "Polski"),
    ltr("cs", "Czech", "Čeština"),
    ltr("ro", "Romanian", "Română"),
    ltr("hu", "Hungarian", "Magyar"),
    ltr("el", "Greek", "Ελληνικά"),
    ltr("tr", "Turkish", "Türkçe"),
    ltr("ru", "Russian", "Русский"),
    ltr("uk", "Ukrainian", "Українська"),
    rtl("ar", "Arabic", "العربية"),
    rtl("he", "Hebrew", "עברית"),
    rtl("fa", "Persian", "فارسی"),
    rtl("ur", "Urdu", "اردو"),
    ltr("hi", "Hindi", "हिन्दी"),
    ltr("bn", "Bengali", "বাংলা"),
    ltr("th", "Thai", "ไทย"),
    ltr("vi", "Vietnamese", "Tiếng Việt"),
    ltr("id", "Indonesian", "Bahasa Indonesia"),
    ltr("ms", "Malay", "Bahasa Melayu"),
    ltr("zh-CN", "Chinese (Simplified)", "简体中文"),
    ltr("zh-TW", "Chinese (Traditional)", "繁體中文"),
    ltr("ja", "Japanese", "日本語"),
    ltr("ko", "Korean", "한국어"),
];

/// Look up a language by code (case-insensitive).
pub fn find_language(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(code))
}

/// Validate a project's language pair.
///
/// The source must be known; there must be at least one target; every
/// target must be known, distinct, and different from the source.
pub fn validate_language_pair(source: &str, targets: &[String]) -> Result<(), CoreError> {
    let source_lang = find_language(source).ok_or_else(|| {
        CoreError::Validation(format!("Unsupported source language '{source}'"))
    })?;

    if targets.is_empty() {
        return Err(CoreError::Validation(
            "At least one target language is required".to_string(),
        ));
    }

    let mut seen: Vec<&'static str> = Vec::with_capacity(targets.len());
    for target in targets {
        let lang = find_language(target).ok_or_else(|| {
            CoreError::Validation(format!("Unsupported target language '{target}'"))
        })?;
        if lang.code == source_lang.code {
            return Err(CoreError::Validation(format!(
                "Target language '{target}' is the same as the source language"
            )));
        }
        if seen.contains(&lang.code) {
            return Err(CoreError::Validation(format!(
                "Duplicate target language '{target}'"
            )));
        }
        seen.push(lang.code);
    }
    Ok(())
}

/// Canonical spelling of a known language code (`"ZH-cn"` -> `"zh-CN"`).
pub fn canonical_code(code: &str) -> Option<&'static str> {
    find_language(code).map(|l| l.code)
}
