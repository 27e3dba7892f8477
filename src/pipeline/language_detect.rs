//! Report language detection.
//!
//! Trigram detection via `whatlang`, mapped to ISO 639-1 codes where one
//! exists. Guesses whatlang marks as unreliable count as failures. Failure
//! is an expected outcome (empty, symbol-only or very short reports), so
//! callers use [`detect_or_default`] which always yields a code.

use whatlang::Lang;

use crate::config;

/// Why no language could be determined.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectionError {
    #[error("no text to detect")]
    EmptyInput,
    #[error("language could not be recognised")]
    Unrecognized,
}

/// Best-guess language of a text.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Result<String, DetectionError>;
}

/// Default detector backed by `whatlang`.
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<String, DetectionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DetectionError::EmptyInput);
        }
        let info = whatlang::detect(text).ok_or(DetectionError::Unrecognized)?;
        if !info.is_reliable() {
            tracing::debug!(
                guess = info.lang().code(),
                confidence = info.confidence(),
                "Language guess not reliable"
            );
            return Err(DetectionError::Unrecognized);
        }
        Ok(lang_to_code(info.lang()).to_string())
    }
}

/// Run the detector, falling back to the default code on any failure.
pub fn detect_or_default(detector: &dyn LanguageDetector, text: &str) -> Detection {
    match detector.detect(text) {
        Ok(code) => Detection {
            code,
            fell_back: false,
        },
        Err(e) => {
            tracing::debug!(reason = %e, "Language detection fell back to default");
            Detection {
                code: config::FALLBACK_LANGUAGE.to_string(),
                fell_back: true,
            }
        }
    }
}

/// Outcome of [`detect_or_default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub code: String,
    /// True when `code` is the default rather than a detection.
    pub fell_back: bool,
}

/// ISO 639-1 code for common languages, whatlang's 639-3 code otherwise.
fn lang_to_code(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Deu => "de",
        Lang::Fra => "fr",
        Lang::Spa => "es",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Nld => "nl",
        Lang::Pol => "pl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Tur => "tr",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Fin => "fi",
        Lang::Ces => "cs",
        Lang::Ell => "el",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        Lang::Cmn => "zh",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Vie => "vi",
        Lang::Tha => "th",
        other => other.code(),
    }
}

/// Human-readable name shown next to the result; unknown codes are shown as-is.
pub fn display_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "de" => "German",
        "fr" => "French",
        "es" => "Spanish",
        "it" => "Italian",
        other => other,
    }
}
