//! Localization hints for metadata generation.

use serde::{Deserialize, Serialize};

/// Localization hints for one language.
///
/// Created once per language code per pipeline and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// Display name of the language
    pub language_name: String,
    /// Target-audience description
    pub audience: String,
    /// Marketing phrase that must appear in titles
    pub bible_phrase: String,
    /// Call-to-action line
    pub cta: String,
    /// Guidance for tag generation
    pub tags_hint: String,
}

impl LanguageProfile {
    /// Deterministic profile built from the language code alone.
    ///
    /// Every field is non-empty, even for a blank code.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_core::LanguageProfile;
    ///
    /// let profile = LanguageProfile::fallback("xx");
    /// assert_eq!(profile.language_name, "XX");
    /// assert_eq!(profile, LanguageProfile::fallback("xx"));
    /// assert!(profile.is_complete());
    /// ```
    pub fn fallback(code: &str) -> Self {
        let code = code.trim();
        let language_name = if code.is_empty() {
            "UNKNOWN".to_string()
        } else {
            code.to_uppercase()
        };
        Self {
            language_name,
            audience: "Global Audience".to_string(),
            bible_phrase: "Bible Story".to_string(),
            cta: "Subscribe for more stories!".to_string(),
            tags_hint: "Mix of English and local language keywords".to_string(),
        }
    }

    /// True when every field holds non-whitespace text.
    pub fn is_complete(&self) -> bool {
        [
            &self.language_name,
            &self.audience,
            &self.bible_phrase,
            &self.cta,
            &self.tags_hint,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_code_still_complete() {
        let profile = LanguageProfile::fallback("   ");
        assert_eq!(profile.language_name, "UNKNOWN");
        assert!(profile.is_complete());
    }

    #[test]
    fn incomplete_when_any_field_blank() {
        let mut profile = LanguageProfile::fallback("te");
        profile.cta = " ".to_string();
        assert!(!profile.is_complete());
    }
}
