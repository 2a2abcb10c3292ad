//! Scene-structured story scripts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Anchor used when the model omits a character description.
pub const DEFAULT_CHARACTER_ANCHOR: &str = "Biblical character, 3d animation style";

/// Narration substituted when a scene lacks the requested language.
pub const MISSING_NARRATION: &str = "Language not available.";

/// Visual substituted when a scene has no visual action.
pub const DEFAULT_VISUAL_ACTION: &str = "Cinematic scene";

/// One narrated unit of the story.
///
/// # Examples
///
/// ```
/// use fabula_core::Scene;
///
/// let scene: Scene = serde_json::from_str(
///     r#"{"narration": {"en": "Once upon a time..."}, "visual_action": "Wide shot of a desert"}"#,
/// ).unwrap();
///
/// assert_eq!(scene.narration_for("en"), "Once upon a time...");
/// assert_eq!(scene.narration_for("te"), "Language not available.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scene {
    /// Narration text keyed by language code
    #[serde(default)]
    pub narration: BTreeMap<String, String>,
    /// Camera-first physical description used for the illustration
    #[serde(default)]
    pub visual_action: String,
}

impl Scene {
    /// Narration for `language`, or a placeholder sentence when absent.
    pub fn narration_for(&self, language: &str) -> &str {
        self.narration
            .get(language)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(MISSING_NARRATION)
    }

    /// Visual action, or a generic cinematic scene when empty.
    pub fn visual(&self) -> &str {
        if self.visual_action.trim().is_empty() {
            DEFAULT_VISUAL_ACTION
        } else {
            &self.visual_action
        }
    }
}

/// Structured script returned by the script generator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Script {
    /// Fixed description of the recurring character
    #[serde(default)]
    pub character_anchor: String,
    /// Story scenes in order
    #[serde(default)]
    pub scenes: Vec<Scene>,
    /// Moral of the story, narrated after the scenes
    #[serde(default)]
    pub lesson: Option<Scene>,
    /// Closing blessing, narrated last
    #[serde(default)]
    pub blessing: Option<Scene>,
}

impl Script {
    /// Scenes followed by the lesson and blessing pseudo-scenes.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_core::{Scene, Script};
    ///
    /// let script = Script {
    ///     scenes: vec![Scene::default(), Scene::default()],
    ///     lesson: Some(Scene::default()),
    ///     blessing: None,
    ///     ..Default::default()
    /// };
    /// assert_eq!(script.segments().len(), 3);
    /// ```
    pub fn segments(&self) -> Vec<&Scene> {
        self.scenes
            .iter()
            .chain(self.lesson.iter())
            .chain(self.blessing.iter())
            .collect()
    }

    /// Character anchor, or the generic default when the model left it empty.
    pub fn anchor(&self) -> &str {
        if self.character_anchor.trim().is_empty() {
            DEFAULT_CHARACTER_ANCHOR
        } else {
            &self.character_anchor
        }
    }

    /// First `count` scene narrations in `language`, joined by spaces.
    pub fn preview(&self, language: &str, count: usize) -> String {
        self.scenes
            .iter()
            .take(count)
            .filter_map(|scene| scene.narration.get(language))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(en: &str) -> Scene {
        Scene {
            narration: BTreeMap::from([("en".to_string(), en.to_string())]),
            visual_action: String::new(),
        }
    }

    #[test]
    fn segments_keep_order() {
        let script = Script {
            character_anchor: String::new(),
            scenes: vec![scene("one"), scene("two")],
            lesson: Some(scene("lesson")),
            blessing: Some(scene("blessing")),
        };
        let texts: Vec<_> = script
            .segments()
            .into_iter()
            .map(|s| s.narration_for("en"))
            .collect();
        assert_eq!(texts, vec!["one", "two", "lesson", "blessing"]);
    }

    #[test]
    fn blank_fields_fall_back() {
        let script = Script::default();
        assert_eq!(script.anchor(), DEFAULT_CHARACTER_ANCHOR);
        assert_eq!(scene("").narration_for("en"), MISSING_NARRATION);
        assert_eq!(scene("x").visual(), DEFAULT_VISUAL_ACTION);
    }

    #[test]
    fn preview_uses_first_scenes_only() {
        let script = Script {
            scenes: vec![scene("a"), scene("b"), scene("c")],
            ..Default::default()
        };
        assert_eq!(script.preview("en", 2), "a b");
        assert_eq!(script.preview("te", 2), "");
    }
}
