//! Upload metadata for a finished video.

use serde::{Deserialize, Serialize};

/// Platform title limit, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Category used when the model does not pick one ("People & Blogs").
pub const DEFAULT_CATEGORY_ID: &str = "22";

/// Title, description, tags and category for one language's video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Video title
    pub title: String,
    /// Video description
    #[serde(default)]
    pub description: String,
    /// Search tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Platform category id
    #[serde(default, deserialize_with = "string_or_number")]
    pub category_id: String,
}

// Models answer `"category_id": 22` about as often as `"22"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected category id, got {}",
            other
        ))),
    }
}

impl VideoMetadata {
    /// Enforce platform constraints on model output.
    ///
    /// Truncates the title, trims and de-duplicates tags (first occurrence
    /// wins, case-insensitive) and fills a missing category.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_core::VideoMetadata;
    ///
    /// let metadata = VideoMetadata {
    ///     title: "T".repeat(150),
    ///     description: "d".into(),
    ///     tags: vec!["Bible".into(), " bible ".into(), "Jesus".into(), "".into()],
    ///     category_id: String::new(),
    /// }
    /// .normalized();
    ///
    /// assert_eq!(metadata.title.chars().count(), 100);
    /// assert_eq!(metadata.tags, vec!["Bible", "Jesus"]);
    /// assert_eq!(metadata.category_id, "22");
    /// ```
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().chars().take(MAX_TITLE_CHARS).collect();

        let mut seen = std::collections::HashSet::new();
        self.tags = self
            .tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty() && seen.insert(tag.to_lowercase()))
            .collect();

        if self.category_id.trim().is_empty() {
            self.category_id = DEFAULT_CATEGORY_ID.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_category_is_accepted() {
        let metadata: VideoMetadata =
            serde_json::from_str(r#"{"title": "Joseph", "category_id": 27}"#).unwrap();
        assert_eq!(metadata.category_id, "27");
        assert!(metadata.tags.is_empty());
    }
}
