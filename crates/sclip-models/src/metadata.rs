//! Upload metadata schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// YouTube category id for Entertainment, the historical default.
pub const DEFAULT_CATEGORY: u32 = 24;

/// Metadata for one uploaded short, as generated by the metadata
/// collaborator and persisted next to the clip as
/// `<index>_short_metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortMetadata {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(
        default = "default_category",
        deserialize_with = "deserialize_category"
    )]
    pub category: u32,
    /// Stamped when the metadata was generated; absent in older sidecars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

fn default_category() -> u32 {
    DEFAULT_CATEGORY
}

/// The generation model is inconsistent about emitting the category as a
/// number or a string; accept both.
fn deserialize_category<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => Ok(s.trim().parse().unwrap_or(DEFAULT_CATEGORY)),
    }
}
