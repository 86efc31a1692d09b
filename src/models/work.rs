use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An RGB color sample; channels are nominally 0-255 but not bounded
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
}

/// The caller-supplied part of a work record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWork {
    pub name: String,
    /// Base64 encoded image
    pub image_data: String,
    pub color_history: Vec<Color>,
    pub current_color: Option<Color>,
    pub dominant_colors: Vec<Color>,
}

/// A saved work record as stored under a user's namespace
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkData {
    pub id: String,
    pub name: String,
    pub image_data: String,
    pub color_history: Vec<Color>,
    pub current_color: Option<Color>,
    pub dominant_colors: Vec<Color>,
    #[serde(with = "iso_millis")]
    pub saved_at: DateTime<Utc>,
}

impl WorkData {
    /// Merge generated fields into caller-supplied work
    pub fn from_new(work: NewWork, id: String, saved_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: work.name,
            image_data: work.image_data,
            color_history: work.color_history,
            current_color: work.current_color,
            dominant_colors: work.dominant_colors,
            saved_at,
        }
    }
}

/// `savedAt` is written as `YYYY-MM-DDTHH:MM:SS.sssZ` and read as any RFC 3339 timestamp
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}
