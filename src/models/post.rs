//! Post model as returned by the backend

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

/// A post, mirrored read-only from the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Backend ID
    pub id: i64,
    /// Author's user ID
    #[serde(default)]
    pub user_id: i64,
    /// Post text
    #[serde(default)]
    pub content: String,
    /// Visible to anonymous users
    #[serde(default, alias = "public")]
    pub is_public: bool,
    /// Kind of attached media
    #[serde(default)]
    pub media_type: MediaType,
    /// URL of the attached media
    #[serde(default)]
    pub media_url: Option<String>,
    /// Short media description / caption
    #[serde(default)]
    pub description: Option<String>,
    /// Creation timestamp, as sent by the server
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp, as sent by the server
    #[serde(default)]
    pub updated_at: String,
}

/// Media attached to a post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum MediaType {
    /// No media
    #[default]
    None,
    /// Image (JPEG, PNG, GIF, WebP)
    Image,
    /// Video (MP4, WebM)
    Video,
}

impl MediaType {
    /// Wire name used in multipart forms
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Parse a media type name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Some(Self::None),
            "image" | "img" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    /// Next type in picker order
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Image,
            Self::Image => Self::Video,
            Self::Video => Self::None,
        }
    }

    /// Previous type in picker order
    #[must_use]
    pub fn prev(self) -> Self {
        match self {
            Self::None => Self::Video,
            Self::Image => Self::None,
            Self::Video => Self::Image,
        }
    }
}

impl From<Option<String>> for MediaType {
    fn from(value: Option<String>) -> Self {
        value
            .as_deref()
            .and_then(Self::from_str)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Post {
    /// Whether the post was changed after creation.
    ///
    /// There is no dedicated flag; differing timestamps are the only signal.
    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }

    /// "Public" or "Private"
    pub const fn visibility_label(&self) -> &'static str {
        if self.is_public { "Public" } else { "Private" }
    }

    /// Media URL, if the post carries displayable media
    pub fn media(&self) -> Option<(MediaType, &str)> {
        match (self.media_type, self.media_url.as_deref()) {
            (MediaType::None, _) | (_, None | Some("")) => None,
            (kind, Some(url)) => Some((kind, url)),
        }
    }

    /// Creation time formatted for display in local time.
    ///
    /// Accepts RFC 3339 and zone-less ISO timestamps; anything else is shown as-is.
    pub fn display_time(&self) -> String {
        format_timestamp(&self.created_at)
    }

    /// Get a short single-line preview of the content
    pub fn preview(&self, max_width: usize) -> String {
        let content = self.content.replace('\n', " ");
        let mut width = 0;
        let mut out = String::new();
        for c in content.chars() {
            let w = c.width().unwrap_or(0);
            if width + w > max_width.saturating_sub(3) {
                out.push_str("...");
                return out;
            }
            width += w;
            out.push(c);
        }
        out
    }
}

fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    raw.to_string()
}
