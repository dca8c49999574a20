//! Multipart body for creating and editing posts

use std::path::PathBuf;

use super::MediaType;

/// Fields sent to `POST /posts` and `PUT /posts/{id}`.
///
/// Optional fields are only sent when present; deciding which ones to fill
/// is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    /// Post text (already trimmed and non-empty)
    pub content: String,
    /// Visibility flag
    pub is_public: bool,
    /// Media type; `none` is never sent
    pub media_type: MediaType,
    /// Local file to upload as `media`
    pub media: Option<PathBuf>,
    /// Media description
    pub description: Option<String>,
}

impl PostDraft {
    /// Plain-text multipart fields, in send order
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("content", self.content.clone()),
            ("isPublic", self.is_public.to_string()),
        ];
        if let Some(description) = &self.description {
            fields.push(("description", description.clone()));
        }
        if self.media_type != MediaType::None {
            fields.push(("mediaType", self.media_type.as_str().to_string()));
        }
        fields
    }
}

/// Best-effort MIME type for an upload, from its extension
pub fn guess_mime(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => return None,
    };
    Some(mime)
}
