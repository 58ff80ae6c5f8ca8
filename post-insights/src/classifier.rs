use crate::types::{PostFormat, RawItem, Record};
use crate::utils::json;
use serde_json::Value;

pub struct FormatClassifier;

impl FormatClassifier {
    /// Pick the media format of a post. Rules are checked in order and the
    /// first match wins:
    ///
    /// 1. `isReel` flag set: Reel
    /// 2. first attachment type mentions "video": Video
    /// 3. first attachment type mentions "photo" or "image": Image
    /// 4. `videoUrl` present: Video
    /// 5. record has text: Text Only
    /// 6. otherwise: Link/Shared
    pub fn classify(record: &Record, item: &RawItem) -> PostFormat {
        if json::is_truthy(item.get("isReel")) {
            return PostFormat::Reel;
        }

        if let Some(media_type) = first_attachment_type(item) {
            if media_type.contains("video") {
                return PostFormat::Video;
            }
            if media_type.contains("photo") || media_type.contains("image") {
                return PostFormat::Image;
            }
        }

        if json::is_truthy(item.get("videoUrl")) {
            return PostFormat::Video;
        }

        if !record.text.is_empty() {
            return PostFormat::TextOnly;
        }

        PostFormat::LinkShared
    }

    /// Validated record with its format filled in.
    pub fn apply(mut record: Record, item: &RawItem) -> Record {
        record.format = Self::classify(&record, item);
        record
    }
}

/// Lowercased `type` of the first attachment, e.g. `photo` or `video_inline`.
fn first_attachment_type(item: &RawItem) -> Option<String> {
    match item.get("attachments") {
        Some(Value::Array(attachments)) => attachments
            .first()
            .and_then(|attachment| attachment.get("type"))
            .and_then(Value::as_str)
            .map(str::to_lowercase),
        _ => None,
    }
}
