//! Storage path naming
//!
//! Every blob lands at `<folder>/<prefix><millis>_<uuid>.<ext>`, where the
//! folder is derived from the product name.

use chrono::Utc;
use uuid::Uuid;

/// Folder used when no usable product name is supplied.
pub const FALLBACK_FOLDER: &str = "products";

/// Which stored copy of an image a blob holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Unmodified bytes of the main image.
    Original,
    /// Resized copy of the main image.
    Thumbnail,
    /// Unmodified bytes of any image after the first.
    Additional,
}

impl Variant {
    pub fn prefix(self) -> &'static str {
        match self {
            Variant::Original => "original_",
            Variant::Thumbnail => "resized_500x500_",
            Variant::Additional => "additional_",
        }
    }
}

/// Lower-case the name, hyphenate anything outside `[a-z0-9-_]`, and collapse
/// hyphen runs.
pub fn folder_for_product(product_name: Option<&str>) -> String {
    let Some(name) = product_name else {
        return FALLBACK_FOLDER.to_string();
    };

    let mut folder = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            c
        } else {
            '-'
        };
        if c == '-' && (folder.is_empty() || folder.ends_with('-')) {
            continue;
        }
        folder.push(c);
    }

    let folder = folder.trim_end_matches('-');
    if folder.is_empty() {
        FALLBACK_FOLDER.to_string()
    } else {
        folder.to_string()
    }
}

pub fn extension_for_content_type(content_type: &str) -> &'static str {
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("png") {
        "png"
    } else if content_type.contains("webp") {
        "webp"
    } else if content_type.contains("svg") {
        "svg"
    } else {
        "jpg"
    }
}

/// Build a fresh, collision-resistant blob path.
pub fn blob_path(folder: &str, variant: Variant, extension: &str) -> String {
    format!(
        "{}/{}{}_{}.{}",
        folder,
        variant.prefix(),
        Utc::now().timestamp_millis(),
        Uuid::new_v4(),
        extension
    )
}
