//! Limits applied to property-photo uploads.

use crate::CoreError;

/// Maximum accepted photo size: 5 MiB.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Accept only `image/*` mime types.
///
/// # Errors
///
/// Returns [`CoreError::UnsupportedMediaType`] when the type is missing or
/// not an image.
pub fn validate_photo_content_type(content_type: Option<&str>) -> Result<(), CoreError> {
    let Some(raw) = content_type else {
        return Err(CoreError::UnsupportedMediaType("missing".to_string()));
    };
    let essence = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.split_once('/') {
        Some(("image", subtype)) if !subtype.is_empty() => Ok(()),
        _ => Err(CoreError::UnsupportedMediaType(raw.to_string())),
    }
}

/// # Errors
///
/// Returns [`CoreError::PhotoTooLarge`] when `len` exceeds [`MAX_PHOTO_BYTES`],
/// or [`CoreError::EmptyPhoto`] for a zero-length upload.
pub fn validate_photo_size(len: usize) -> Result<(), CoreError> {
    if len == 0 {
        return Err(CoreError::EmptyPhoto);
    }
    if len > MAX_PHOTO_BYTES {
        return Err(CoreError::PhotoTooLarge {
            size: len,
            limit: MAX_PHOTO_BYTES,
        });
    }
    Ok(())
}
