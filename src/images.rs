use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

use crate::config::{max_post_image_bytes, ALLOWED_IMAGE_EXTENSIONS};
use crate::core::errors::SocialError;

/// An image picked in the composer, already encoded as a data URL.
#[derive(Deserialize, Clone, Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: String,
}

impl ImageUpload {
    /// Check type and size, returning the data URL to store on the post.
    pub fn into_post_image(self) -> Result<String, SocialError> {
        validate_post_image(&self, max_post_image_bytes())?;
        Ok(self.data)
    }
}

pub fn validate_post_image(upload: &ImageUpload, max_bytes: usize) -> Result<(), SocialError> {
    let payload = image_payload(&upload.data)
        .ok_or_else(|| SocialError::validation("Please select an image file!"))?;

    let extension = upload
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(SocialError::validation("Only PNG, JPG, or GIF images allowed!"));
    }

    let bytes = STANDARD
        .decode(payload.trim_end())
        .map_err(|_| SocialError::validation("Please select an image file!"))?;
    if bytes.len() > max_bytes {
        return Err(SocialError::validation(format!(
            "Image is too large! Max {}MB.",
            max_bytes / (1024 * 1024)
        )));
    }

    Ok(())
}

/// Avatars accept any image data URL or a plain image reference, with no size cap.
pub fn validate_avatar(image: &str) -> Result<(), SocialError> {
    let image = image.trim();
    if image.is_empty() {
        return Err(SocialError::validation("Please select an image file!"));
    }
    if image.starts_with("data:") && image_payload(image).is_none() {
        return Err(SocialError::validation("Please select an image file!"));
    }
    Ok(())
}

/// Base64 body of a `data:image/...;base64,` URL.
fn image_payload(data_url: &str) -> Option<&str> {
    let rest = data_url.strip_prefix("data:image/")?;
    let (header, payload) = rest.split_once(',')?;
    header.ends_with(";base64").then_some(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, data: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn accepts_allowed_extensions_case_insensitively() {
        for name in ["a.png", "b.JPG", "c.jpeg", "d.Gif"] {
            let img = upload(name, "data:image/png;base64,aGVsbG8=");
            assert!(validate_post_image(&img, 1024).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_other_extensions() {
        let img = upload("photo.webp", "data:image/webp;base64,aGVsbG8=");
        assert!(matches!(validate_post_image(&img, 1024), Err(SocialError::Validation(_))));
        let img = upload("noext", "data:image/png;base64,aGVsbG8=");
        assert!(validate_post_image(&img, 1024).is_err());
    }

    #[test]
    fn rejects_non_image_data() {
        let img = upload("a.png", "data:text/plain;base64,aGVsbG8=");
        assert!(validate_post_image(&img, 1024).is_err());
    }

    #[test]
    fn rejects_payload_that_is_not_base64() {
        let img = upload("a.png", "data:image/png;base64,!!!!not base64 at all");
        assert!(matches!(validate_post_image(&img, 1024), Err(SocialError::Validation(_))));
    }

    #[test]
    fn enforces_decoded_size_limit() {
        // "aGVsbG8=" decodes to 5 bytes
        let img = upload("a.png", "data:image/png;base64,aGVsbG8=");
        assert!(validate_post_image(&img, 5).is_ok());
        assert!(validate_post_image(&img, 4).is_err());
    }

    #[test]
    fn avatar_accepts_references_and_data_urls() {
        assert!(validate_avatar("../assets/img/me.png").is_ok());
        assert!(validate_avatar("data:image/png;base64,aGVsbG8=").is_ok());
        assert!(validate_avatar("data:text/html,<b>").is_err());
        assert!(validate_avatar("   ").is_err());
    }
}
