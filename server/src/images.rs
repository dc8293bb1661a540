use crate::config;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fs;
use std::io;
use uuid::Uuid;

/// Image decoded from an inline `data:` URI.
pub struct DecodedImage {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Parses a `data:image/<format>;base64,<payload>` URI.
pub fn parse_data_uri(uri: &str) -> Result<DecodedImage, String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| "Expected a data: URI.".to_string())?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| "Expected base64-encoded image data.".to_string())?;
    let extension = match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => return Err(format!("Unsupported image type {:?}.", mime)),
    };
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|_| "Invalid base64 image data.".to_string())?;
    if bytes.is_empty() {
        return Err("Image data is empty.".to_string());
    }
    Ok(DecodedImage { extension, bytes })
}

/// Writes the image under MEDIA_ROOT/<subdir>/ with a random filename and
/// returns the stored path relative to MEDIA_ROOT.
pub fn save_image(subdir: &str, image: &DecodedImage) -> io::Result<String> {
    let relative = format!("{}/{}.{}", subdir, Uuid::new_v4(), image.extension);
    let full = config::MEDIA_ROOT.join(&relative);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&full, &image.bytes)?;
    Ok(relative)
}

/// Best-effort removal of a stored image; replaced or orphaned files are not
/// worth failing a request over.
pub fn delete_image(relative: &str) {
    let _ = fs::remove_file(config::MEDIA_ROOT.join(relative));
}

/// Absolute URL for a stored media path.
pub fn media_url(relative: &str) -> String {
    format!("{}/media/{}", *config::BASE_URL, relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG_B64: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_parse_png_data_uri() {
        let uri = format!("data:image/png;base64,{}", PNG_B64);
        let image = parse_data_uri(&uri).unwrap();
        assert_eq!(image.extension, "png");
        assert!(!image.bytes.is_empty());
    }

    #[test]
    fn test_parse_jpeg_alias() {
        let uri = format!("data:image/jpg;base64,{}", PNG_B64);
        assert_eq!(parse_data_uri(&uri).unwrap().extension, "jpg");
    }

    #[test]
    fn test_rejects_non_data_uri() {
        assert!(parse_data_uri("https://example.com/x.png").is_err());
    }

    #[test]
    fn test_rejects_unsupported_mime() {
        let uri = format!("data:application/pdf;base64,{}", PNG_B64);
        assert!(parse_data_uri(&uri).is_err());
    }

    #[test]
    fn test_rejects_bad_base64() {
        assert!(parse_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_rejects_empty_payload() {
        assert!(parse_data_uri("data:image/png;base64,").is_err());
    }
}
