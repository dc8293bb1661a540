use std::path::PathBuf;
use std::sync::LazyLock;

/// Absolute URL prefix used when building links returned by the API
/// (short links, image URLs, pagination links).
pub static BASE_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("BASE_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
});

/// Directory uploaded images are written to; served under /media.
pub static MEDIA_ROOT: LazyLock<PathBuf> = LazyLock::new(|| {
    std::env::var("MEDIA_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("media"))
});

/// Secret keying the short-link codec.
pub static SECRET_KEY: LazyLock<String> =
    LazyLock::new(|| std::env::var("SECRET_KEY").expect("SECRET_KEY must be set"));
