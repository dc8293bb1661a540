use crate::config;
use harsh::Harsh;
use std::sync::LazyLock;

/// Minimum length of generated short-link tokens.
pub const MIN_TOKEN_LENGTH: usize = 6;

/// Reversible recipe-id <-> token codec for shareable short links.
///
/// Tokens are hashids keyed by the server secret, so ids are not guessable
/// from a token and stale tokens keep resolving after restarts.
pub struct ShortLinkCodec {
    harsh: Harsh,
}

impl ShortLinkCodec {
    pub fn new(salt: &str) -> Self {
        let harsh = Harsh::builder()
            .salt(salt)
            .length(MIN_TOKEN_LENGTH)
            .build()
            .expect("Failed to build short link codec");
        Self { harsh }
    }

    pub fn encode(&self, id: i32) -> String {
        self.harsh.encode(&[id as u64])
    }

    /// Returns None for malformed tokens and for tokens that do not decode
    /// to exactly one id.
    pub fn decode(&self, token: &str) -> Option<i32> {
        let ids = self.harsh.decode(token).ok()?;
        match ids.as_slice() {
            [id] => i32::try_from(*id).ok(),
            _ => None,
        }
    }
}

pub static CODEC: LazyLock<ShortLinkCodec> =
    LazyLock::new(|| ShortLinkCodec::new(&config::SECRET_KEY));

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> ShortLinkCodec {
        ShortLinkCodec::new("test salt")
    }

    #[test]
    fn test_round_trip() {
        let codec = codec();
        for id in [1, 2, 42, 1000, i32::MAX] {
            assert_eq!(codec.decode(&codec.encode(id)), Some(id));
        }
    }

    #[test]
    fn test_minimum_token_length() {
        let codec = codec();
        assert!(codec.encode(1).len() >= MIN_TOKEN_LENGTH);
    }

    #[test]
    fn test_garbage_never_panics() {
        let codec = codec();
        assert_eq!(codec.decode(""), None);
        assert_eq!(codec.decode("!!!"), None);
        assert_eq!(codec.decode("наборбукв"), None);
        // Plausible-looking but unkeyed tokens decode to None or some valid id
        let _ = codec.decode("abcdef");
    }

    #[test]
    fn test_tokens_depend_on_salt() {
        let a = ShortLinkCodec::new("salt a");
        let b = ShortLinkCodec::new("salt b");
        assert_ne!(a.encode(7), b.encode(7));
    }
}
