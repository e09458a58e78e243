use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use md5::{Digest, Md5};

/// Length every link identifier is truncated to
pub const LINK_ID_LEN: usize = 9;

/// Derives the short identifier for a link as a pure function of the
/// original URL and the owning user id.
///
/// The two inputs are concatenated without a separator and digested with
/// MD5 - collision resistance is not a security property here, the digest
/// only has to spread ids uniformly over the short-code space. The digest
/// is rendered in the URL-safe base64 alphabet and truncated to
/// `LINK_ID_LEN` characters. Because the owning user id participates in
/// the digest, two accounts shortening the same URL never contend for the
/// same id; the same account re-shortening the same URL always lands on
/// the id it already owns.
pub fn derive_link_id(original_url: &str, user_id: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(original_url.as_bytes());
    hasher.update(user_id.as_bytes());
    let digest = hasher.finalize();

    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(LINK_ID_LEN);
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let first = derive_link_id("https://example.com/some/long/path", "user-1");
        let second = derive_link_id("https://example.com/some/long/path", "user-1");

        assert_eq!(first, second);
    }

    #[test]
    fn test_known_digests() {
        // Cross-checked against the md5 / base64url reference implementations
        assert_eq!(
            derive_link_id("https://example.com/some/long/path", "user-1"),
            "opVvlvdtU"
        );
        assert_eq!(derive_link_id("https://rust-lang.org", "42"), "D0gX-NTTw");
        assert_eq!(derive_link_id("abc", ""), "kAFQmDzST");
    }

    #[test]
    fn test_ids_are_exactly_nine_characters() {
        for (url, user_id) in [
            ("https://example.com", "user-1"),
            ("", "user-1"),
            ("a", ""),
            ("https://example.com/with?query=string&and=more", "user-2"),
        ] {
            assert_eq!(derive_link_id(url, user_id).len(), LINK_ID_LEN);
        }
    }

    #[test]
    fn test_ids_use_the_url_safe_alphabet() {
        let id = derive_link_id("https://example.com/some/long/path", "user-1");

        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_different_owners_get_different_ids_for_the_same_url() {
        let first = derive_link_id("https://example.com/some/long/path", "user-1");
        let second = derive_link_id("https://example.com/some/long/path", "user-2");

        assert_ne!(first, second);
    }
}
