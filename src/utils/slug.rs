use chrono::Utc;
use sha2::{Digest, Sha256};

/// Length of every generated slug
pub const SLUG_LENGTH: usize = 9;

const DIGEST_PREFIX_LEN: usize = 6;
const RANDOM_SUFFIX_LEN: usize = 4;

/// Generates a slug for `original_url`.
///
/// The slug is the first 6 hex characters of `sha256(url + unix_millis)`
/// followed by random characters from the nanoid alphabet (`A-Za-z0-9_-`),
/// cut to [`SLUG_LENGTH`]. Two calls for the same URL yield different slugs;
/// uniqueness against stored links is left to the caller.
pub fn generate_slug(original_url: &str) -> String {
    generate_slug_at(original_url, Utc::now().timestamp_millis())
}

fn generate_slug_at(original_url: &str, timestamp_millis: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(original_url.as_bytes());
    hasher.update(timestamp_millis.to_string().as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    let mut slug = String::with_capacity(DIGEST_PREFIX_LEN + RANDOM_SUFFIX_LEN);
    slug.push_str(&digest[..DIGEST_PREFIX_LEN]);
    slug.push_str(&nanoid::nanoid!(RANDOM_SUFFIX_LEN));
    slug.truncate(SLUG_LENGTH);
    slug
}

/// Whether `slug` has the shape produced by [`generate_slug`]
#[cfg(test)]
pub fn is_well_formed(slug: &str) -> bool {
    slug.len() == SLUG_LENGTH
        && slug
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_slug_shape() {
        for url in [
            "https://example.com/a/b",
            "http://localhost:3000/?q=1&r=2",
            "https://例え.jp/パス",
        ] {
            let slug = generate_slug(url);
            assert_eq!(slug.len(), SLUG_LENGTH);
            assert!(is_well_formed(&slug), "unexpected slug {}", slug);
        }
    }

    #[test]
    fn test_prefix_is_digest_of_url_and_timestamp() {
        let slug = generate_slug_at("https://example.com/a/b", 1_700_000_000_000);

        let expected = format!(
            "{:x}",
            Sha256::digest("https://example.com/a/b1700000000000".as_bytes())
        );
        assert_eq!(&slug[..DIGEST_PREFIX_LEN], &expected[..DIGEST_PREFIX_LEN]);
        assert!(slug[..DIGEST_PREFIX_LEN]
            .bytes()
            .all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    #[test]
    fn test_same_url_gives_distinct_slugs() {
        let slugs: HashSet<String> = (0..200)
            .map(|_| generate_slug("https://example.com/a/b"))
            .collect();
        // 64^3 random tail within the same millisecond; a handful of repeats is tolerable
        assert!(slugs.len() > 190);
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("a1b2c3_-Z"));
        assert!(!is_well_formed("short"));
        assert!(!is_well_formed("a1b2c3/-Z"));
        assert!(!is_well_formed("a1b2c3_-Z0"));
    }
}
