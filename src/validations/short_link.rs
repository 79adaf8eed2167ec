use url::Url;
use validator::ValidationError;

/// Longest destination URL accepted for shortening
pub const MAX_URL_LENGTH: usize = 2048;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates that a URL string is a well-formed absolute http/https URL
pub fn validate_url(url_str: &str) -> Result<(), ValidationError> {
    if url_str.trim().is_empty() {
        return Err(invalid("url_required", "Original URL is required"));
    }

    if url_str.len() > MAX_URL_LENGTH {
        return Err(invalid(
            "url_too_long",
            "URL must be at most 2048 characters",
        ));
    }

    // The parser drops tabs and newlines silently, but the raw string is what
    // ends up in the Location header
    if url_str.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(invalid(
            "url_whitespace",
            "URL must not contain whitespace or control characters",
        ));
    }

    let url = Url::parse(url_str).map_err(|_| invalid("url_format", "Invalid URL format"))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("url_scheme", "URL scheme must be http or https"));
    }

    if url.host().is_none() {
        return Err(invalid("url_host", "URL must have a host"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        // Valid URLs
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/path?query=value").is_ok());
        assert!(validate_url("https://example.com/a/b#frag").is_ok());

        // Invalid URLs
        assert!(validate_url("").is_err());
        assert!(validate_url("   ").is_err());
        assert!(validate_url("not-a-url").is_err());
        assert!(validate_url("/relative/path").is_err());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("javascript:alert(1)").is_err());
    }

    #[test]
    fn test_validate_url_length() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        let err = validate_url(&long).unwrap_err();
        assert_eq!(err.code, "url_too_long");
    }

    #[test]
    fn test_validate_url_rejects_embedded_whitespace() {
        for input in [
            "https://example.com/a\nb",
            "https://example.com/a\tb",
            "https://example.com/a\r\nSet-Cookie: x=1",
            " https://example.com",
            "https://example.com/a b",
            "https://example.com/\u{7f}",
        ] {
            let err = validate_url(input).unwrap_err();
            assert_eq!(err.code, "url_whitespace", "accepted {:?}", input);
        }

        // Percent-encoded forms are fine
        assert!(validate_url("https://example.com/a%0Ab%20c").is_ok());
        assert!(validate_url("https://例え.jp/パス").is_ok());
    }
}
