//! Helpers for the paste-the-redirect OAuth flow.

use url::Url;

/// Extracts an authorization code from whatever the user pasted after the
/// provider redirected them.
///
/// Accepts a full redirect URL, a raw query string containing `code=`, or a
/// bare code. Returns `None` when no code can be found.
pub fn parse_authorization_input(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(trimmed) {
        return url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned());
    }

    if trimmed.contains("code=") {
        return url::form_urlencoded::parse(trimmed.as_bytes())
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned());
    }

    Some(trimmed.to_string())
}
