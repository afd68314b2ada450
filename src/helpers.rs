use std::borrow::Cow;

/// Lowercase a name, borrowing when it is already lowercase.
pub(crate) fn lowercase(s: Cow<'_, str>) -> Cow<'_, str> {
    if s.chars().any(char::is_uppercase) {
        Cow::Owned(s.to_lowercase())
    } else {
        s
    }
}

/// Parse a numeric version component; anything but plain digits is unset.
pub(crate) fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
