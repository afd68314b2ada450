use super::Family;
use std::borrow::Cow;

/// Result of classifying a User-Agent string.
///
/// `None` is the only "unset" marker: a field is `None` when its capture group
/// did not take part in the match, never `0` or an empty string. The one
/// exception is `name`, which is `Some("")` when a family was detected but its
/// name could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo<'a> {
    pub family: Family,
    pub name: Option<Cow<'a, str>>,
    pub version_major: Option<u32>,
    pub version_minor: Option<u32>,
    /// Trailing version component as it appears in the UA. For Chrome this is
    /// the whole build string, e.g. `1985.125`.
    pub version_etc: Option<Cow<'a, str>>,
}

impl<'a> DeviceInfo<'a> {
    pub fn unknown() -> Self {
        Self {
            family: Family::Unknown,
            name: None,
            version_major: None,
            version_minor: None,
            version_etc: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.family == Family::Unknown
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version_etc(&self) -> Option<&str> {
        self.version_etc.as_deref()
    }

    pub fn into_owned(self) -> DeviceInfo<'static> {
        DeviceInfo {
            family: self.family,
            name: self.name.map(|n| Cow::Owned(n.into_owned())),
            version_major: self.version_major,
            version_minor: self.version_minor,
            version_etc: self.version_etc.map(|e| Cow::Owned(e.into_owned())),
        }
    }
}
