use serde::Deserialize;
use std::fmt;

/// Top-level device or browser category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Android,
    Ios,
    WindowsPhone,
    Docomo,
    Kddi,
    Softbank,
    Willcom,
    Ie,
    Chrome,
    Firefox,
    Safari,
    Opera,
    Unknown,
}

impl Family {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "android" => Some(Self::Android),
            "ios" => Some(Self::Ios),
            "windows phone" | "windows_phone" => Some(Self::WindowsPhone),
            "docomo" => Some(Self::Docomo),
            "kddi" => Some(Self::Kddi),
            "softbank" => Some(Self::Softbank),
            "willcom" => Some(Self::Willcom),
            "ie" => Some(Self::Ie),
            "chrome" => Some(Self::Chrome),
            "firefox" => Some(Self::Firefox),
            "safari" => Some(Self::Safari),
            "opera" => Some(Self::Opera),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::WindowsPhone => "windows phone",
            Self::Docomo => "docomo",
            Self::Kddi => "kddi",
            Self::Softbank => "softbank",
            Self::Willcom => "willcom",
            Self::Ie => "ie",
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Safari => "safari",
            Self::Opera => "opera",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority group a family is classified in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Smartphone,
    /// Japanese carrier feature phones.
    Carrier,
    PcBrowser,
}

impl Tier {
    /// Order in which tiers are tried by the classifier.
    pub const ORDER: [Tier; 3] = [Tier::Smartphone, Tier::Carrier, Tier::PcBrowser];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smartphone => "smartphone",
            Self::Carrier => "carrier",
            Self::PcBrowser => "pc browser",
        }
    }
}
