use aho_corasick::AhoCorasick;

use super::db;
use super::error::Result;
use super::types::Family;

/// Token-level signature of a family.
///
/// A UA carries the signature when it contains any of the tokens. Whether the
/// family actually matches is decided by the detector, which also checks that
/// none of the `unless` families match (see `DeviceDetect::matches`).
pub(crate) struct Signature {
    tokens: AhoCorasick,
    pub unless: Vec<Family>,
}

impl Signature {
    pub fn build(detect: &db::DetectEntry, unless: Vec<Family>) -> Result<Self> {
        let tokens = AhoCorasick::builder()
            .ascii_case_insensitive(detect.case_insensitive)
            .build(&detect.tokens)?;
        Ok(Self { tokens, unless })
    }

    pub fn contains_token(&self, ua: &str) -> bool {
        self.tokens.is_match(ua)
    }
}
