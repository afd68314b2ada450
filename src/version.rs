use std::borrow::Cow;

use fancy_regex::Regex;

use super::db;
use super::error::Result;
use super::helpers::{lowercase, parse_component};
use super::substitution::{substitute, substitute_field};
use super::types::{DeviceInfo, Family};

/// One extraction pattern plus its field templates.
pub(crate) struct ExtractRule {
    regex: Regex,
    name: Option<String>,
    major: Option<String>,
    minor: Option<String>,
    etc: Option<String>,
}

/// Name and version extraction for a single family.
pub(crate) struct VersionExtractor {
    fallback_name: String,
    rules: Vec<ExtractRule>,
}

impl VersionExtractor {
    pub fn build(fallback_name: String, entries: Vec<db::ExtractEntry>) -> Result<Self> {
        let rules = entries
            .into_iter()
            .map(|e| {
                Ok(ExtractRule {
                    regex: Regex::new(&e.regex)?,
                    name: e.name,
                    major: e.major,
                    minor: e.minor,
                    etc: e.etc,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            fallback_name,
            rules,
        })
    }

    /// Build the record for a UA already known to belong to `family`.
    ///
    /// Never fails: when no pattern matches, the record carries the family
    /// with the fallback name and no version.
    pub fn extract<'a>(&'a self, family: Family, ua: &'a str) -> DeviceInfo<'a> {
        for rule in &self.rules {
            let captures = match rule.regex.captures(ua) {
                Ok(Some(c)) => c,
                _ => continue,
            };
            let field = |tpl: &'a Option<String>| {
                tpl.as_deref()
                    .and_then(|t| substitute_field(t, &captures))
            };
            let name = match &rule.name {
                Some(tpl) => substitute(tpl, &captures),
                None => Cow::Borrowed(self.fallback_name.as_str()),
            };
            return DeviceInfo {
                family,
                name: Some(lowercase(name)),
                version_major: field(&rule.major).and_then(|v| parse_component(&v)),
                version_minor: field(&rule.minor).and_then(|v| parse_component(&v)),
                version_etc: field(&rule.etc),
            };
        }

        DeviceInfo {
            family,
            name: Some(lowercase(Cow::Borrowed(self.fallback_name.as_str()))),
            version_major: None,
            version_minor: None,
            version_etc: None,
        }
    }
}
