use indexmap::IndexMap;
use serde::Deserialize;

use super::db;
use super::device_detect::DeviceDetect;
use super::error::{Error, Result};
use super::helpers::parse_component;
use super::types::{DeviceInfo, Family, Tier};

/// Minimum `major[.minor]` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub(crate) struct Threshold {
    pub major: u32,
    pub minor: Option<u32>,
}

impl Threshold {
    /// Unset fields never meet a threshold.
    pub fn is_met_by(&self, info: &DeviceInfo<'_>) -> bool {
        match info.version_major {
            Some(major) if major > self.major => true,
            Some(major) if major == self.major => match self.minor {
                None => true,
                Some(required) => info.version_minor.is_some_and(|minor| minor >= required),
            },
            _ => false,
        }
    }
}

impl TryFrom<String> for Threshold {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        let (major, minor) = match s.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (s.as_str(), None),
        };
        let invalid = || Error::InvalidThreshold(s.clone());
        let major = parse_component(major.trim()).ok_or_else(invalid)?;
        let minor = match minor {
            Some(m) => Some(parse_component(m.trim()).ok_or_else(invalid)?),
            None => None,
        };
        Ok(Self { major, minor })
    }
}

/// A capability granted per tier and family, subject to a deny list.
#[derive(Debug, Clone, Default)]
pub(crate) struct CapabilityRule {
    /// Families that never have the capability, checked on the raw UA
    /// independently of the classification result.
    deny: Vec<Family>,
    tiers: IndexMap<Tier, IndexMap<Family, Threshold>>,
}

impl CapabilityRule {
    pub fn from_entry(entry: db::CapabilityEntry) -> Self {
        Self {
            deny: entry.deny,
            tiers: entry.tiers,
        }
    }

    /// Every family this rule names, for validation against the loaded rows.
    pub fn referenced_families(&self) -> impl Iterator<Item = Family> + '_ {
        self.deny
            .iter()
            .copied()
            .chain(self.tiers.values().flat_map(|t| t.keys().copied()))
    }

    pub fn allows(&self, detector: &DeviceDetect, ua: &str) -> bool {
        if self.deny.iter().any(|&family| detector.matches(family, ua)) {
            return false;
        }
        for tier in Tier::ORDER {
            let Some(thresholds) = self.tiers.get(&tier) else {
                continue;
            };
            if let Some(info) = detector.tier_info(tier, ua) {
                return thresholds
                    .get(&info.family)
                    .is_some_and(|threshold| threshold.is_met_by(&info));
            }
        }
        false
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Capabilities {
    pub file_upload: CapabilityRule,
    pub file_api: CapabilityRule,
}

impl Capabilities {
    pub fn from_entries(entries: db::CapabilityEntries) -> Self {
        Self {
            file_upload: CapabilityRule::from_entry(entries.file_upload),
            file_api: CapabilityRule::from_entry(entries.file_api),
        }
    }
}
