use indexmap::IndexMap;
use serde::Deserialize;

use super::capability::Threshold;
use super::types::{Family, Tier};

// ---------------------------------------------------------------------------
// Rule file  (rules/device_detect.yml)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RuleFile {
    /// Uses IndexMap to preserve YAML insertion order (first-match-wins
    /// inside a tier).
    pub families: IndexMap<Family, FamilyEntry>,
    #[serde(default)]
    pub capabilities: CapabilityEntries,
}

// ---------------------------------------------------------------------------
// Families
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct FamilyEntry {
    #[serde(default)]
    pub tier: Option<Tier>,
    pub detect: DetectEntry,
    #[serde(default)]
    pub unless: Vec<Family>,
    /// Name reported when none of the `extract` patterns match.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub extract: Vec<ExtractEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetectEntry {
    pub tokens: Vec<String>,
    #[serde(default)]
    pub case_insensitive: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExtractEntry {
    pub regex: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub minor: Option<String>,
    #[serde(default)]
    pub etc: Option<String>,
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CapabilityEntries {
    #[serde(default)]
    pub file_upload: CapabilityEntry,
    #[serde(default)]
    pub file_api: CapabilityEntry,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CapabilityEntry {
    #[serde(default)]
    pub deny: Vec<Family>,
    #[serde(default)]
    pub tiers: IndexMap<Tier, IndexMap<Family, Threshold>>,
}
