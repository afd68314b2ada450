use super::types::Family;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    YAML(#[from] serde_yaml::Error),
    #[error(transparent)]
    Regex(#[from] fancy_regex::Error),
    #[error(transparent)]
    AhoCorasick(#[from] aho_corasick::BuildError),
    #[error("rule for {family} refers to {referenced}, which has no rule")]
    MissingRule { family: Family, referenced: Family },
    #[error("capability {capability} refers to {referenced}, which has no rule")]
    MissingCapabilityRule {
        capability: &'static str,
        referenced: Family,
    },
    #[error("exclusion list of {0} refers back to itself")]
    ExclusionCycle(Family),
    #[error("`unknown` is reserved and cannot have a rule")]
    ReservedFamily,
    #[error("invalid version threshold {0:?}")]
    InvalidThreshold(String),
}

pub type Result<T> = std::result::Result<T, Error>;
