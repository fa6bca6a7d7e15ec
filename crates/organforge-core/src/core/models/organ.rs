use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganType {
    Heart,
    Liver,
    Kidney,
    Ear,
}

static ORGAN_NAMES: Map<&'static str, OrganType> = phf_map! {
    "heart" => OrganType::Heart,
    "liver" => OrganType::Liver,
    "kidney" => OrganType::Kidney,
    "ear" => OrganType::Ear,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unsupported organ type '{0}'")]
pub struct ParseOrganTypeError(pub String);

impl OrganType {
    pub const ALL: [OrganType; 4] = [
        OrganType::Heart,
        OrganType::Liver,
        OrganType::Kidney,
        OrganType::Ear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrganType::Heart => "heart",
            OrganType::Liver => "liver",
            OrganType::Kidney => "kidney",
            OrganType::Ear => "ear",
        }
    }
}

impl FromStr for OrganType {
    type Err = ParseOrganTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ORGAN_NAMES
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| ParseOrganTypeError(s.to_string()))
    }
}

impl fmt::Display for OrganType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
