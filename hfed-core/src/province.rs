use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A province or territory published by the HFED dataflows.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Serialize, Deserialize)]
pub enum Province {
    Newfoundland,
    PrinceEdwardIsland,
    NovaScotia,
    NewBrunswick,
    Quebec,
    Ontario,
    Alberta,
    Saskatchewan,
    BritishColumbia,
    Yukon,
}

/// Error returned when a province name is not part of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown province: {0}")]
pub struct UnknownProvince(pub String);

impl Province {
    /// All provinces in selector order.
    pub const ALL: [Province; 10] = [
        Province::Newfoundland,
        Province::PrinceEdwardIsland,
        Province::NovaScotia,
        Province::NewBrunswick,
        Province::Quebec,
        Province::Ontario,
        Province::Alberta,
        Province::Saskatchewan,
        Province::BritishColumbia,
        Province::Yukon,
    ];

    /// Display name, also the key used by the dashboard selector.
    pub fn name(&self) -> &'static str {
        match self {
            Province::Newfoundland => "Newfoundland",
            Province::PrinceEdwardIsland => "Prince Edward Island",
            Province::NovaScotia => "Nova Scotia",
            Province::NewBrunswick => "New Brunswick",
            Province::Quebec => "Quebec",
            Province::Ontario => "Ontario",
            Province::Alberta => "Alberta",
            Province::Saskatchewan => "Saskatchewan",
            Province::BritishColumbia => "British Columbia",
            Province::Yukon => "Yukon",
        }
    }

    /// SDMX dataflow identifier selecting this province's dataset.
    pub fn dataflow(&self) -> &'static str {
        match self {
            Province::Newfoundland => "DF_HFED_NL",
            Province::PrinceEdwardIsland => "DF_HFED_PE",
            Province::NovaScotia => "DF_HFED_NS",
            Province::NewBrunswick => "DF_HFED_NB",
            Province::Quebec => "DF_HFED_QC",
            Province::Ontario => "DF_HFED_ON",
            Province::Alberta => "DF_HFED_AB",
            Province::Saskatchewan => "DF_HFED_SK",
            Province::BritishColumbia => "DF_HFED_BC",
            Province::Yukon => "DF_HFED_YK",
        }
    }

    /// Value of the REFERENCE_AREA column for this province.
    pub fn ref_area(&self) -> &'static str {
        match self {
            Province::Newfoundland => "CA_NL",
            Province::PrinceEdwardIsland => "CA_PE",
            Province::NovaScotia => "CA_NS",
            Province::NewBrunswick => "CA_NB",
            Province::Quebec => "CA_QC",
            Province::Ontario => "CA_ON",
            Province::Alberta => "CA_AB",
            Province::Saskatchewan => "CA_SK",
            Province::BritishColumbia => "CA_BC",
            Province::Yukon => "CA_YK",
        }
    }

    /// Look up a province by display name or reference-area code, ignoring case.
    pub fn from_name(name: &str) -> Option<Province> {
        let wanted = name.trim();
        Province::ALL.into_iter().find(|p| {
            p.name().eq_ignore_ascii_case(wanted) || p.ref_area().eq_ignore_ascii_case(wanted)
        })
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Province {
    type Err = UnknownProvince;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Province::from_name(s).ok_or_else(|| UnknownProvince(s.to_string()))
    }
}
