//! Secondary filter dimension (counterpart area or generator) per selection.
//!
//! Rules are checked in declaration order per province; the first matching
//! rule wins. No match means the selection has no secondary filter.

use crate::{
    catalog::ONTARIO_GENERATOR_VARIABLES,
    observation::{columns, Row},
    province::Province,
};
use serde::Serialize;

pub const COUNTERPART_LABEL: &str = "Counterpart area";
pub const GENERATOR_LABEL: &str = "Generator";

/// A resolved secondary filter: display label and ordered option codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SecondaryFilter {
    pub label: &'static str,
    pub options: &'static [&'static str],
}

impl SecondaryFilter {
    /// Option selected when the filter first appears.
    pub fn default_option(&self) -> Option<&'static str> {
        self.options.first().copied()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.options.contains(&value)
    }
}

/// One entry of a province's rule table.
#[derive(Debug)]
pub enum FilterRule {
    /// Variables in `codes` share one counterpart option list.
    Codes {
        codes: &'static [&'static str],
        options: &'static [&'static str],
    },
    /// Variables in `codes` are labelled "Generator"; the option list is picked
    /// by the first fragment contained in the variable code.
    Generators {
        codes: &'static [&'static str],
        by_fragment: &'static [(&'static str, &'static [&'static str])],
    },
}

impl FilterRule {
    fn apply(&self, variable: &str) -> Option<Option<SecondaryFilter>> {
        match *self {
            FilterRule::Codes { codes, options } => {
                if !codes.contains(&variable) {
                    return None;
                }
                Some(Some(SecondaryFilter {
                    label: COUNTERPART_LABEL,
                    options,
                }))
            }
            FilterRule::Generators { codes, by_fragment } => {
                if !codes.contains(&variable) {
                    return None;
                }
                let filter = by_fragment
                    .iter()
                    .find(|(fragment, _)| variable.contains(*fragment))
                    .map(|&(_, options)| SecondaryFilter {
                        label: GENERATOR_LABEL,
                        options,
                    });
                Some(filter)
            }
        }
    }
}

static NOVA_SCOTIA_RULES: &[FilterRule] = &[
    FilterRule::Codes {
        codes: &["EXPORT"],
        options: &["CA_NS_SD", "CA_NS_CB", "CA_NS_HL", "CA_NS_EB", "CA_NS"],
    },
    FilterRule::Codes {
        codes: &["IMPORT"],
        options: &["CA_NS_W", "CA_NS_OL", "CA_NS_V", "CA_NS_ML"],
    },
    FilterRule::Codes {
        codes: &["NSI"],
        options: &["CA_NS_MT", "CA_NS_OLS"],
    },
];

static NEW_BRUNSWICK_RULES: &[FilterRule] = &[FilterRule::Codes {
    codes: &["NSI"],
    options: &["CA_QC", "US_MPS", "CA_NS", "US_EMEC", "CA_PEI", "US_NE"],
}];

static ALBERTA_RULES: &[FilterRule] = &[FilterRule::Codes {
    codes: &["NSI"],
    options: &["CA_SK", "US_MT", "CA_BC"],
}];

static BRITISH_COLUMBIA_RULES: &[FilterRule] = &[FilterRule::Codes {
    codes: &["NSI"],
    options: &["US", "CA_AB"],
}];

static QUEBEC_RULES: &[FilterRule] = &[
    FilterRule::Codes {
        // The catalog publishes institutional consumption as EINSTITUTIONNEL.
        // Listing it next to INSTITUTIONNEL deliberately gives that variable
        // the regional filter the other sectors get.
        codes: &[
            "AGRICOLE",
            "COMMERCIAL",
            "INDUSTRIEL",
            "INSTITUTIONNEL",
            "EINSTITUTIONNEL",
            "RESIDENTIEL",
        ],
        options: &[
            "CA_ABITIBI_TEMISCAMINGUE",
            "CA_BAS_SAINT_LAURENT",
            "CA_CAPITALE_NATIONALE",
            "CA_CENTRE_DU_QUEBEC",
            "CA_CHAUDIERE_APPALACHES",
            "CA_COTE_NORD",
            "CA_ESTRIE",
            "CA_GASPESIE_ILES_DE_LA_MADELEINE",
            "CA_LANAUDIERE",
            "CA_LAURENTIDES",
            "CA_LAVAL",
            "CA_MAURICIE",
            "CA_MONTEREGIE",
            "CA_MONTREAL",
            "CA_NORD_DU_QUEBEC",
            "CA_OUTAOUAIS",
            "CA_SAGUENAY_LAC_SAINT_JEAN",
        ],
    },
    FilterRule::Codes {
        codes: &[
            "EXPORT",
            "IMPORT_GAS",
            "IMPORT_HYDRO",
            "IMPORT_NUCLEAR",
            "IMPORT_TOTAL",
            "IMPORT_UNKNOWN",
            "IMPORT_WIND",
        ],
        options: &["CA_NEW_BRUNSWICK", "CA_NY", "CA_ON", "US_NE"],
    },
];

const ONTARIO_BIOFUEL: &[&str] = &["CA_ATIKOKAN_G1", "CA_CALSTOCKGS", "CA_TBAYBOWATER_CTS"];

const ONTARIO_GAS: &[&str] = &[
    "CA_BRIGHTON_BEACH",
    "CA_CARDINAL",
    "CA_COCHRANECGS",
    "CA_DESTEC",
    "CA_DOWCHEMICAL",
    "CA_DPNTMTLND",
    "CA_EAST_WINDSOR_G1",
    "CA_EAST_WINDSOR_G2",
    "CA_GREENFIELD_ENERGY_CENTRE_G1",
    "CA_GREENFIELD_ENERGY_CENTRE_G2",
    "CA_GREENFIELD_ENERGY_CENTRE_G3",
    "CA_GREENFIELD_ENERGY_CENTRE_G4",
    "CA_GREENFIELD_SOUTH_G1",
    "CA_GREENFIELD_SOUTH_G2",
    "CA_GTAA_G1",
    "CA_GTAA_G2",
    "CA_GTAA_G3",
    "CA_HALTONHILLS_LT_G1",
    "CA_HALTONHILLS_LT_G2",
    "CA_HALTONHILLS_LT_G3",
    "CA_KAPGS",
    "CA_LAKESUPERIOR",
    "CA_LENNOX_G1",
    "CA_LENNOX_G2",
    "CA_LENNOX_G3",
    "CA_LENNOX_G4",
    "CA_NAPANEE_G1",
    "CA_NAPANEE_G2",
    "CA_NAPANEE_G3",
    "CA_NIPIGONGS",
    "CA_NORTHBAYGS",
    "CA_NPIROQFALLS",
    "CA_NPKIRKLAND_G1_G5",
    "CA_NPKIRKLAND_G6",
    "CA_PORTLANDS_G1",
    "CA_PORTLANDS_G2",
    "CA_PORTLANDS_G3",
    "CA_SITHE_GOREWAY_G11",
    "CA_SITHE_GOREWAY_G12",
    "CA_SITHE_GOREWAY_G13",
    "CA_SITHE_GOREWAY_G15",
    "CA_STCLAIRCGS",
    "CA_TAOHSC",
    "CA_TASARNIA",
    "CA_TAWINDSOR",
    "CA_THOROLDCGS",
    "CA_TUNISGS",
    "CA_WESTWINDSOR",
    "CA_WHITBYCGS",
    "CA_YORKCGS_G1",
    "CA_YORKCGS_G2",
];

const ONTARIO_HYDRO: &[&str] = &[
    "CA_ABKENORA",
    "CA_AGUASABON",
    "CA_ALEXANDER",
    "CA_APIROQUOIS",
    "CA_ARNPRIOR",
    "CA_AUBREYFALLS",
    "CA_BARRETT",
    "CA_BECK1",
    "CA_BECK2",
    "CA_BECK2_PGS",
    "CA_CAMERONFALLS",
    "CA_CANYON",
    "CA_CARIBOUFALLS",
    "CA_CARMICHAEL",
    "CA_CHATSFALLS",
    "CA_CHENAUX",
    "CA_CLERGUE",
    "CA_DA_WATSON",
    "CA_DECEWFALLS",
    "CA_DECEWND1",
    "CA_DESJOACHIMS",
    "CA_EARFALLS",
    "CA_FORTFRANCSWC",
    "CA_GARTSHORE",
    "CA_HARMON",
    "CA_HARMON_2",
    "CA_HARRIS",
    "CA_HOLDEN",
    "CA_HOLINGSWTH",
    "CA_KAKABEKA",
    "CA_KIPLING",
    "CA_KIPLING_2",
    "CA_LITTLELONG",
    "CA_LITTLELONG_2",
    "CA_LONGSAULTE",
    "CA_LOWER_WHITE_RIVER",
    "CA_LOWERNOTCH",
    "CA_MACKAYGS",
    "CA_MANITOUFALLS",
    "CA_MISSION",
    "CA_MTNCHUTE",
    "CA_NAGAGAMI",
    "CA_OTTERRAPIDS",
    "CA_PETER_SUTHERLAND_SR",
    "CA_PINEPORTAGE",
    "CA_RAYNER",
    "CA_REDROCK",
    "CA_SAUNDERS",
    "CA_SILVERFALLS",
    "CA_SMOKY_2",
    "CA_STEEPHILL",
    "CA_STEWARTVLE",
    "CA_UMBATAFALLS",
    "CA_UPPER_WHITE_RIVER",
    "CA_WELLS",
    "CA_WHITEDOG",
];

const ONTARIO_NUCLEAR: &[&str] = &[
    "CA_BRUCEA_G1",
    "CA_BRUCEA_G2",
    "CA_BRUCEA_G3",
    "CA_BRUCEA_G4",
    "CA_BRUCEB_G5",
    "CA_BRUCEB_G6",
    "CA_BRUCEB_G7",
    "CA_BRUCEB_G8",
    "CA_DARLINGTON_G1",
    "CA_DARLINGTON_G2",
    "CA_DARLINGTON_G3",
    "CA_DARLINGTON_G4",
    "CA_PICKRINGA_G1",
    "CA_PICKERINGA_G4",
    "CA_PICKERINGB_G5",
    "CA_PICKERINGB_G6",
    "CA_PICKERINGB_G7",
    "CA_PICKERINGB_G8",
];

const ONTARIO_SOLAR: &[&str] = &[
    "CA_GRANDSF",
    "CA_KINGSTONSF",
    "CA_NANTICOKE_SOLAR",
    "CA_NORTHLAND_POWER_SOLAR_FACILITIES",
    "CA_SOUTHGATE_SF",
    "CA_STONE_MILLS_SF",
    "CA_WINDSOR_AIRPORT_SF",
];

const ONTARIO_WIND: &[&str] = &[
    "CA_ADELAIDE",
    "CA_AMARANTH",
    "CA_AMHERST_ISLAND",
    "CA_ARMOW",
    "CA_BELLE_RIVER",
    "CA_BLAKE",
    "CA_BORNISH",
    "CA_BOW_LAKE",
    "CA_BOW_LAKE_2",
    "CA_CEDAR_POINT_2",
    "CA_COMBER",
    "CA_CRYSLER",
    "CA_DILLON",
    "CA_EAST_LAKE",
    "CA_ERIEAU",
    "CA_GOSFIELDWGS",
    "CA_GOSHEN",
    "CA_GOULAIS",
    "CA_GRAND_VALLEY_3",
    "CA_GRANDWF",
    "CA_GREENWICH",
    "CA_HENVEY_NORTH",
    "CA_HENVEY_SOUTH",
    "CA_JERICHO",
    "CA_K2WIND",
    "CA_KINGSBRIDGE",
    "CA_LANDON",
    "CA_MCLEANSMTNWF_LT_AG_T1",
    "CA_NORTH_KENT",
    "CA_PAROCHES",
    "CA_PORT_BURWELL",
    "CA_PORTALMA_T1",
    "CA_PORTALMA_T3",
    "CA_PRINCEFARM",
    "CA_RAILBEDWF_LT_AG_SR",
    "CA_RIPLEY_SOUTH",
    "CA_ROMNEY",
    "CA_SANDUSK_LT_AG_T1",
    "CA_SHANNON",
    "CA_SPENCE",
    "CA_SUMMERHAVEN",
    "CA_UNDERWOOD",
    "CA_WEST_LINCOLN_NRWF",
    "CA_WOLFE_ISLAND",
    "CA_ZURICH",
];

static ONTARIO_RULES: &[FilterRule] = &[
    FilterRule::Generators {
        codes: ONTARIO_GENERATOR_VARIABLES,
        by_fragment: &[
            ("BIOFUEL", ONTARIO_BIOFUEL),
            ("GAS", ONTARIO_GAS),
            ("HYDRO", ONTARIO_HYDRO),
            ("NUCLEAR", ONTARIO_NUCLEAR),
            ("SOLAR", ONTARIO_SOLAR),
            ("WIND", ONTARIO_WIND),
        ],
    },
    FilterRule::Codes {
        codes: &["IMPORT", "EXPORT", "FLOW"],
        options: &[
            "CA_MAN",
            "CA_MAN_SK",
            "CA_MICH",
            "CA_MINN",
            "CA_NY",
            "PQ_AT",
            "PQ_B5D_B31L",
            "PQ_D4Z",
            "PQ_D5A",
            "PQ_H4A",
            "PQ_H9A",
            "PQ_P33C",
            "PQ_Q4C",
            "PQ_X2Y",
        ],
    },
];

/// Rule table for a province, in priority order.
pub fn rules_for(province: Province) -> &'static [FilterRule] {
    match province {
        Province::NovaScotia => NOVA_SCOTIA_RULES,
        Province::NewBrunswick => NEW_BRUNSWICK_RULES,
        Province::Alberta => ALBERTA_RULES,
        Province::BritishColumbia => BRITISH_COLUMBIA_RULES,
        Province::Quebec => QUEBEC_RULES,
        Province::Ontario => ONTARIO_RULES,
        Province::Newfoundland
        | Province::PrinceEdwardIsland
        | Province::Saskatchewan
        | Province::Yukon => &[],
    }
}

/// Resolve the secondary filter for a selection, if one applies.
pub fn resolve(province: Province, variable: &str) -> Option<SecondaryFilter> {
    rules_for(province)
        .iter()
        .find_map(|rule| rule.apply(variable))
        .flatten()
}

/// Whether a row belongs to the chosen secondary-filter value. Provinces
/// expose the dimension under different columns, so any of them may match.
pub fn row_matches(row: &Row, value: &str) -> bool {
    [
        columns::REFERENCE_AREA,
        columns::GENERATOR,
        columns::COUNTERPART_AREA,
    ]
    .iter()
    .any(|column| row.get(*column).map(String::as_str) == Some(value))
}

/// Keep rows matching `value`; `None` keeps everything.
pub fn filter_rows(rows: &[Row], value: Option<&str>) -> Vec<Row> {
    match value {
        Some(value) => rows
            .iter()
            .filter(|row| row_matches(row, value))
            .cloned()
            .collect(),
        None => rows.to_vec(),
    }
}
