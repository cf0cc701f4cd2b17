//! Static reference data: variables per province, minimum start dates,
//! restricted datasets and axis labels.
//!
//! Every rule is a table entry so each one can be audited and tested on its
//! own. Lookups are total: an unknown province or variable degrades to the
//! fallback values instead of failing.

use crate::province::Province;
use chrono::NaiveDate;
use hfed_utils::dates::past_days;
use serde::Serialize;

/// Minimum start date used when the province is not recognized.
pub const FALLBACK_MIN_DATE: (i32, u32, u32) = (2001, 1, 1);

/// Length of the default date window offered for a new selection.
pub const DEFAULT_WINDOW_DAYS: i64 = 90;

/// Group label for variables that carry no category in a grouped menu.
pub const UNCATEGORIZED: &str = "Other";

/// A measured variable available for a province.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct Variable {
    pub code: &'static str,
    pub label: &'static str,
    /// Only used to group the selector for provinces that publish many reports.
    pub category: Option<&'static str>,
}

const fn var(code: &'static str, label: &'static str) -> Variable {
    Variable {
        code,
        label,
        category: None,
    }
}

const fn cat(code: &'static str, label: &'static str, category: &'static str) -> Variable {
    Variable {
        code,
        label,
        category: Some(category),
    }
}

const QC_SECTORS: &str = "Electricity consumption by industry sector";
const QC_TRADE: &str = "Electricity imports and exports";
const QC_SOURCES: &str = "Sources of electricity generated";

const ON_GENERATOR: &str = "Generator output and capability report";
const ON_INDUSTRIAL: &str = "Industrial load by sector report";
const ON_INTERTIE: &str = "Intertie schedule and flow report";
const ON_HOEP: &str = "Hourly Ontario energy price (HOEP) report";
const ON_FSA: &str = "Hourly consumption by forward sortation area";
const ON_DEMAND: &str = "Hourly Demand Report";

static NEWFOUNDLAND: &[Variable] = &[var("DEMAND", "Demand")];

static PRINCE_EDWARD_ISLAND: &[Variable] = &[
    var("IMPORT_CABLES", "Import cables"),
    var("ON_ISL_LOAD", "On-island load"),
    var("ON_ISL_WIND", "On-island wind generation"),
    var("ON_ISL_FOSSIL", "Total on-island fossil fuel generation"),
    var("WIND_PERCENT", "Wind as a percent of total load"),
    var("WIND_EXPORT", "Wind power exported off island"),
    var("WIND_LOCAL", "Wind power used on island"),
];

static NOVA_SCOTIA: &[Variable] = &[var("LOAD", "Load"), var("WIND", "Wind")];

static NEW_BRUNSWICK: &[Variable] = &[
    var("DEMAND", "Demand"),
    var("LOAD", "Load"),
    var("RM_10", "10 minute reserve margin"),
    var("RM_30", "30 minute reserve margin"),
    var("SRM_10", "10 minute spinning reserve margin"),
    var("NSI", "Net scheduled interchange"),
];

static QUEBEC: &[Variable] = &[
    cat("DEMAND", "Demand", "Demand"),
    cat("AGRICOLE", "Agricultural", QC_SECTORS),
    cat("COMMERCIAL", "Commercial", QC_SECTORS),
    cat("INDUSTRIEL", "Industrial", QC_SECTORS),
    cat("EINSTITUTIONNEL", "Institutional", QC_SECTORS),
    cat("RESIDENTIEL", "Residential", QC_SECTORS),
    cat("EXPORT", "Export", QC_TRADE),
    cat("EXPORT_TOTAL", "Export total", QC_TRADE),
    cat("IMPORT_GAS", "Import gas", QC_TRADE),
    cat("IMPORT_HYDRO", "Import hydro", QC_TRADE),
    cat("IMPORT_NUCLEAR", "Import nuclear", QC_TRADE),
    cat("IMPORT_TOTAL", "Import total", QC_TRADE),
    cat("IMPORT_UNKNOWN", "Import unknown", QC_TRADE),
    cat("IMPORT_WIND", "Import wind", QC_TRADE),
    cat("HYDRO", "Hydro", QC_SOURCES),
    cat("SOLAR", "Solar", QC_SOURCES),
    cat("THERMAL", "Thermal", QC_SOURCES),
    cat("WIND", "Wind", QC_SOURCES),
    cat("TOTAL_PRODUCTION", "Total production", QC_SOURCES),
    cat("OTHER", "Other", QC_SOURCES),
];

static ONTARIO: &[Variable] = &[
    cat("BIOFUEL_CAPABILITY", "Biofuel capability", ON_GENERATOR),
    cat("BIOFUEL_OUTPUT", "Biofuel output", ON_GENERATOR),
    cat("DIRECT_CONNECT", "Directly connected load", ON_INDUSTRIAL),
    cat(
        "ELEC_POWER",
        "Electric power generation, transmission and distribution (w/o LDC)",
        ON_INDUSTRIAL,
    ),
    cat("EXPORT", "Export", ON_INTERTIE),
    cat("FLOW", "Flow", ON_INTERTIE),
    cat("GAS_CAPABILITY", "Gas capability", ON_GENERATOR),
    cat("GAS_OUTPUT", "Gas output", ON_GENERATOR),
    cat("HOEP", "Hourly Ontario energy price", ON_HOEP),
    cat("HYDRO_CAPABILITY", "Hydro capability", ON_GENERATOR),
    cat("HYDRO_OUTPUT", "Hydro output", ON_GENERATOR),
    cat("RESIDENTIAL_RETAILER", "Residential retailer", ON_FSA),
    cat("RESIDENTIAL_TIERED", "Residential tiered", ON_FSA),
    cat("RESIDENTIAL_TOU", "Residential time-of-use", ON_FSA),
    cat("RESIDENTIAL_ULO", "Residential ultra-low overnight", ON_FSA),
    cat("SGS_50KW_RETAILER", "Small general service (<50kW) retailer", ON_FSA),
    cat("SGS_50KW_TIERED", "Small general service (<50kW) tiered", ON_FSA),
    cat("SGS_50KW_TOU", "Small general service (<50kW) time-of-use", ON_FSA),
    cat(
        "SGS_50KW_ULO",
        "Small general service (<50kW) ultra-low overnight",
        ON_FSA,
    ),
    cat("IMPORT", "Import", ON_INTERTIE),
    cat(
        "IRON_STEEL",
        "Iron and steel mills and ferro-alloy manufacturing",
        ON_INDUSTRIAL,
    ),
    cat("LDC", "Local distribution companies (LDC)", ON_INDUSTRIAL),
    cat("MANU_FACTR", "Manufacturing", ON_INDUSTRIAL),
    cat("MARKET_DEMAND", "Market demand", ON_DEMAND),
    cat("METAL_ORE", "Metal ore mining", ON_INDUSTRIAL),
    cat("MOTOR_VEHICLE", "Motor vehicle manufacturing", ON_INDUSTRIAL),
    cat("NUCLEAR_CAPABILITY", "Nuclear capability", ON_GENERATOR),
    cat("NUCLEAR_OUTPUT", "Nuclear output", ON_GENERATOR),
    cat("ONTARIO_DEMAND", "Ontario demand", ON_DEMAND),
    cat("OTHER_INDSTR", "Other industrial consumers", ON_INDUSTRIAL),
    cat(
        "PETRO_COAL",
        "Petroleum and coal products manufacturing",
        ON_INDUSTRIAL,
    ),
    cat("PULP_PAPER", "Pulp paper and paperboard mills", ON_INDUSTRIAL),
    cat(
        "SOLAR_AVAILABLE_CAPACITY",
        "Solar available capacity",
        ON_GENERATOR,
    ),
    cat("SOLAR_CAPABILITY", "Solar forecast", ON_GENERATOR),
    cat("SOLAR_OUTPUT", "Solar output", ON_GENERATOR),
    cat("WIND_AVAILABLE_CAPACITY", "Wind available capacity", ON_GENERATOR),
    cat("WIND_CAPABILITY", "Wind forecast", ON_GENERATOR),
    cat("WIND_OUTPUT", "Wind output", ON_GENERATOR),
];

static ALBERTA: &[Variable] = &[
    var("POOL_PRICE", "Alberta pool price"),
    var("COAL", "Coal (discontinued)"),
    var("COGENERATION", "Cogeneration"),
    var("COMBINED_CYCLE", "Combined cycle"),
    var("DUAL_FUEL", "Dual fuel (discontinued)"),
    var("GAS", "Gas (discontinued)"),
    var("GAS_FIRED_STEAM", "Gas-fired steam"),
    var("HYDRO", "Hydro"),
    var("INTERNAL_LOAD", "Internal load"),
    var("NET_ACTUAL_INTERCHANGE", "Net actual interchange"),
    var("NSI", "Net scheduled interchange"),
    var("OTHER", "Other"),
    var("SIMPLE_CYCLE", "Simple cycle"),
    var("SOLAR", "Solar"),
    var("SYSTEM_MARGINAL_PRICE", "System marginal price"),
    var("TOTAL_NET_GENERATION", "Total net generation"),
    var("WIND", "Wind"),
];

static SASKATCHEWAN: &[Variable] = &[
    var("COAL", "Coal"),
    var("HYDRO", "Hydro"),
    var("IMPORTS_EXPORTS", "Imports/Exports"),
    var("NATURAL_GAS", "Natural gas"),
    var("OTHER", "Other"),
    var("POWER_GENERATED", "Power generated"),
    var("SOLAR", "Solar"),
    var("SYSTEM_DEMAND", "System demand"),
    var("WIND", "Wind"),
];

static BRITISH_COLUMBIA: &[Variable] = &[
    var("LOAD", "Load"),
    var("NSI", "Net scheduled interchange"),
];

static YUKON: &[Variable] = &[
    var("HYDRO", "Hydro"),
    var("SOLAR", "Solar"),
    var("THERMAL", "Thermal"),
    var("TOTAL", "Total load"),
    var("WIND", "Wind"),
];

/// Quebec generation sources published at hourly frequency.
pub const QUEBEC_HOURLY_SOURCES: &[&str] =
    &["HYDRO", "OTHER", "SOLAR", "THERMAL", "TOTAL_PRODUCTION", "WIND"];

/// Ontario generator output and capability variables.
pub const ONTARIO_GENERATOR_VARIABLES: &[&str] = &[
    "BIOFUEL_CAPABILITY",
    "BIOFUEL_OUTPUT",
    "GAS_CAPABILITY",
    "GAS_OUTPUT",
    "HYDRO_CAPABILITY",
    "HYDRO_OUTPUT",
    "NUCLEAR_CAPABILITY",
    "NUCLEAR_OUTPUT",
    "SOLAR_AVAILABLE_CAPACITY",
    "SOLAR_CAPABILITY",
    "SOLAR_OUTPUT",
    "WIND_AVAILABLE_CAPACITY",
    "WIND_CAPABILITY",
    "WIND_OUTPUT",
];

/// Ontario smart-meter series too large for interactive preview.
pub const ONTARIO_RESTRICTED_VARIABLES: &[&str] = &[
    "RESIDENTIAL_RETAILER",
    "RESIDENTIAL_TIERED",
    "RESIDENTIAL_TOU",
    "RESIDENTIAL_ULO",
    "SGS_50KW_RETAILER",
    "SGS_50KW_TIERED",
    "SGS_50KW_TOU",
    "SGS_50KW_ULO",
];

/// A minimum start date applying to a set of variable codes.
#[derive(Debug, Clone, Copy)]
pub struct DateRule {
    pub codes: &'static [&'static str],
    pub since: (i32, u32, u32),
}

const fn since(codes: &'static [&'static str], y: i32, m: u32, d: u32) -> DateRule {
    DateRule {
        codes,
        since: (y, m, d),
    }
}

static PEI_DATE_RULES: &[DateRule] = &[since(&["IMPORT_CABLES"], 2018, 10, 30)];

static NS_DATE_RULES: &[DateRule] = &[since(&["WIND"], 2022, 12, 7)];

static NB_DATE_RULES: &[DateRule] = &[
    since(&["RM_10", "RM_30"], 2021, 3, 25),
    since(&["SRM_10"], 2024, 8, 19),
];

static QC_DATE_RULES: &[DateRule] = &[
    since(&["DEMAND"], 2019, 1, 1),
    since(QUEBEC_HOURLY_SOURCES, 2021, 10, 5),
    since(
        &[
            "EXPORT",
            "EXPORT_TOTAL",
            "IMPORT_GAS",
            "IMPORT_HYDRO",
            "IMPORT_NUCLEAR",
            "IMPORT_TOTAL",
            "IMPORT_UNKNOWN",
            "IMPORT_WIND",
        ],
        2025,
        4,
        1,
    ),
];

static ON_DATE_RULES: &[DateRule] = &[
    since(&["RESIDENTIAL_RETAILER", "SGS_50KW_TOU"], 2018, 1, 1),
    since(
        &[
            "DIRECT_CONNECT",
            "ELEC_POWER",
            "IRON_STEEL",
            "LDC",
            "MANU_FACTR",
            "METAL_ORE",
            "MOTOR_VEHICLE",
            "OTHER_INDSTR",
            "PETRO_COAL",
            "PULP_PAPER",
        ],
        2019,
        1,
        1,
    ),
    since(&["SGS_50KW_RETAILER"], 2019, 3, 1),
    since(ONTARIO_GENERATOR_VARIABLES, 2019, 5, 1),
    since(&["RESIDENTIAL_TIERED"], 2020, 11, 1),
    since(&["RESIDENTIAL_TOU"], 2023, 9, 22),
    since(&["SGS_50KW_TIERED"], 2023, 10, 18),
    since(&["SGS_50KW_ULO"], 2024, 5, 1),
    since(&["RESIDENTIAL_ULO"], 2024, 8, 17),
    since(&["EXPORT", "FLOW", "IMPORT"], 2024, 11, 19),
];

static AB_DATE_RULES: &[DateRule] = &[
    since(&["SYSTEM_MARGINAL_PRICE"], 2024, 5, 6),
    since(&["POOL_PRICE"], 2024, 5, 7),
    since(
        &[
            "COGENERATION",
            "COMBINED_CYCLE",
            "GAS_FIRED_STEAM",
            "SIMPLE_CYCLE",
        ],
        2025,
        1,
        4,
    ),
];

static BC_DATE_RULES: &[DateRule] = &[since(&["NSI"], 2007, 1, 1)];

fn ymd((y, m, d): (i32, u32, u32)) -> NaiveDate {
    // table literals are valid calendar dates
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

impl Province {
    /// Ordered variables published for this province.
    pub fn variables(&self) -> &'static [Variable] {
        match self {
            Province::Newfoundland => NEWFOUNDLAND,
            Province::PrinceEdwardIsland => PRINCE_EDWARD_ISLAND,
            Province::NovaScotia => NOVA_SCOTIA,
            Province::NewBrunswick => NEW_BRUNSWICK,
            Province::Quebec => QUEBEC,
            Province::Ontario => ONTARIO,
            Province::Alberta => ALBERTA,
            Province::Saskatchewan => SASKATCHEWAN,
            Province::BritishColumbia => BRITISH_COLUMBIA,
            Province::Yukon => YUKON,
        }
    }

    /// Find a variable of this province by code.
    pub fn variable(&self, code: &str) -> Option<&'static Variable> {
        self.variables().iter().find(|v| v.code == code)
    }

    /// First date for which the province publishes any data.
    pub fn default_min_date(&self) -> NaiveDate {
        ymd(match self {
            Province::Newfoundland => (2022, 9, 13),
            Province::PrinceEdwardIsland => (2012, 11, 13),
            Province::NovaScotia => (2022, 2, 20),
            Province::NewBrunswick => (2016, 1, 1),
            Province::Quebec => (2016, 1, 1),
            Province::Ontario => (2002, 5, 1),
            Province::Alberta => (2023, 2, 7),
            Province::Saskatchewan => (2024, 9, 29),
            Province::BritishColumbia => (2001, 4, 1),
            Province::Yukon => (2024, 10, 9),
        })
    }

    /// Variable-specific minimum date overrides, checked in order.
    pub fn date_rules(&self) -> &'static [DateRule] {
        match self {
            Province::PrinceEdwardIsland => PEI_DATE_RULES,
            Province::NovaScotia => NS_DATE_RULES,
            Province::NewBrunswick => NB_DATE_RULES,
            Province::Quebec => QC_DATE_RULES,
            Province::Ontario => ON_DATE_RULES,
            Province::Alberta => AB_DATE_RULES,
            Province::BritishColumbia => BC_DATE_RULES,
            Province::Newfoundland | Province::Saskatchewan | Province::Yukon => &[],
        }
    }

    /// Earliest valid start date for a variable of this province.
    pub fn min_start_date(&self, variable: &str) -> NaiveDate {
        self.date_rules()
            .iter()
            .find(|rule| rule.codes.contains(&variable))
            .map(|rule| ymd(rule.since))
            .unwrap_or_else(|| self.default_min_date())
    }

    /// Whether the variable is gated to download/API-only access.
    pub fn is_restricted(&self, variable: &str) -> bool {
        *self == Province::Ontario && ONTARIO_RESTRICTED_VARIABLES.contains(&variable)
    }

    /// Human label of a variable, falling back to its code.
    pub fn variable_label<'a>(&self, variable: &'a str) -> &'a str {
        match self.variable(variable) {
            Some(v) => v.label,
            None => variable,
        }
    }
}

/// Dataflow code for a province name, if the province is known.
pub fn dataflow_code(province: &str) -> Option<&'static str> {
    Province::from_name(province).map(|p| p.dataflow())
}

/// Ordered variables for a province name; empty for unknown provinces.
pub fn variables_for(province: &str) -> &'static [Variable] {
    Province::from_name(province)
        .map(|p| p.variables())
        .unwrap_or(&[])
}

/// Minimum valid start date for a (province, variable) pair.
///
/// Unknown provinces degrade to [`FALLBACK_MIN_DATE`].
pub fn min_start_date(province: &str, variable: &str) -> NaiveDate {
    match Province::from_name(province) {
        Some(p) => p.min_start_date(variable),
        None => ymd(FALLBACK_MIN_DATE),
    }
}

/// Default date range for a selection: the last 90 days ending `today`,
/// with the start never earlier than the variable's minimum start date.
pub fn default_date_range(
    province: Province,
    variable: &str,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let (start, end) = past_days(today, DEFAULT_WINDOW_DAYS);
    let min_date = province.min_start_date(variable);
    (start.max(min_date), end)
}

/// The date-picker contract for a selection: the earliest and latest
/// selectable days and the range offered first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
    pub initial: (NaiveDate, NaiveDate),
}

impl DateBounds {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }

    /// Nearest selectable day. `max` wins when the bounds are inverted.
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.max(self.min).min(self.max)
    }
}

/// Bounds for a selection: from the variable's minimum start date up to
/// `today`, starting on [`default_date_range`].
pub fn date_bounds(province: Province, variable: &str, today: NaiveDate) -> DateBounds {
    DateBounds {
        min: province.min_start_date(variable),
        max: today,
        initial: default_date_range(province, variable, today),
    }
}

/// Y-axis label for a chart of the given series.
pub fn y_axis_label(province: Province, variable: &str) -> &'static str {
    match (province, variable) {
        (Province::PrinceEdwardIsland, "WIND_PERCENT") => "Percent (%)",
        (Province::NewBrunswick, _) => "MWh",
        (Province::Ontario, "HOEP") => "Canadian dollars",
        (Province::Alberta, "POOL_PRICE" | "SYSTEM_MARGINAL_PRICE") => "Canadian dollars",
        _ => "MW",
    }
}

/// A group of the variable selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableGroup {
    /// `None` for provinces listed without grouping.
    pub category: Option<&'static str>,
    pub variables: Vec<Variable>,
}

/// Build the variable selector for a province.
///
/// Provinces with categorized variables are grouped by category, categories
/// and labels sorted alphabetically. Others form one label-sorted list.
pub fn variable_menu(province: Province) -> Vec<VariableGroup> {
    let variables = province.variables();
    let mut sorted: Vec<Variable> = variables.to_vec();
    sorted.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));

    if variables.iter().all(|v| v.category.is_none()) {
        return vec![VariableGroup {
            category: None,
            variables: sorted,
        }];
    }

    let mut groups: Vec<VariableGroup> = Vec::new();
    for v in sorted {
        let category = v.category.unwrap_or(UNCATEGORIZED);
        match groups.iter_mut().find(|g| g.category == Some(category)) {
            Some(group) => group.variables.push(v),
            None => groups.push(VariableGroup {
                category: Some(category),
                variables: vec![v],
            }),
        }
    }
    groups.sort_by(|a, b| {
        let a = a.category.unwrap_or_default().to_lowercase();
        let b = b.category.unwrap_or_default().to_lowercase();
        a.cmp(&b)
    });
    groups
}
