//! Catalog browsing commands.

use hfed_core::{
    catalog::variable_menu,
    province::Province,
    query::{frequency_code, ApiInfo},
    secondary_filter,
};
use log::warn;

pub fn list_provinces() -> anyhow::Result<()> {
    for province in Province::ALL {
        println!(
            "{:<22} {:<12} {}",
            province.name(),
            province.dataflow(),
            province.ref_area()
        );
    }
    Ok(())
}

pub fn list_variables(province: Province) -> anyhow::Result<()> {
    println!("{} (default start {})", province, province.default_min_date());
    for group in variable_menu(province) {
        let indent = match group.category {
            Some(category) => {
                println!("{}", category);
                "  "
            }
            None => "",
        };
        for v in group.variables {
            let mut notes = vec![format!("from {}", province.min_start_date(v.code))];
            if frequency_code(province, v.code).code() == "H" {
                notes.push("hourly".to_string());
            }
            if province.is_restricted(v.code) {
                notes.push("download/API only".to_string());
            }
            println!(
                "{}{:<26} {} [{}]",
                indent,
                v.code,
                v.label,
                notes.join(", ")
            );
        }
    }
    Ok(())
}

pub fn show_filter(province: Province, variable: &str) -> anyhow::Result<()> {
    check_variable(province, variable);
    match secondary_filter::resolve(province, variable) {
        Some(filter) => {
            println!("{}:", filter.label);
            for option in filter.options {
                println!("  {}", option);
            }
        }
        None => println!("No secondary filter for {} {}", province, variable),
    }
    Ok(())
}

pub fn show_api_urls(base_url: &str, province: Province, variable: &str) -> anyhow::Result<()> {
    check_variable(province, variable);
    println!("{}", ApiInfo::new(base_url, province, variable));
    Ok(())
}

/// Warn when the variable is not listed for the province. The API may still
/// serve it, so this is not an error.
pub fn check_variable(province: Province, variable: &str) -> bool {
    let known = province.variable(variable).is_some();
    if !known {
        warn!(
            "{} is not listed for {}; run `variables --province \"{}\"` for the list",
            variable, province, province
        );
    }
    known
}
