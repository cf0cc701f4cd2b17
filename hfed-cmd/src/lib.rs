//! Command implementations for the HFED CLI.
//!
//! Provides subcommands for browsing the catalog and for loading a
//! selection through the same session core a dashboard would use.

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use hfed_core::{province::Province, query::DEFAULT_BASE_URL};
use hfed_data::{
    render::DEFAULT_PAGE_SIZE,
    session::{SessionConfig, View},
};
use hfed_utils::dates::parse_date;
use std::{num::NonZeroUsize, path::PathBuf};

pub mod catalog;
pub mod fetch;
pub mod terminal;

/// Settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Base endpoint of the SDMX data API
    #[arg(long, env = "HFED_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Keep at most this many responses in memory (unbounded when omitted)
    #[arg(long, env = "HFED_CACHE_CAPACITY", global = true)]
    pub cache_capacity: Option<NonZeroUsize>,

    /// Rows per table page
    #[arg(long, env = "HFED_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE, global = true)]
    pub page_size: usize,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HFED_TIMEOUT", default_value_t = hfed_core::client::DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            base_url: self.base_url.clone(),
            page_size: self.page_size,
            cache_capacity: self.cache_capacity,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewArg {
    Chart,
    Table,
    Api,
}

impl From<ViewArg> for View {
    fn from(view: ViewArg) -> View {
        match view {
            ViewArg::Chart => View::Chart,
            ViewArg::Table => View::Table,
            ViewArg::Api => View::Api,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List provinces with their dataflow and reference-area codes
    Provinces,

    /// List the variables of a province, grouped as in the selector
    Variables {
        /// Province name or reference-area code (e.g. "Nova Scotia" or CA_NS)
        #[arg(short, long)]
        province: Province,
    },

    /// Show the secondary filter (counterpart area or generator) for a selection
    Filter {
        #[arg(short, long)]
        province: Province,

        #[arg(short, long)]
        variable: String,
    },

    /// Print the API URLs for a selection
    ApiUrls {
        #[arg(short, long)]
        province: Province,

        #[arg(short, long)]
        variable: String,
    },

    /// Fetch, normalize and display a selection
    Fetch {
        #[arg(short, long)]
        province: Province,

        #[arg(short, long)]
        variable: String,

        /// First day (YYYY-MM-DD); defaults to 90 days before --end
        #[arg(short, long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD); defaults to today
        #[arg(short, long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// Request the whole historical series instead of a date range
        #[arg(long, conflicts_with_all = ["start", "end"])]
        full_series: bool,

        /// Secondary-filter value; defaults to the filter's first option
        #[arg(short, long)]
        counterpart: Option<String>,

        #[arg(long, value_enum, default_value_t = ViewArg::Table)]
        view: ViewArg,

        /// Table page to show
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Write the displayed rows as CSV to this file or directory
        #[arg(short, long)]
        download: Option<PathBuf>,

        /// Print chart and table models as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(config: Config, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Provinces => catalog::list_provinces(),
        Command::Variables { province } => catalog::list_variables(province),
        Command::Filter { province, variable } => catalog::show_filter(province, &variable),
        Command::ApiUrls { province, variable } => {
            catalog::show_api_urls(&config.base_url, province, &variable)
        }
        Command::Fetch {
            province,
            variable,
            start,
            end,
            full_series,
            counterpart,
            view,
            page,
            download,
            json,
        } => {
            let request = fetch::FetchRequest {
                province,
                variable,
                start,
                end,
                full_series,
                counterpart,
                view: view.into(),
                page,
                download,
                json,
            };
            fetch::run_fetch(&config, request).await
        }
    }
}
