//! The load state machine for one dashboard session.
//!
//! ```text
//! Idle -> CheckRestriction -> Blocked
//!                          -> CheckCache -> CacheHit -> FilterRender
//!                                        -> CacheMiss -> Fetching -> FetchOk -> Normalize -> CacheStore -> FilterRender
//!                                                                 -> FetchErr -> EmptyRender
//! ```
//!
//! Every call to [`Session::load`] takes a new generation. A fetch that
//! completes after a newer load has started still fills the cache, but its
//! rows are not displayed.

use crate::{
    cache::{CacheKey, ResultCache},
    render::{
        ChartSeries, Renderer, TablePage, DEFAULT_PAGE_SIZE, NO_DATA_MESSAGE, RESTRICTED_MESSAGE,
    },
};
use hfed_core::{
    date_range::DateRange,
    download,
    normalize::normalize,
    observation::Dataset,
    province::Province,
    query::{build_query, ApiInfo, Format, DEFAULT_BASE_URL},
    secondary_filter::{self, SecondaryFilter},
    transport::{FetchError, Transport},
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, num::NonZeroUsize};

/// Which collaborator the selection is shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    Chart,
    Table,
    Api,
}

/// Everything the user has picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub province: Province,
    pub variable: String,
    pub range: Option<DateRange>,
    /// Secondary-filter value; ignored when the selection has no filter.
    pub counterpart: Option<String>,
    pub view: View,
    /// 1-based table page.
    pub page: usize,
}

impl Selection {
    pub fn new(province: Province, variable: &str, range: Option<DateRange>, view: View) -> Self {
        Selection {
            province,
            variable: variable.to_string(),
            range,
            counterpart: None,
            view,
            page: 1,
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.province, &self.variable, self.range)
    }

    pub fn secondary_filter(&self) -> Option<SecondaryFilter> {
        secondary_filter::resolve(self.province, &self.variable)
    }

    /// Filter value to apply: the chosen counterpart when it is one of the
    /// filter's options, else the filter's first option.
    pub fn effective_counterpart(&self) -> Option<&str> {
        let filter = self.secondary_filter()?;
        match self.counterpart.as_deref() {
            Some(value) if filter.contains(value) => Some(value),
            Some(value) => {
                debug!(
                    "{} is not a {} option for {}, using default",
                    value, filter.label, self.variable
                );
                filter.default_option()
            }
            None => filter.default_option(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadPhase {
    Idle,
    CheckRestriction,
    Blocked,
    CheckCache,
    CacheHit,
    CacheMiss,
    Fetching,
    FetchOk,
    FetchErr,
    Normalize,
    CacheStore,
    FilterRender,
    EmptyRender,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Restricted variable outside the API view; nothing was fetched.
    Blocked,
    /// Rows were handed to the renderer.
    Rendered { rows: usize, from_cache: bool },
    /// The load succeeded but nothing matched the selection.
    Empty { from_cache: bool },
    /// The fetch failed; an empty result was shown.
    Failed(FetchError),
    /// A newer load started while this one was fetching.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub base_url: String,
    pub page_size: usize,
    /// `None` keeps every response for the life of the session.
    pub cache_capacity: Option<NonZeroUsize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            cache_capacity: None,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    cache: ResultCache,
    generation: u64,
    phase: LoadPhase,
    trace: Vec<LoadPhase>,
    /// Last displayed selection with its unfiltered rows.
    loaded: Option<(Selection, Dataset)>,
    /// Rows last handed to the renderer.
    current: Dataset,
    requests: usize,
}

/// A single-threaded dashboard session: cache, displayed data and the
/// transport and renderer it drives.
pub struct Session<T: Transport, R: Renderer> {
    config: SessionConfig,
    transport: T,
    renderer: R,
    state: RefCell<SessionState>,
}

impl<T: Transport, R: Renderer> Session<T, R> {
    pub fn new(config: SessionConfig, transport: T, renderer: R) -> Self {
        let cache = match config.cache_capacity {
            Some(capacity) => ResultCache::with_capacity(capacity),
            None => ResultCache::new(),
        };
        Session {
            config,
            transport,
            renderer,
            state: RefCell::new(SessionState {
                cache,
                generation: 0,
                phase: LoadPhase::Idle,
                trace: Vec::new(),
                loaded: None,
                current: Dataset::default(),
                requests: 0,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn phase(&self) -> LoadPhase {
        self.state.borrow().phase
    }

    /// Phases walked by the most recent load.
    pub fn trace(&self) -> Vec<LoadPhase> {
        self.state.borrow().trace.clone()
    }

    /// Number of requests handed to the transport so far.
    pub fn requests(&self) -> usize {
        self.state.borrow().requests
    }

    pub fn cached_entries(&self) -> usize {
        self.state.borrow().cache.len()
    }

    /// Rows currently on display, after the secondary filter.
    pub fn current_data(&self) -> Dataset {
        self.state.borrow().current.clone()
    }

    /// CSV document of the rows on display, if there are any.
    pub fn download_csv(&self) -> Option<String> {
        download::to_csv(&self.state.borrow().current)
    }

    pub fn api_info(&self, selection: &Selection) -> ApiInfo {
        ApiInfo::new(&self.config.base_url, selection.province, &selection.variable)
    }

    /// Run one load for `selection` through the state machine.
    pub async fn load(&self, selection: &Selection) -> LoadOutcome {
        let generation = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.trace.clear();
            state.generation
        };
        info!(
            "Loading {} {} ({})",
            selection.province,
            selection.variable,
            selection
                .range
                .map(|r| r.to_string())
                .unwrap_or_else(|| "full series".to_string())
        );

        self.enter(generation, LoadPhase::CheckRestriction);
        if selection.view != View::Api && selection.province.is_restricted(&selection.variable) {
            self.enter(generation, LoadPhase::Blocked);
            {
                let mut state = self.state.borrow_mut();
                state.current = Dataset::default();
                state.loaded = None;
            }
            self.renderer.render_message(RESTRICTED_MESSAGE);
            self.enter(generation, LoadPhase::Idle);
            return LoadOutcome::Blocked;
        }

        self.enter(generation, LoadPhase::CheckCache);
        let key = selection.cache_key();
        let cached = self.state.borrow_mut().cache.get(&key).cloned();
        let (data, from_cache) = match cached {
            Some(data) => {
                self.enter(generation, LoadPhase::CacheHit);
                (data, true)
            }
            None => {
                self.enter(generation, LoadPhase::CacheMiss);
                match self.fetch(generation, selection, key).await {
                    Ok(data) => (data, false),
                    Err(e) => {
                        if !self.is_current(generation) {
                            return LoadOutcome::Superseded;
                        }
                        self.enter(generation, LoadPhase::EmptyRender);
                        {
                            let mut state = self.state.borrow_mut();
                            state.current = Dataset::default();
                            state.loaded = None;
                        }
                        self.renderer.render_message(NO_DATA_MESSAGE);
                        self.enter(generation, LoadPhase::Idle);
                        return LoadOutcome::Failed(e);
                    }
                }
            }
        };

        if !self.is_current(generation) {
            debug!(
                "Discarding superseded load of {} {}",
                selection.province, selection.variable
            );
            return LoadOutcome::Superseded;
        }

        self.enter(generation, LoadPhase::FilterRender);
        let rows = self.display(selection.clone(), data);
        self.enter(generation, LoadPhase::Idle);
        if rows == 0 {
            LoadOutcome::Empty { from_cache }
        } else {
            LoadOutcome::Rendered { rows, from_cache }
        }
    }

    /// Re-apply the secondary filter to the last loaded rows without
    /// fetching. Returns the number of rows displayed, or `None` when
    /// nothing has been loaded.
    pub fn refilter(&self, counterpart: Option<&str>) -> Option<usize> {
        let (mut selection, data) = self.state.borrow_mut().loaded.take()?;
        selection.counterpart = counterpart.map(str::to_string);
        selection.page = 1;
        Some(self.display(selection, data))
    }

    /// Show another page of the last loaded rows in the table view.
    pub fn turn_page(&self, page: usize) -> Option<usize> {
        let (mut selection, data) = self.state.borrow_mut().loaded.take()?;
        selection.page = page;
        selection.view = View::Table;
        Some(self.display(selection, data))
    }

    async fn fetch(
        &self,
        generation: u64,
        selection: &Selection,
        key: CacheKey,
    ) -> Result<Dataset, FetchError> {
        let query = build_query(
            selection.province,
            &selection.variable,
            selection.range.map(|r| r.start()),
            selection.range.map(|r| r.end()),
        );
        let url = query.url(&self.config.base_url, Format::Csv);
        self.enter(generation, LoadPhase::Fetching);
        self.state.borrow_mut().requests += 1;

        let body = match self.transport.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                self.enter(generation, LoadPhase::FetchErr);
                return Err(e);
            }
        };
        self.enter(generation, LoadPhase::FetchOk);

        self.enter(generation, LoadPhase::Normalize);
        let data = normalize(
            selection.province,
            &selection.variable,
            Dataset::parse_csv(&body),
        );
        info!(
            "Fetched {} rows for {} {}",
            data.len(),
            selection.province,
            selection.variable
        );

        // stored even when superseded; the rows are correct for their key
        self.enter(generation, LoadPhase::CacheStore);
        self.state.borrow_mut().cache.put(key, data.clone());
        Ok(data)
    }

    /// Filter `data` for `selection`, hand it to the renderer and remember
    /// it as the displayed state.
    fn display(&self, selection: Selection, data: Dataset) -> usize {
        let filtered = data.filtered(selection.effective_counterpart());
        let rows = filtered.len();

        match selection.view {
            View::Api => {
                let info = self.api_info(&selection);
                self.renderer.render_message(&info.to_string());
            }
            _ if filtered.is_empty() => self.renderer.render_message(NO_DATA_MESSAGE),
            View::Chart => self.renderer.render_chart(ChartSeries::from_rows(
                selection.province,
                &selection.variable,
                &filtered.rows,
            )),
            View::Table => self.renderer.render_table(TablePage::new(
                &filtered,
                self.config.page_size,
                selection.page,
            )),
        }

        let mut state = self.state.borrow_mut();
        state.current = filtered;
        state.loaded = Some((selection, data));
        rows
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.borrow().generation == generation
    }

    /// Record a transition for `generation`; transitions of superseded
    /// loads are not recorded.
    fn enter(&self, generation: u64, phase: LoadPhase) {
        let mut state = self.state.borrow_mut();
        if state.generation != generation {
            return;
        }
        debug!("{:?} -> {:?}", state.phase, phase);
        state.phase = phase;
        state.trace.push(phase);
    }
}
