use chrono::NaiveDate;
use hfed_core::{
    date_range::DateRange,
    province::Province,
    transport::{FetchError, Transport},
};
use hfed_data::{
    render::{ChartSeries, Renderer, TablePage, NO_DATA_MESSAGE, RESTRICTED_MESSAGE},
    session::{LoadOutcome, LoadPhase, Selection, Session, SessionConfig, View},
};
use std::{cell::RefCell, num::NonZeroUsize, rc::Rc};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
enum Rendered {
    Chart(ChartSeries),
    Table(TablePage),
    Message(String),
}

#[derive(Default, Clone)]
struct RecordingRenderer {
    rendered: Rc<RefCell<Vec<Rendered>>>,
}

impl RecordingRenderer {
    fn last(&self) -> Option<Rendered> {
        self.rendered.borrow().last().cloned()
    }

    fn count(&self) -> usize {
        self.rendered.borrow().len()
    }
}

impl Renderer for RecordingRenderer {
    fn render_chart(&self, chart: ChartSeries) {
        self.rendered.borrow_mut().push(Rendered::Chart(chart));
    }

    fn render_table(&self, page: TablePage) {
        self.rendered.borrow_mut().push(Rendered::Table(page));
    }

    fn render_message(&self, message: &str) {
        self.rendered
            .borrow_mut()
            .push(Rendered::Message(message.to_string()));
    }
}

/// Answers every request with the same result and records the URLs.
#[derive(Clone)]
struct FixedTransport {
    response: Result<String, FetchError>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl FixedTransport {
    fn ok(body: &str) -> Self {
        FixedTransport {
            response: Ok(body.to_string()),
            calls: Rc::default(),
        }
    }

    fn failing(error: FetchError) -> Self {
        FixedTransport {
            response: Err(error),
            calls: Rc::default(),
        }
    }
}

impl Transport for FixedTransport {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.borrow_mut().push(url.to_string());
        self.response.clone()
    }
}

/// Holds each request until the test releases the body for its URL
/// fragment. Gates for the same fragment are handed out in order.
#[derive(Default)]
struct GatedTransport {
    gates: RefCell<Vec<(String, oneshot::Receiver<String>)>>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl GatedTransport {
    fn gate(&self, fragment: &str) -> oneshot::Sender<String> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push((fragment.to_string(), rx));
        tx
    }
}

impl Transport for GatedTransport {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.borrow_mut().push(url.to_string());
        let rx = {
            let mut gates = self.gates.borrow_mut();
            gates
                .iter()
                .position(|(f, _)| url.contains(f.as_str()))
                .map(|i| gates.remove(i).1)
        };
        match rx {
            Some(rx) => rx
                .await
                .map_err(|e| FetchError::Transport(e.to_string())),
            None => Err(FetchError::Status(404)),
        }
    }
}

const NS_EXPORT: &str = "DATAFLOW,REF_AREA,COUNTERPART_AREA,ENERGY_FLOWS,TIME_PERIOD,OBS_VALUE,DATETIME_LOCAL,UNIT_MEASURE
CCEI:DF_HFED_NS(1.0),CA_NS,CA_NS_SD,EXPORT,2024-10-01T04:00:00,12345.6,2024-10-01T01:00:00,MW
CCEI:DF_HFED_NS(1.0),CA_NS,CA_NS_SD,EXPORT,2024-10-01T04:05:00,,2024-10-01T01:05:00,MW
CCEI:DF_HFED_NS(1.0),CA_NS,CA_NS,EXPORT,2024-10-01T04:00:00,7,2024-10-01T01:00:00,MW
";

const NB_LOAD: &str = "REF_AREA,COUNTERPART_AREA,TIME_PERIOD,OBS_VALUE,UNIT_MEASURE
CA_NB,_Z,2024-10-01T04:00:00,1500,MW
CA_NB,_Z,2024-10-01T04:05:00,1510,MW
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn october() -> Option<DateRange> {
    Some(DateRange(date(2024, 10, 1), date(2024, 10, 31)))
}

fn session<T: Transport>(transport: T) -> Session<T, RecordingRenderer> {
    Session::new(SessionConfig::default(), transport, RecordingRenderer::default())
}

#[tokio::test]
async fn test_secondary_filter_defaults_to_first_option() {
    let session = session(FixedTransport::ok(NS_EXPORT));
    let selection = Selection::new(Province::NovaScotia, "EXPORT", october(), View::Table);

    let outcome = session.load(&selection).await;

    assert_eq!(
        outcome,
        LoadOutcome::Rendered {
            rows: 2,
            from_cache: false
        }
    );
    let current = session.current_data();
    assert!(current
        .rows
        .iter()
        .all(|r| r["COUNTERPART_AREA"] == "CA_NS_SD"));
    // numeric formatting on the way into the cache
    assert_eq!(current.rows[0]["OBS_VALUE"], "12,345.6");
    assert_eq!(current.rows[1]["OBS_VALUE"], "");
}

#[tokio::test]
async fn test_refilter_uses_loaded_rows() {
    let session = session(FixedTransport::ok(NS_EXPORT));
    let selection = Selection::new(Province::NovaScotia, "EXPORT", october(), View::Table);
    session.load(&selection).await;

    assert_eq!(session.refilter(Some("CA_NS")), Some(1));
    assert_eq!(session.current_data().rows[0]["OBS_VALUE"], "7");
    assert_eq!(session.refilter(Some("CA_NS_HL")), Some(0));
    assert_eq!(
        session.renderer().last(),
        Some(Rendered::Message(NO_DATA_MESSAGE.to_string()))
    );
    assert_eq!(session.requests(), 1);
}

#[tokio::test]
async fn test_refilter_before_load() {
    let session = session(FixedTransport::ok(NS_EXPORT));
    assert_eq!(session.refilter(Some("CA_NS")), None);
}

#[tokio::test]
async fn test_new_brunswick_units_are_energy() {
    let session = session(FixedTransport::ok(NB_LOAD));
    let selection = Selection::new(Province::NewBrunswick, "LOAD", october(), View::Chart);

    session.load(&selection).await;

    let current = session.current_data();
    assert!(current.rows.iter().all(|r| r["UNIT_MEASURE"] == "MWh"));
    assert!(current.rows.iter().all(|r| r["COUNTERPART_AREA"] == "N/A"));
    match session.renderer().last() {
        Some(Rendered::Chart(chart)) => {
            assert_eq!(chart.title, "Load in New Brunswick");
            assert_eq!(chart.y_label, "MWh");
            assert_eq!(chart.points.len(), 2);
            assert_eq!(chart.points[1].value, 1510.0);
        }
        other => panic!("expected a chart, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pei_wind_percent() {
    let body = "TIME_PERIOD,OBS_VALUE,UNIT_MEASURE\n2024-10-01T04:00:00,42.5,MW\n";
    let session = session(FixedTransport::ok(body));
    let selection = Selection::new(
        Province::PrinceEdwardIsland,
        "WIND_PERCENT",
        october(),
        View::Chart,
    );

    session.load(&selection).await;

    assert_eq!(session.current_data().rows[0]["UNIT_MEASURE"], "%");
    match session.renderer().last() {
        Some(Rendered::Chart(chart)) => assert_eq!(chart.y_label, "Percent (%)"),
        other => panic!("expected a chart, got {:?}", other),
    }
}

#[tokio::test]
async fn test_restricted_variable_is_blocked_without_requests() {
    let transport = FixedTransport::ok(NB_LOAD);
    let calls = transport.calls.clone();
    let session = session(transport);
    let selection = Selection::new(Province::Ontario, "RESIDENTIAL_TIERED", october(), View::Table);

    assert_eq!(session.load(&selection).await, LoadOutcome::Blocked);
    assert!(calls.borrow().is_empty());
    assert_eq!(session.requests(), 0);
    assert_eq!(
        session.trace(),
        vec![LoadPhase::CheckRestriction, LoadPhase::Blocked, LoadPhase::Idle]
    );
    assert_eq!(
        session.renderer().last(),
        Some(Rendered::Message(RESTRICTED_MESSAGE.to_string()))
    );
    assert!(session.download_csv().is_none());
}

#[tokio::test]
async fn test_restricted_variable_in_api_view_is_not_blocked() {
    let transport = FixedTransport::ok("A\n1\n");
    let calls = transport.calls.clone();
    let session = session(transport);
    let selection = Selection::new(Province::Ontario, "RESIDENTIAL_TIERED", None, View::Api);

    let outcome = session.load(&selection).await;

    assert_ne!(outcome, LoadOutcome::Blocked);
    assert_eq!(calls.borrow().len(), 1);
    match session.renderer().last() {
        Some(Rendered::Message(text)) => {
            assert!(text.contains("DF_HFED_ON,1.0/N...RESIDENTIAL_TIERED"))
        }
        other => panic!("expected the API info, got {:?}", other),
    }
}

#[tokio::test]
async fn test_second_identical_load_hits_cache() {
    let transport = FixedTransport::ok(NB_LOAD);
    let calls = transport.calls.clone();
    let session = session(transport);
    let selection = Selection::new(Province::NewBrunswick, "LOAD", october(), View::Table);

    session.load(&selection).await;
    let outcome = session.load(&selection).await;

    assert_eq!(
        outcome,
        LoadOutcome::Rendered {
            rows: 2,
            from_cache: true
        }
    );
    assert_eq!(calls.borrow().len(), 1);
    assert_eq!(
        calls.borrow()[0],
        "https://api.statcan.gc.ca/hfed-dehf/sdmx/rest/data/CCEI,DF_HFED_NB,1.0/N...LOAD?startPeriod=2024-10-01&endPeriod=2024-10-31&dimensionAtObservation=AllDimensions&format=csv"
    );
    assert_eq!(
        session.trace(),
        vec![
            LoadPhase::CheckRestriction,
            LoadPhase::CheckCache,
            LoadPhase::CacheHit,
            LoadPhase::FilterRender,
            LoadPhase::Idle,
        ]
    );

    // a full-series request is a different key
    let full = Selection::new(Province::NewBrunswick, "LOAD", None, View::Table);
    session.load(&full).await;
    assert_eq!(calls.borrow().len(), 2);
    assert_eq!(session.cached_entries(), 2);
}

#[tokio::test]
async fn test_fetch_error_renders_empty() {
    let session = session(FixedTransport::failing(FetchError::Status(500)));
    let selection = Selection::new(Province::Alberta, "NSI", october(), View::Chart);

    let outcome = session.load(&selection).await;

    assert_eq!(outcome, LoadOutcome::Failed(FetchError::Status(500)));
    assert!(session.current_data().is_empty());
    assert_eq!(session.cached_entries(), 0);
    assert_eq!(
        session.trace(),
        vec![
            LoadPhase::CheckRestriction,
            LoadPhase::CheckCache,
            LoadPhase::CacheMiss,
            LoadPhase::Fetching,
            LoadPhase::FetchErr,
            LoadPhase::EmptyRender,
            LoadPhase::Idle,
        ]
    );
    assert_eq!(
        session.renderer().last(),
        Some(Rendered::Message(NO_DATA_MESSAGE.to_string()))
    );

    // failures are not cached; the next load tries again
    session.load(&selection).await;
    assert_eq!(session.requests(), 2);
}

#[tokio::test]
async fn test_fetch_miss_walks_every_phase() {
    let session = session(FixedTransport::ok(NB_LOAD));
    let selection = Selection::new(Province::NewBrunswick, "LOAD", october(), View::Table);

    session.load(&selection).await;

    assert_eq!(
        session.trace(),
        vec![
            LoadPhase::CheckRestriction,
            LoadPhase::CheckCache,
            LoadPhase::CacheMiss,
            LoadPhase::Fetching,
            LoadPhase::FetchOk,
            LoadPhase::Normalize,
            LoadPhase::CacheStore,
            LoadPhase::FilterRender,
            LoadPhase::Idle,
        ]
    );
    assert_eq!(session.phase(), LoadPhase::Idle);
}

#[tokio::test]
async fn test_empty_response_shows_message() {
    let session = session(FixedTransport::ok(""));
    let selection = Selection::new(Province::Yukon, "WIND", october(), View::Table);

    assert_eq!(
        session.load(&selection).await,
        LoadOutcome::Empty { from_cache: false }
    );
    assert_eq!(
        session.renderer().last(),
        Some(Rendered::Message(NO_DATA_MESSAGE.to_string()))
    );
}

#[tokio::test]
async fn test_superseded_fetch_is_cached_but_not_shown() {
    let transport = GatedTransport::default();
    let release_older = transport.gate("N...LOAD");
    let release_newer = transport.gate("N...DEMAND");
    let session = session(transport);
    let older = Selection::new(Province::NewBrunswick, "LOAD", october(), View::Table);
    let newer = Selection::new(Province::NewBrunswick, "DEMAND", october(), View::Table);

    let older_load = session.load(&older);
    tokio::pin!(older_load);
    // start the older load so it is waiting on the transport first
    tokio::select! {
        biased;
        _ = &mut older_load => panic!("older load finished before release"),
        _ = tokio::task::yield_now() => {}
    }

    let newer_body = NB_LOAD.replace("1500", "9");
    let release = async {
        release_newer.send(newer_body).unwrap();
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        // the older response completes last
        release_older.send(NB_LOAD.to_string()).unwrap();
    };
    let (older_outcome, newer_outcome, _) =
        tokio::join!(&mut older_load, session.load(&newer), release);

    assert_eq!(older_outcome, LoadOutcome::Superseded);
    assert_eq!(
        newer_outcome,
        LoadOutcome::Rendered {
            rows: 2,
            from_cache: false
        }
    );
    assert_eq!(session.current_data().rows[0]["OBS_VALUE"], "9");
    assert_eq!(session.renderer().count(), 1);
    assert_eq!(session.cached_entries(), 2);

    // the stale response is still served from the cache later
    assert_eq!(
        session.load(&older).await,
        LoadOutcome::Rendered {
            rows: 2,
            from_cache: true
        }
    );
    assert_eq!(session.current_data().rows[0]["OBS_VALUE"], "1,500");
}

#[tokio::test]
async fn test_identical_loads_in_flight_both_fetch() {
    let transport = GatedTransport::default();
    let calls = transport.calls.clone();
    let release_first = transport.gate("N...LOAD");
    let release_second = transport.gate("N...LOAD");
    let session = session(transport);
    let selection = Selection::new(Province::NewBrunswick, "LOAD", october(), View::Table);

    let first_load = session.load(&selection);
    tokio::pin!(first_load);
    tokio::select! {
        biased;
        _ = &mut first_load => panic!("first load finished before release"),
        _ = tokio::task::yield_now() => {}
    }

    let release = async {
        release_first.send(NB_LOAD.to_string()).unwrap();
        release_second.send(NB_LOAD.replace("1500", "9")).unwrap();
    };
    let (first_outcome, second_outcome, _) =
        tokio::join!(&mut first_load, session.load(&selection), release);

    // no de-duplication: the second load misses the cache and fetches again
    assert_eq!(calls.borrow().len(), 2);
    assert_eq!(calls.borrow()[0], calls.borrow()[1]);
    assert_eq!(session.requests(), 2);
    assert_eq!(first_outcome, LoadOutcome::Superseded);
    assert_eq!(
        second_outcome,
        LoadOutcome::Rendered {
            rows: 2,
            from_cache: false
        }
    );
    assert_eq!(session.current_data().rows[0]["OBS_VALUE"], "9");
    assert_eq!(session.renderer().count(), 1);
    assert_eq!(session.cached_entries(), 1);
}

#[tokio::test]
async fn test_table_paging() {
    let mut body = String::from("TIME_PERIOD,OBS_VALUE\n");
    for i in 0..23 {
        body.push_str(&format!("2024-10-01T{:02}:00:00,{}\n", i, i * 1000));
    }
    let session = session(FixedTransport::ok(&body));
    let selection = Selection::new(Province::Yukon, "WIND", october(), View::Table);

    session.load(&selection).await;
    match session.renderer().last() {
        Some(Rendered::Table(page)) => {
            assert_eq!(page.total_pages, 3);
            assert_eq!(page.summary(), "Showing 1 to 10 of 23 entries");
        }
        other => panic!("expected a table, got {:?}", other),
    }

    assert_eq!(session.turn_page(3), Some(23));
    match session.renderer().last() {
        Some(Rendered::Table(page)) => {
            assert_eq!(page.page, 3);
            assert_eq!(page.summary(), "Showing 21 to 23 of 23 entries");
            assert_eq!(page.rows[2]["OBS_VALUE"], "22,000");
        }
        other => panic!("expected a table, got {:?}", other),
    }
}

#[tokio::test]
async fn test_download_of_displayed_rows() {
    let session = session(FixedTransport::ok(NS_EXPORT));
    let selection = Selection::new(Province::NovaScotia, "EXPORT", october(), View::Table);
    session.load(&selection).await;
    session.refilter(Some("CA_NS"));

    let csv = session.download_csv().unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("\"Data flow\",\"Reference area\""));
    assert!(lines[1].contains(",CA_NS,EXPORT,"));
}

#[tokio::test]
async fn test_bounded_cache_refetches_evicted_entries() {
    let transport = FixedTransport::ok(NB_LOAD);
    let calls = transport.calls.clone();
    let config = SessionConfig {
        cache_capacity: NonZeroUsize::new(1),
        ..SessionConfig::default()
    };
    let session = Session::new(config, transport, RecordingRenderer::default());
    let load = Selection::new(Province::NewBrunswick, "LOAD", october(), View::Table);
    let demand = Selection::new(Province::NewBrunswick, "DEMAND", october(), View::Table);

    session.load(&load).await;
    session.load(&demand).await;
    session.load(&load).await;

    assert_eq!(calls.borrow().len(), 3);
    assert_eq!(session.cached_entries(), 1);
}
