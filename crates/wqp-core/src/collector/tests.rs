//! Collector tests with a scripted in-memory source.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use super::*;
use crate::config::{CharacteristicGroup, PullConfig};
use crate::region::{Region, RegionTable};

/// Source that answers from a fixed per-county dataset. Broad queries fail
/// when `fail_region` is set; a sub-region query fails when its code list
/// equals `fail_sub`.
struct ScriptedSource {
    counties: BTreeMap<String, Vec<InventoryRecord>>,
    fail_region: bool,
    fail_sub: Option<Vec<String>>,
    calls: Mutex<Vec<InventoryQuery>>,
}

impl ScriptedSource {
    fn new(counties: &[String]) -> Self {
        let mut map = BTreeMap::new();
        for (i, c) in counties.iter().enumerate() {
            let rows = (0..=i)
                .map(|k| record(&format!("SITE-{}-{}", c, k), (k as u64 + 1) * 10))
                .collect();
            map.insert(c.clone(), rows);
        }
        Self {
            counties: map,
            fail_region: false,
            fail_sub: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn scopes(&self) -> Vec<QueryScope> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|q| q.scope.clone())
            .collect()
    }
}

impl RemoteSource for ScriptedSource {
    fn query(&self, query: &InventoryQuery) -> Result<Vec<InventoryRecord>, SourceError> {
        self.calls.lock().unwrap().push(query.clone());
        match &query.scope {
            QueryScope::Region(_) => {
                if self.fail_region {
                    return Err(SourceError::Http(500));
                }
                Ok(self.counties.values().flatten().cloned().collect())
            }
            QueryScope::SubRegions(codes) => {
                if self.fail_sub.as_ref() == Some(codes) {
                    return Err(SourceError::Other("timed out".to_string()));
                }
                Ok(codes
                    .iter()
                    .flat_map(|c| self.counties.get(c).cloned().unwrap_or_default())
                    .collect())
            }
        }
    }
}

/// Wraps a scripted source and sleeps before answering, longer for broad
/// queries than for sub-region queries.
struct DelayedSource {
    inner: ScriptedSource,
    broad: Duration,
    sub: Duration,
}

impl RemoteSource for DelayedSource {
    fn query(&self, query: &InventoryQuery) -> Result<Vec<InventoryRecord>, SourceError> {
        match query.scope {
            QueryScope::Region(_) => thread::sleep(self.broad),
            QueryScope::SubRegions(_) => thread::sleep(self.sub),
        }
        self.inner.query(query)
    }
}

fn record(site: &str, n: u64) -> InventoryRecord {
    InventoryRecord {
        org_id: "USGS-WI".to_string(),
        site_id: site.to_string(),
        site_type: "Stream".to_string(),
        region_name: "Wisconsin".to_string(),
        sub_region_name: String::new(),
        huc: "07090001".to_string(),
        latitude: Some(43.0),
        longitude: Some(-89.0),
        result_count: n,
    }
}

fn county_codes(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("US:55:{:03}", i * 2 - 1)).collect()
}

fn table(code: &str, counties: Vec<String>) -> RegionTable {
    RegionTable::new(vec![Region {
        code: code.to_string(),
        name: "Wisconsin".to_string(),
        counties,
    }])
    .unwrap()
}

fn pull() -> PullConfig {
    let mut params = BTreeMap::new();
    params.insert("siteType".to_string(), "Stream".to_string());
    PullConfig {
        characteristics: vec![
            CharacteristicGroup {
                name: "temperature".to_string(),
                synonyms: vec!["Temperature, water".to_string(), "Temperature".to_string()],
            },
            CharacteristicGroup {
                name: "oxygen".to_string(),
                synonyms: vec!["Dissolved oxygen (DO)".to_string()],
            },
        ],
        excluded_site_types: Vec::new(),
        params,
    }
}

#[test]
fn broad_query_success_uses_single_call() {
    let counties = county_codes(4);
    let source = ScriptedSource::new(&counties);
    let catalog = table("US:55", counties);

    let inv = collect_region(&source, &catalog, "US:55", &pull()).unwrap();
    assert!(!inv.split);
    assert_eq!(inv.rows, 1 + 2 + 3 + 4);
    assert_eq!(inv.records.len(), inv.rows);
    assert_eq!(source.scopes(), vec![QueryScope::Region("US:55".to_string())]);
}

#[test]
fn query_carries_flattened_characteristics_and_params() {
    let counties = county_codes(2);
    let source = ScriptedSource::new(&counties);
    let catalog = table("US:55", counties);

    collect_region(&source, &catalog, "US:55", &pull()).unwrap();
    let calls = source.calls.lock().unwrap();
    assert_eq!(
        calls[0].characteristics,
        vec!["Temperature, water", "Temperature", "Dissolved oxygen (DO)"]
    );
    assert_eq!(calls[0].params.get("siteType").map(String::as_str), Some("Stream"));
}

#[test]
fn forced_failure_splits_ten_sub_regions_in_half() {
    let counties = county_codes(10);
    let mut source = ScriptedSource::new(&counties);
    source.fail_region = true;
    let catalog = table("US:55", counties.clone());

    let inv = collect_region(&source, &catalog, "US:55", &pull()).unwrap();
    assert!(inv.split);

    let scopes = source.scopes();
    assert_eq!(scopes.len(), 3);
    assert_eq!(scopes[0], QueryScope::Region("US:55".to_string()));
    assert_eq!(scopes[1], QueryScope::SubRegions(counties[..5].to_vec()));
    assert_eq!(scopes[2], QueryScope::SubRegions(counties[5..].to_vec()));

    let first: usize = (1..=5).sum();
    let second: usize = (6..=10).sum();
    assert_eq!(inv.rows, first + second);
    assert_eq!(inv.records.len(), inv.rows);
}

#[test]
fn split_result_matches_broad_result() {
    let counties = county_codes(7);
    let catalog = table("US:55", counties.clone());

    let broad_source = ScriptedSource::new(&counties);
    let broad = collect_region(&broad_source, &catalog, "US:55", &pull()).unwrap();

    let mut failing = ScriptedSource::new(&counties);
    failing.fail_region = true;
    let split = collect_region(&failing, &catalog, "US:55", &pull()).unwrap();

    assert!(!broad.split);
    assert!(split.split);
    assert_eq!(broad.rows, split.rows);
    assert_eq!(broad.records, split.records);
}

#[test]
fn halves_are_concatenated_without_dedup() {
    let counties = county_codes(2);
    let mut source = ScriptedSource::new(&counties);
    source.fail_region = true;
    // Same site reported under both counties.
    for rows in source.counties.values_mut() {
        rows.push(record("SHARED-1", 5));
    }
    let catalog = table("US:55", counties);

    let inv = collect_region(&source, &catalog, "US:55", &pull()).unwrap();
    let shared = inv.records.iter().filter(|r| r.site_id == "SHARED-1").count();
    assert_eq!(shared, 2);
}

#[test]
fn sub_region_failure_is_fatal_and_not_split_again() {
    let counties = county_codes(6);
    let mut source = ScriptedSource::new(&counties);
    source.fail_region = true;
    source.fail_sub = Some(counties[3..].to_vec());
    let catalog = table("US:55", counties);

    let err = collect_region(&source, &catalog, "US:55", &pull()).unwrap_err();
    assert!(matches!(err, CollectError::RemoteQuerySubFailure { .. }));
    assert_eq!(err.region(), "US:55");
    assert_eq!(source.scopes().len(), 3);
}

#[test]
fn region_without_sub_regions_cannot_split() {
    let mut source = ScriptedSource::new(&[]);
    source.fail_region = true;
    let catalog = table("US:72", Vec::new());

    let err = collect_region(&source, &catalog, "US:72", &pull()).unwrap_err();
    assert!(matches!(err, CollectError::RemoteQueryFailure { .. }));
    assert_eq!(source.scopes().len(), 1);
}

#[test]
fn unknown_region_reports_missing_reference_data() {
    let mut source = ScriptedSource::new(&[]);
    source.fail_region = true;
    let catalog = table("US:55", county_codes(2));

    let err = collect_region(&source, &catalog, "US:99", &pull()).unwrap_err();
    assert!(matches!(err, CollectError::UnknownRegion { .. }));
    assert!(err.to_string().contains("US:99"));
}

#[test]
fn single_sub_region_is_queried_alone() {
    let counties = county_codes(1);
    let mut source = ScriptedSource::new(&counties);
    source.fail_region = true;
    let catalog = table("US:11", counties.clone());

    let inv = collect_region(&source, &catalog, "US:11", &pull()).unwrap();
    assert_eq!(inv.rows, 1);
    assert_eq!(
        source.scopes(),
        vec![
            QueryScope::Region("US:11".to_string()),
            QueryScope::SubRegions(counties),
        ]
    );
}

#[test]
fn collect_regions_keeps_going_after_a_failure() {
    let counties = county_codes(3);
    let mut source = ScriptedSource::new(&counties);
    source.fail_region = true;
    let catalog = RegionTable::new(vec![
        Region {
            code: "US:55".to_string(),
            name: "Wisconsin".to_string(),
            counties: counties.clone(),
        },
        Region {
            code: "US:27".to_string(),
            name: "Minnesota".to_string(),
            counties: Vec::new(),
        },
    ])
    .unwrap();

    let regions = vec!["US:55".to_string(), "US:27".to_string()];
    let outcomes = collect_regions(&source, &catalog, &regions, &pull());
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].0, "US:55");
    assert!(outcomes[0].1.as_ref().unwrap().split);
    assert_eq!(outcomes[1].0, "US:27");
    assert!(matches!(
        outcomes[1].1,
        Err(CollectError::RemoteQueryFailure { .. })
    ));
}

#[test]
fn split_elapsed_sums_halves_and_skips_failed_broad_query() {
    let counties = county_codes(4);
    let mut inner = ScriptedSource::new(&counties);
    inner.fail_region = true;
    let source = DelayedSource {
        inner,
        broad: Duration::from_millis(200),
        sub: Duration::from_millis(20),
    };
    let catalog = table("US:55", counties);

    let inv = collect_region(&source, &catalog, "US:55", &pull()).unwrap();
    assert!(inv.split);
    assert!(inv.elapsed >= Duration::from_millis(40), "elapsed {:?}", inv.elapsed);
    assert!(inv.elapsed < Duration::from_millis(200), "elapsed {:?}", inv.elapsed);
}

#[test]
fn broad_elapsed_covers_the_single_query() {
    let counties = county_codes(2);
    let source = DelayedSource {
        inner: ScriptedSource::new(&counties),
        broad: Duration::from_millis(30),
        sub: Duration::ZERO,
    };
    let catalog = table("US:55", counties);

    let inv = collect_region(&source, &catalog, "US:55", &pull()).unwrap();
    assert!(!inv.split);
    assert!(inv.elapsed >= Duration::from_millis(30), "elapsed {:?}", inv.elapsed);
}
