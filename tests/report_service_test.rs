//! Tests for ReportService using an in-memory record source

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use rust_decimal_macros::dec;

use costtree::application::services::{ReportOptions, ReportService};
use costtree::application::ApplicationError;
use costtree::domain::DomainError;
use costtree::infrastructure::RecordSource;
use costtree::util::testing;

/// Serves fixed payloads by location and records every fetch.
#[derive(Default)]
struct InMemorySource {
    payloads: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl InMemorySource {
    fn with(mut self, location: &str, payload: &str) -> Self {
        self.payloads.insert(location.to_string(), payload.to_string());
        self
    }
}

impl RecordSource for InMemorySource {
    fn fetch(&self, location: &str) -> io::Result<String> {
        self.fetched.lock().unwrap().push(location.to_string());
        self.payloads
            .get(location)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, location.to_string()))
    }
}

fn options() -> ReportOptions {
    ReportOptions {
        companies_source: "mem://companies".to_string(),
        travels_source: "mem://travels".to_string(),
        parallel: false,
    }
}

const COMPANIES: &str = r#"[
    {"id": "1", "createdAt": "2021-02-26T00:55:36.632Z", "name": "Webprovise Corp", "parentId": "0"},
    {"id": "2", "createdAt": "2021-02-25T10:35:32.978Z", "name": "Stamm LLC", "parentId": "1"},
    {"id": "3", "createdAt": "2021-02-25T15:16:30.887Z", "name": "Blanda, Langosh and Barton", "parentId": "1"},
    {"id": "4", "createdAt": "2021-02-25T06:11:47.519Z", "name": "Price and Sons", "parentId": "2"},
    {"id": "5", "name": "Broken"},
    {"name": "no id at all"}
]"#;

const TRAVELS: &str = r#"[
    {"id": "t1", "createdAt": "2020-08-27T00:22:26.927Z", "employeeName": "Garry Schuppe", "departure": "Saint Kitts and Nevis", "destination": "Pitcairn Islands", "price": "712.00", "companyId": "4"},
    {"id": "t2", "employeeName": "Lelah Kulas", "departure": "Chile", "destination": "Cuba", "price": 287.5, "companyId": "3"},
    {"id": "t3", "employeeName": "Nobody", "departure": "A", "destination": "B", "price": 1000, "companyId": "unknown"},
    {"id": "t4", "employeeName": "Missing price", "departure": "A", "destination": "B", "companyId": "2"}
]"#;

#[test]
fn given_sources_when_building_report_then_forest_and_costs_are_returned() {
    // Arrange
    testing::init_test_setup();
    let source = InMemorySource::default()
        .with("mem://companies", COMPANIES)
        .with("mem://travels", TRAVELS);
    let source = Arc::new(source);
    let service = ReportService::new(source.clone(), options());

    // Act
    let report = service.build().unwrap();

    // Assert
    let roots: Vec<&str> = report.roots.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(roots, vec!["1", "5"]);

    let corp = &report.roots[0];
    assert_eq!(corp.cost, dec!(999.5));
    let children: Vec<&str> = corp.children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(children, vec!["2", "3"]);
    assert_eq!(corp.children[0].cost, dec!(712));
    assert_eq!(corp.children[0].children[0].id, "4");
    assert_eq!(corp.children[1].cost, dec!(287.5));
    assert_eq!(report.roots[1].cost, dec!(0));

    assert_eq!(report.stats.companies, 5);
    assert_eq!(report.stats.companies_rejected, 1);
    assert_eq!(report.stats.travels, 3);
    assert_eq!(report.stats.travels_rejected, 1);
    assert_eq!(report.stats.travels_dropped, 1);
    assert_eq!(report.stats.roots, 2);
    assert_eq!(report.stats.total_cost, dec!(999.5));
    assert!(report.cycle.is_none());

    let mut fetched = source.fetched.lock().unwrap().clone();
    fetched.sort();
    assert_eq!(fetched, vec!["mem://companies", "mem://travels"]);
}

#[test]
fn given_parallel_option_when_building_report_then_result_matches_sequential() {
    // Arrange
    let source = Arc::new(
        InMemorySource::default()
            .with("mem://companies", COMPANIES)
            .with("mem://travels", TRAVELS),
    );
    let sequential = ReportService::new(source.clone(), options());
    let parallel = ReportService::new(
        source,
        ReportOptions {
            parallel: true,
            ..options()
        },
    );

    // Act
    let a = sequential.build().unwrap();
    let b = parallel.build().unwrap();

    // Assert
    assert_eq!(a.roots, b.roots);
}

#[test]
fn given_unreachable_travel_source_when_building_report_then_fetch_error() {
    // Arrange
    let source = InMemorySource::default().with("mem://companies", COMPANIES);
    let service = ReportService::new(Arc::new(source), options());

    // Act
    let result = service.build();

    // Assert
    match result {
        Err(ApplicationError::Fetch {
            location, remote, ..
        }) => {
            assert_eq!(location, "mem://travels");
            assert!(!remote);
        }
        other => panic!("expected Fetch error, got {:?}", other.map(|r| r.roots)),
    }
}

#[test]
fn given_detached_cycle_when_building_report_then_other_roots_are_reported_with_the_cycle() {
    // Arrange
    let companies = r#"[
        {"id": "A", "name": "Alpha", "parentId": "B"},
        {"id": "B", "name": "Beta", "parentId": "A"},
        {"id": "C", "name": "Gamma"},
        {"id": "D", "name": "Delta", "parentId": "C"}
    ]"#;
    let travels = r#"[
        {"id": "t1", "employeeName": "X", "departure": "A", "destination": "B", "price": 40, "companyId": "D"},
        {"id": "t2", "employeeName": "Y", "departure": "A", "destination": "B", "price": 7, "companyId": "A"}
    ]"#;
    let source = InMemorySource::default()
        .with("mem://companies", companies)
        .with("mem://travels", travels);
    let service = ReportService::new(Arc::new(source), options());

    // Act
    let report = service.build().unwrap();

    // Assert
    let roots: Vec<&str> = report.roots.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(roots, vec!["C"]);
    assert_eq!(report.roots[0].cost, dec!(40));
    assert_eq!(report.stats.total_cost, dec!(40));
    match report.cycle {
        Some(DomainError::CyclicHierarchy { unit_id, path }) => {
            assert_eq!(unit_id, "A");
            assert_eq!(path, vec!["A", "B", "A"]);
        }
        other => panic!("expected CyclicHierarchy, got {:?}", other),
    }
}

#[test]
fn given_hierarchy_deeper_than_report_limit_when_building_report_then_domain_error() {
    // Arrange
    let companies: Vec<serde_json::Value> = (0..1_000)
        .map(|i| {
            let parent = if i == 0 {
                serde_json::Value::Null
            } else {
                serde_json::Value::String(format!("n{}", i - 1))
            };
            serde_json::json!({"id": format!("n{i}"), "name": format!("Company {i}"), "parentId": parent})
        })
        .collect();
    let source = InMemorySource::default()
        .with("mem://companies", &serde_json::to_string(&companies).unwrap())
        .with("mem://travels", "[]");
    let service = ReportService::new(Arc::new(source), options());

    // Act
    let result = service.build();

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::HierarchyTooDeep { .. }))
    ));
}

#[test]
fn given_garbage_payload_when_building_report_then_decode_error() {
    // Arrange
    let source = InMemorySource::default()
        .with("mem://companies", "<html>502 Bad Gateway</html>")
        .with("mem://travels", "[]");
    let service = ReportService::new(Arc::new(source), options());

    // Act
    let result = service.build();

    // Assert
    assert!(matches!(result, Err(ApplicationError::Decode { .. })));
}
