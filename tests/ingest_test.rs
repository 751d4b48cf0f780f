//! Tests for payload ingestion: decoding and filtering of raw records

use rust_decimal_macros::dec;

use costtree::application::{decode_expenses, decode_units, ApplicationError};
use costtree::domain::{DomainError, RecordKind};

#[test]
fn given_valid_companies_when_decoding_then_all_fields_are_kept() {
    // Arrange
    let payload = r#"[
        {"id": "uuid-1", "createdAt": "2021-02-26T00:55:36.632Z", "name": "Webprovise Corp", "parentId": "0"},
        {"id": "uuid-2", "name": "Stamm LLC", "parentId": null}
    ]"#;

    // Act
    let ingested = decode_units(payload, "companies.json").unwrap();

    // Assert
    assert!(ingested.rejected.is_empty());
    assert_eq!(ingested.records.len(), 2);
    let first = &ingested.records[0];
    assert_eq!(first.id(), "uuid-1");
    assert_eq!(first.name(), "Webprovise Corp");
    assert_eq!(first.parent_id(), Some("0"));
    assert_eq!(first.created_at(), Some("2021-02-26T00:55:36.632Z"));
    assert_eq!(ingested.records[1].parent_id(), None);
    assert_eq!(ingested.records[1].created_at(), None);
}

#[test]
fn given_companies_missing_required_fields_when_decoding_then_they_are_skipped() {
    // Arrange
    let payload = r#"[
        {"id": "ok", "name": "Kept"},
        {"id": "no-name"},
        {"name": "no id"},
        {"id": "null-name", "name": null},
        {"id": 7, "name": "numeric id"},
        "not an object"
    ]"#;

    // Act
    let ingested = decode_units(payload, "companies.json").unwrap();

    // Assert
    assert_eq!(ingested.records.len(), 1);
    assert_eq!(ingested.records[0].id(), "ok");
    assert_eq!(ingested.rejected.len(), 5);
    assert!(ingested.rejected.iter().all(|e| matches!(
        e,
        DomainError::MalformedRecord {
            kind: RecordKind::Company,
            ..
        }
    )));
}

#[test]
fn given_travels_when_decoding_then_prices_accept_numbers_and_numeric_strings() {
    // Arrange
    let payload = r#"[
        {"id": "t1", "employeeName": "A", "departure": "X", "destination": "Y", "price": 120, "companyId": "c1", "createdAt": "2020-08-27T00:22:26.927Z"},
        {"id": "t2", "employeeName": "B", "departure": "X", "destination": "Y", "price": 99.95, "companyId": "c1"},
        {"id": "t3", "employeeName": "C", "departure": "X", "destination": "Y", "price": "15.50", "companyId": "c2"}
    ]"#;

    // Act
    let ingested = decode_expenses(payload, "travels.json").unwrap();

    // Assert
    assert!(ingested.rejected.is_empty());
    let prices: Vec<_> = ingested.records.iter().map(|t| t.price()).collect();
    assert_eq!(prices, vec![dec!(120), dec!(99.95), dec!(15.50)]);
    assert_eq!(ingested.records[0].company_id(), "c1");
    assert_eq!(ingested.records[0].employee_name(), "A");
    assert_eq!(ingested.records[0].created_at(), Some("2020-08-27T00:22:26.927Z"));
    assert_eq!(ingested.records[1].created_at(), None);
}

#[test]
fn given_malformed_travels_when_decoding_then_they_are_skipped() {
    // Arrange
    let payload = r#"[
        {"id": "ok", "employeeName": "A", "departure": "X", "destination": "Y", "price": 1, "companyId": "c1"},
        {"id": "no-price", "employeeName": "A", "departure": "X", "destination": "Y", "companyId": "c1"},
        {"id": "no-company", "employeeName": "A", "departure": "X", "destination": "Y", "price": 1},
        {"id": "negative", "employeeName": "A", "departure": "X", "destination": "Y", "price": -5, "companyId": "c1"},
        {"id": "bad-price", "employeeName": "A", "departure": "X", "destination": "Y", "price": "lots", "companyId": "c1"}
    ]"#;

    // Act
    let ingested = decode_expenses(payload, "travels.json").unwrap();

    // Assert
    assert_eq!(ingested.records.len(), 1);
    let rejected_ids: Vec<Option<&str>> = ingested
        .rejected
        .iter()
        .map(|e| match e {
            DomainError::MalformedRecord { id, .. } => id.as_deref(),
            _ => None,
        })
        .collect();
    assert_eq!(
        rejected_ids,
        vec![Some("no-price"), Some("no-company"), Some("negative"), Some("bad-price")]
    );
}

#[test]
fn given_payload_that_is_not_an_array_when_decoding_then_decode_error() {
    // Act
    let result = decode_units(r#"{"error": "rate limited"}"#, "https://example.com/companies");

    // Assert
    match result {
        Err(ApplicationError::Decode { kind, location, .. }) => {
            assert_eq!(kind, RecordKind::Company);
            assert_eq!(location, "https://example.com/companies");
        }
        other => panic!("expected Decode error, got {:?}", other),
    }
}

#[test]
fn given_empty_array_when_decoding_then_no_records() {
    // Act
    let ingested = decode_expenses("[]", "travels.json").unwrap();

    // Assert
    assert!(ingested.records.is_empty());
    assert!(ingested.rejected.is_empty());
}
