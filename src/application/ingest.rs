//! Payload ingestion
//!
//! Decodes raw JSON arrays into typed records. Records that lack a required
//! field or carry a wrong-typed value are logged and skipped; they never
//! reach the forest builder.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    DomainError, DomainResult, Expense, RawExpense, RawUnit, RecordKind, Unit,
};

/// Records accepted from one payload together with the rejected ones.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub records: Vec<T>,
    pub rejected: Vec<DomainError>,
}

/// Decode a company payload (`[{id, name, parentId, createdAt}, ...]`).
pub fn decode_units(payload: &str, location: &str) -> ApplicationResult<Ingested<Unit>> {
    decode::<RawUnit, Unit>(payload, location, RecordKind::Company, Unit::from_record)
}

/// Decode a travel payload (`[{id, employeeName, departure, destination, price, companyId, createdAt}, ...]`).
pub fn decode_expenses(payload: &str, location: &str) -> ApplicationResult<Ingested<Expense>> {
    decode::<RawExpense, Expense>(payload, location, RecordKind::Travel, Expense::from_record)
}

fn decode<R, T>(
    payload: &str,
    location: &str,
    kind: RecordKind,
    construct: fn(R) -> DomainResult<T>,
) -> ApplicationResult<Ingested<T>>
where
    R: DeserializeOwned,
{
    let values: Vec<Value> =
        serde_json::from_str(payload).map_err(|e| ApplicationError::Decode {
            kind,
            location: location.to_string(),
            message: e.to_string(),
        })?;

    let mut records = Vec::with_capacity(values.len());
    let mut rejected = Vec::new();

    for (pos, value) in values.into_iter().enumerate() {
        let id = value.get("id").and_then(Value::as_str).map(str::to_string);
        let result = serde_json::from_value::<R>(value)
            .map_err(|e| DomainError::MalformedRecord {
                kind,
                id,
                reason: e.to_string(),
            })
            .and_then(construct);

        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("skipping {} record #{} from {}: {}", kind, pos, location, e);
                rejected.push(e);
            }
        }
    }

    debug!(
        "decoded {} {} records from {} ({} rejected)",
        records.len(),
        kind,
        location,
        rejected.len()
    );
    Ok(Ingested { records, rejected })
}
