//! Domain entities: company and travel records

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::error::{DomainError, DomainResult, RecordKind};

/// Travel record as decoded from the source, before validation.
///
/// Every field is optional so that a missing key and an explicit `null`
/// land in the same place and can be rejected with a precise reason.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawExpense {
    pub id: Option<String>,
    pub employee_name: Option<String>,
    pub departure: Option<String>,
    pub destination: Option<String>,
    pub price: Option<Decimal>,
    pub company_id: Option<String>,
    pub created_at: Option<String>,
}

/// Company record as decoded from the source, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawUnit {
    pub id: Option<String>,
    pub name: Option<String>,
    pub parent_id: Option<String>,
    pub created_at: Option<String>,
}

/// A single travel expense attributed to one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    id: String,
    employee_name: String,
    departure: String,
    destination: String,
    price: Decimal,
    company_id: String,
    created_at: Option<String>,
}

impl Expense {
    /// Build an expense from trusted values.
    ///
    /// Fails only when `price` is negative.
    pub fn new(
        id: impl Into<String>,
        employee_name: impl Into<String>,
        departure: impl Into<String>,
        destination: impl Into<String>,
        price: Decimal,
        company_id: impl Into<String>,
        created_at: Option<String>,
    ) -> DomainResult<Self> {
        let id = id.into();
        if price.is_sign_negative() && !price.is_zero() {
            return Err(DomainError::MalformedRecord {
                kind: RecordKind::Travel,
                id: Some(id),
                reason: format!("negative price {price}"),
            });
        }
        Ok(Self {
            id,
            employee_name: employee_name.into(),
            departure: departure.into(),
            destination: destination.into(),
            price,
            company_id: company_id.into(),
            created_at,
        })
    }

    /// Validate a decoded record and construct the expense.
    pub fn from_record(raw: RawExpense) -> DomainResult<Self> {
        let id = raw.id.clone();
        let missing = |field: &str| DomainError::MalformedRecord {
            kind: RecordKind::Travel,
            id: id.clone(),
            reason: format!("missing required field '{field}'"),
        };

        let rec_id = raw.id.ok_or_else(|| missing("id"))?;
        let employee_name = raw.employee_name.ok_or_else(|| missing("employeeName"))?;
        let departure = raw.departure.ok_or_else(|| missing("departure"))?;
        let destination = raw.destination.ok_or_else(|| missing("destination"))?;
        let company_id = raw.company_id.ok_or_else(|| missing("companyId"))?;
        let price = raw.price.ok_or_else(|| missing("price"))?;

        Self::new(
            rec_id,
            employee_name,
            departure,
            destination,
            price,
            company_id,
            raw.created_at,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn employee_name(&self) -> &str {
        &self.employee_name
    }

    pub fn departure(&self) -> &str {
        &self.departure
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Id of the company this expense is billed to.
    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

/// One organizational unit (company) in the hierarchy.
///
/// Children and expenses are not stored here; they live on the arena node
/// that owns the unit once the forest is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    id: String,
    name: String,
    parent_id: Option<String>,
    created_at: Option<String>,
}

impl Unit {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<String>,
        created_at: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id,
            created_at,
        }
    }

    /// Validate a decoded record and construct the unit.
    pub fn from_record(raw: RawUnit) -> DomainResult<Self> {
        let missing = |field: &str| DomainError::MalformedRecord {
            kind: RecordKind::Company,
            id: raw.id.clone(),
            reason: format!("missing required field '{field}'"),
        };

        let id = raw.id.clone().ok_or_else(|| missing("id"))?;
        let name = raw.name.clone().ok_or_else(|| missing("name"))?;

        Ok(Self::new(id, name, raw.parent_id, raw.created_at))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parent id, verbatim from the record (may dangle or point at itself).
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_expense_rejects_negative_price() {
        let result = Expense::new(
            "t1",
            "Ann",
            "A",
            "B",
            Decimal::from_str("-1.5").unwrap(),
            "c1",
            None,
        );
        assert!(matches!(
            result,
            Err(DomainError::MalformedRecord { kind: RecordKind::Travel, .. })
        ));
    }

    #[test]
    fn test_expense_accepts_zero_price() {
        let expense = Expense::new("t1", "Ann", "A", "B", Decimal::ZERO, "c1", None).unwrap();
        assert_eq!(expense.price(), Decimal::ZERO);
    }

    #[test]
    fn test_unit_from_record_requires_name() {
        let raw = RawUnit {
            id: Some("c1".into()),
            ..Default::default()
        };
        let err = Unit::from_record(raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed company record 'c1': missing required field 'name'"
        );
    }
}
