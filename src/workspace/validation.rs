/// Field validation at the store boundary
///
/// Every item write is checked against the page schema before it reaches
/// SQLite: each key must name a column and each value's shape must match the
/// column's declared type. Option labels are not checked; rendering falls back
/// to raw text for labels that no longer resolve.

use crate::error::{Result, WorkspaceError};
use crate::workspace::types::{ColumnDefinition, ColumnType, FieldValue, Fields};
use chrono::{DateTime, NaiveDate};

/// Validate a whole fields map against a schema
pub fn validate_fields(schema: &[ColumnDefinition], fields: &Fields) -> Result<()> {
    for (name, value) in fields {
        let column = schema
            .iter()
            .find(|c| &c.name == name)
            .ok_or_else(|| invalid(name, "no such column"))?;
        validate_value(column, value)?;
    }
    Ok(())
}

/// Validate one value against its column
pub fn validate_value(column: &ColumnDefinition, value: &FieldValue) -> Result<()> {
    match (column.column_type, value) {
        (_, FieldValue::Null) => Ok(()),
        (ColumnType::Text | ColumnType::Select | ColumnType::Status, FieldValue::Text(_)) => Ok(()),
        (ColumnType::Number, FieldValue::Number(n)) if n.is_finite() => Ok(()),
        (ColumnType::Number, FieldValue::Number(_)) => {
            Err(invalid(&column.name, "number must be finite"))
        }
        (ColumnType::Date, FieldValue::Text(s)) => match parse_date(s) {
            Some(_) => Ok(()),
            None => Err(invalid(&column.name, "expected an ISO date")),
        },
        (ColumnType::Multiselect, FieldValue::List(_)) => Ok(()),
        (column_type, value) => Err(invalid(
            &column.name,
            &format!("{:?} column cannot hold a {}", column_type, value.type_name()).to_lowercase(),
        )),
    }
}

/// Parse a stored date string: a plain `YYYY-MM-DD` date or an RFC 3339 timestamp
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

fn invalid(column: &str, reason: &str) -> WorkspaceError {
    WorkspaceError::InvalidField {
        column: column.to_string(),
        reason: reason.to_string(),
    }
}
