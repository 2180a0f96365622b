//! Typed access to aliased columns of a raw result row, and coercion of
//! textual filter values into SQL values for a declared column.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Alias, Expr, Func};
use sea_orm::{DbErr, QueryResult, TryGetable, Value};
use std::str::FromStr;
use thiserror::Error;

/// Storage kind of a declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// 64-bit integer (primary and foreign keys)
    BigInt,
    Text,
    Timestamp,
    Decimal,
    /// Upper-snake string constant out of a closed set
    Enum(&'static [&'static str]),
}

/// One column an entity declares: its JSON property name, SQL column and kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub property: &'static str,
    pub column: &'static str,
    pub kind: ColumnKind,
}

impl ColumnDescriptor {
    pub const fn new(property: &'static str, column: &'static str, kind: ColumnKind) -> Self {
        Self {
            property,
            column,
            kind,
        }
    }

    /// Matches either the JSON property or the SQL column name
    pub fn matches(&self, name: &str) -> bool {
        self.property == name || self.column == name
    }

    /// The column under table alias `alias`, as filters and sorts compare it.
    /// Decimals are compared numerically even where they are stored as text.
    pub fn sql_expr(&self, alias: &str) -> Expr {
        let col = Expr::col((Alias::new(alias), Alias::new(self.column)));
        match self.kind {
            ColumnKind::Decimal => Expr::expr(Func::cast_as(col, Alias::new("NUMERIC"))),
            _ => col,
        }
    }
}

/// Finds the column declared under `name` (property or column name)
pub fn resolve<'a>(columns: &'a [ColumnDescriptor], name: &str) -> Option<&'a ColumnDescriptor> {
    columns.iter().find(|c| c.matches(name))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("'{value}' is not a valid integer")]
    InvalidInteger { value: String },

    #[error("'{value}' is not a valid decimal")]
    InvalidDecimal { value: String },

    #[error("'{value}' is not a valid timestamp")]
    InvalidTimestamp { value: String },

    #[error("'{value}' is not one of {allowed:?}")]
    UnknownConstant {
        value: String,
        allowed: &'static [&'static str],
    },
}

pub struct ColumnConverter;

impl ColumnConverter {
    /// Reads the column aliased `alias`. NULL and columns absent from the
    /// row both come back as `None`.
    pub fn read<T>(row: &QueryResult, alias: &str) -> Result<Option<T>, DbErr>
    where
        T: TryGetable,
    {
        match row.try_get_by::<Option<T>, _>(alias) {
            Ok(value) => Ok(value),
            Err(_) if !Self::has_column(row, alias) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Reads a column whose stored string must name one of an enum's constants.
    pub fn read_enum<T>(row: &QueryResult, alias: &str) -> Result<Option<T>, DbErr>
    where
        T: FromStr,
    {
        match Self::read::<String>(row, alias)? {
            None => Ok(None),
            Some(raw) => T::from_str(&raw)
                .map(Some)
                .map_err(|_| DbErr::Type(format!("unexpected value '{raw}' in column {alias}"))),
        }
    }

    /// Reads a decimal and drops trailing zeros from its scale. Text columns
    /// (SQLite keeps exact amounts that way) are parsed; numeric columns are
    /// decoded natively.
    pub fn read_decimal(row: &QueryResult, alias: &str) -> Result<Option<Decimal>, DbErr> {
        let value = match Self::read::<String>(row, alias) {
            Ok(text) => text
                .map(|raw| {
                    Decimal::from_str(raw.trim()).map_err(|_| {
                        DbErr::Type(format!("unexpected value '{raw}' in column {alias}"))
                    })
                })
                .transpose()?,
            Err(_) => Self::read::<Decimal>(row, alias)?,
        };
        Ok(value.map(|d| d.normalize()))
    }

    fn has_column(row: &QueryResult, alias: &str) -> bool {
        row.column_names().iter().any(|name| name == alias)
    }

    /// Coerces a raw text value into an SQL value of the given kind.
    pub fn coerce(kind: ColumnKind, raw: &str) -> Result<Value, ConversionError> {
        let trimmed = raw.trim();
        match kind {
            ColumnKind::BigInt => trimmed
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| ConversionError::InvalidInteger {
                    value: raw.to_string(),
                }),
            ColumnKind::Text => Ok(Value::from(raw.to_string())),
            ColumnKind::Decimal => Decimal::from_str(trimmed)
                .map(Value::from)
                .map_err(|_| ConversionError::InvalidDecimal {
                    value: raw.to_string(),
                }),
            ColumnKind::Timestamp => parse_timestamp(trimmed)
                .map(Value::from)
                .ok_or_else(|| ConversionError::InvalidTimestamp {
                    value: raw.to_string(),
                }),
            ColumnKind::Enum(allowed) => allowed
                .iter()
                .find(|constant| **constant == trimmed)
                .map(|constant| Value::from(constant.to_string()))
                .ok_or_else(|| ConversionError::UnknownConstant {
                    value: raw.to_string(),
                    allowed,
                }),
        }
    }
}

/// Accepts RFC 3339 instants, naive date-times (taken as UTC) and bare dates.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
