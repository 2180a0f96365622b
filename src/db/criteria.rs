//! Filter expressions supplied by callers, and their translation into
//! sea-query conditions over an aliased table.

use sea_orm::sea_query::{Condition, LikeExpr, SimpleExpr};
use sea_orm::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::column_converter::{resolve, ColumnConverter, ColumnDescriptor, ColumnKind, ConversionError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("Unknown filter field '{0}'")]
    UnknownField(String),

    #[error("Unknown sort property '{0}'")]
    UnknownSortProperty(String),

    #[error("Unknown filter operator '{0}'")]
    UnknownOperator(String),

    #[error("Operator '{operator}' is not supported on field '{field}'")]
    UnsupportedOperator { field: String, operator: Operator },

    #[error("Invalid value for '{field}': {source}")]
    InvalidValue {
        field: String,
        #[source]
        source: ConversionError,
    },

    #[error("Invalid value for '{field}': {message}")]
    Malformed { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    In,
    Specified,
}

/// Right-hand side of a criterion
#[derive(Debug, Clone, PartialEq)]
pub enum CriterionValue {
    /// Text coerced against the column kind when translated
    Raw(String),
    /// Several raw values, for `in`
    RawList(Vec<String>),
    Typed(Value),
    TypedList(Vec<Value>),
    /// `specified=true|false`
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub field: String,
    pub operator: Operator,
    pub value: CriterionValue,
}

impl Criterion {
    pub fn new(field: impl Into<String>, operator: Operator, value: CriterionValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}

/// Expression tree of criteria; leaves are single-field predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    Where(Criterion),
    All(Vec<Criteria>),
    Any(Vec<Criteria>),
}

impl Criteria {
    pub fn field(field: impl Into<String>, operator: Operator, value: CriterionValue) -> Self {
        Criteria::Where(Criterion::new(field, operator, value))
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Operator::Equals, CriterionValue::Typed(value.into()))
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Operator::NotEquals, CriterionValue::Typed(value.into()))
    }

    pub fn greater_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Operator::GreaterThan, CriterionValue::Typed(value.into()))
    }

    pub fn less_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field, Operator::LessThan, CriterionValue::Typed(value.into()))
    }

    pub fn contains(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::field(field, Operator::Contains, CriterionValue::Raw(text.into()))
    }

    pub fn is_in<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::field(
            field,
            Operator::In,
            CriterionValue::TypedList(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::field(field, Operator::Specified, CriterionValue::Flag(false))
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::field(field, Operator::Specified, CriterionValue::Flag(true))
    }

    pub fn and(self, other: Criteria) -> Self {
        match self {
            Criteria::All(mut items) => {
                items.push(other);
                Criteria::All(items)
            }
            first => Criteria::All(vec![first, other]),
        }
    }

    pub fn or(self, other: Criteria) -> Self {
        match self {
            Criteria::Any(mut items) => {
                items.push(other);
                Criteria::Any(items)
            }
            first => Criteria::Any(vec![first, other]),
        }
    }

    /// Builds criteria from `<field>.<operator>=<value>` query pairs.
    ///
    /// Pairs without an operator suffix are not filters and are skipped.
    /// Several filters are combined with `and`; no filters yields `None`.
    pub fn from_query_pairs<'a, I>(pairs: I) -> Result<Option<Criteria>, CriteriaError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filters = Vec::new();
        for (key, raw) in pairs {
            let Some((field, op)) = key.rsplit_once('.') else {
                continue;
            };
            if field.is_empty() {
                return Err(CriteriaError::UnknownField(key.to_string()));
            }
            let operator =
                Operator::from_str(op).map_err(|_| CriteriaError::UnknownOperator(op.to_string()))?;
            let value = match operator {
                Operator::In => CriterionValue::RawList(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(str::to_string)
                        .collect(),
                ),
                Operator::Specified => {
                    CriterionValue::Flag(raw.trim().parse::<bool>().map_err(|_| {
                        CriteriaError::Malformed {
                            field: field.to_string(),
                            message: format!("'{raw}' is not true or false"),
                        }
                    })?)
                }
                _ => CriterionValue::Raw(raw.to_string()),
            };
            filters.push(Criteria::field(field, operator, value));
        }

        Ok(match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Criteria::All(filters)),
        })
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::Where(c) => write!(f, "{}.{}", c.field, c.operator),
            Criteria::All(items) | Criteria::Any(items) => {
                let joiner = if matches!(self, Criteria::All(_)) {
                    " and "
                } else {
                    " or "
                };
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Renders criteria against the columns of one aliased table.
pub struct CriteriaTranslator<'a> {
    alias: &'a str,
    columns: &'a [ColumnDescriptor],
}

impl<'a> CriteriaTranslator<'a> {
    pub fn new(alias: &'a str, columns: &'a [ColumnDescriptor]) -> Self {
        Self { alias, columns }
    }

    pub fn translate(&self, criteria: &Criteria) -> Result<Condition, CriteriaError> {
        match criteria {
            Criteria::Where(criterion) => Ok(Condition::all().add(self.predicate(criterion)?)),
            Criteria::All(items) => items
                .iter()
                .try_fold(Condition::all(), |cond, item| Ok(cond.add(self.translate(item)?))),
            Criteria::Any(items) => items
                .iter()
                .try_fold(Condition::any(), |cond, item| Ok(cond.add(self.translate(item)?))),
        }
    }

    fn predicate(&self, criterion: &Criterion) -> Result<SimpleExpr, CriteriaError> {
        let column = resolve(self.columns, &criterion.field)
            .ok_or_else(|| CriteriaError::UnknownField(criterion.field.clone()))?;
        let col = column.sql_expr(self.alias);
        let unsupported = || CriteriaError::UnsupportedOperator {
            field: criterion.field.clone(),
            operator: criterion.operator,
        };

        let expr = match criterion.operator {
            Operator::Specified => match criterion.value {
                CriterionValue::Flag(true) => col.is_not_null(),
                CriterionValue::Flag(false) => col.is_null(),
                _ => return Err(unsupported()),
            },
            Operator::Contains => {
                if column.kind != ColumnKind::Text {
                    return Err(unsupported());
                }
                let text = match &criterion.value {
                    CriterionValue::Raw(text) => text.clone(),
                    CriterionValue::Typed(Value::String(Some(text))) => text.to_string(),
                    _ => return Err(unsupported()),
                };
                col.like(LikeExpr::new(format!("%{}%", escape_like(&text))).escape('\\'))
            }
            Operator::In => {
                let values = self.values(column, criterion)?;
                col.is_in(values)
            }
            op => {
                let value = self.single_value(column, criterion)?;
                match op {
                    Operator::Equals => col.eq(value),
                    Operator::NotEquals => col.ne(value),
                    Operator::GreaterThan => col.gt(value),
                    Operator::GreaterThanOrEqual => col.gte(value),
                    Operator::LessThan => col.lt(value),
                    Operator::LessThanOrEqual => col.lte(value),
                    _ => return Err(unsupported()),
                }
            }
        };
        Ok(expr)
    }

    fn single_value(
        &self,
        column: &ColumnDescriptor,
        criterion: &Criterion,
    ) -> Result<Value, CriteriaError> {
        match &criterion.value {
            CriterionValue::Raw(raw) => coerce(column, &criterion.field, raw),
            CriterionValue::Typed(value) => Ok(value.clone()),
            _ => Err(CriteriaError::UnsupportedOperator {
                field: criterion.field.clone(),
                operator: criterion.operator,
            }),
        }
    }

    fn values(
        &self,
        column: &ColumnDescriptor,
        criterion: &Criterion,
    ) -> Result<Vec<Value>, CriteriaError> {
        match &criterion.value {
            CriterionValue::RawList(raws) => raws
                .iter()
                .map(|raw| coerce(column, &criterion.field, raw))
                .collect(),
            CriterionValue::TypedList(values) => Ok(values.clone()),
            CriterionValue::Raw(raw) => Ok(vec![coerce(column, &criterion.field, raw)?]),
            CriterionValue::Typed(value) => Ok(vec![value.clone()]),
            CriterionValue::Flag(_) => Err(CriteriaError::UnsupportedOperator {
                field: criterion.field.clone(),
                operator: criterion.operator,
            }),
        }
    }
}

fn coerce(column: &ColumnDescriptor, field: &str, raw: &str) -> Result<Value, CriteriaError> {
    ColumnConverter::coerce(column.kind, raw).map_err(|source| CriteriaError::InvalidValue {
        field: field.to_string(),
        source,
    })
}

// `%` and `_` typed by the caller match literally
fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use sea_orm::sea_query::{Alias, Query, SqliteQueryBuilder};

    const COLUMNS: &[ColumnDescriptor] = &[
        ColumnDescriptor::new("id", "id", ColumnKind::BigInt),
        ColumnDescriptor::new("trackingCode", "tracking_code", ColumnKind::Text),
        ColumnDescriptor::new("status", "status", ColumnKind::Enum(&["PAID", "ISSUED"])),
        ColumnDescriptor::new("paymentAmount", "payment_amount", ColumnKind::Decimal),
    ];

    fn render(criteria: &Criteria) -> String {
        let condition = CriteriaTranslator::new("e", COLUMNS)
            .translate(criteria)
            .unwrap();
        Query::select()
            .column(Alias::new("id"))
            .from_as(Alias::new("shipment"), Alias::new("e"))
            .cond_where(condition)
            .to_string(SqliteQueryBuilder)
    }

    #[rstest]
    #[case("id.equals", "5", r#""e"."id" = 5"#)]
    #[case("id.notEquals", "5", r#""e"."id" <> 5"#)]
    #[case("id.greaterThan", "5", r#""e"."id" > 5"#)]
    #[case("id.greaterThanOrEqual", "5", r#""e"."id" >= 5"#)]
    #[case("id.lessThan", "5", r#""e"."id" < 5"#)]
    #[case("id.lessThanOrEqual", "5", r#""e"."id" <= 5"#)]
    #[case("id.in", "1,2", r#""e"."id" IN (1, 2)"#)]
    #[case("trackingCode.contains", "AB", r#""e"."tracking_code" LIKE '%AB%'"#)]
    #[case("trackingCode.specified", "true", r#""e"."tracking_code" IS NOT NULL"#)]
    #[case("tracking_code.specified", "false", r#""e"."tracking_code" IS NULL"#)]
    #[case("status.equals", "PAID", r#""e"."status" = 'PAID'"#)]
    fn query_pairs_render_expected_predicates(
        #[case] key: &str,
        #[case] value: &str,
        #[case] expected: &str,
    ) {
        let criteria = Criteria::from_query_pairs([(key, value)]).unwrap().unwrap();
        let sql = render(&criteria);
        assert!(sql.contains(expected), "{sql} should contain {expected}");
    }

    #[test]
    fn pairs_without_operator_are_not_filters() {
        let criteria =
            Criteria::from_query_pairs([("page", "0"), ("size", "20"), ("sort", "id,desc")])
                .unwrap();
        assert!(criteria.is_none());
    }

    #[test]
    fn several_pairs_are_conjoined() {
        let criteria =
            Criteria::from_query_pairs([("id.greaterThan", "1"), ("id.lessThan", "9")])
                .unwrap()
                .unwrap();
        assert_matches!(&criteria, Criteria::All(items) if items.len() == 2);
        let sql = render(&criteria);
        assert!(sql.contains(r#""e"."id" > 1 AND "e"."id" < 9"#), "{sql}");
    }

    #[test]
    fn or_combines_into_any() {
        let criteria = Criteria::equals("id", 1i64).or(Criteria::is_null("trackingCode"));
        let sql = render(&criteria);
        assert!(
            sql.contains(r#""e"."id" = 1 OR "e"."tracking_code" IS NULL"#),
            "{sql}"
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        let criteria = Criteria::equals("color", "red");
        let err = CriteriaTranslator::new("e", COLUMNS)
            .translate(&criteria)
            .unwrap_err();
        assert_eq!(err, CriteriaError::UnknownField("color".into()));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let err = Criteria::from_query_pairs([("id.near", "5")]).unwrap_err();
        assert_eq!(err, CriteriaError::UnknownOperator("near".into()));
    }

    #[test]
    fn unparsable_value_is_rejected() {
        let criteria = Criteria::from_query_pairs([("id.equals", "abc")])
            .unwrap()
            .unwrap();
        let err = CriteriaTranslator::new("e", COLUMNS)
            .translate(&criteria)
            .unwrap_err();
        assert_matches!(err, CriteriaError::InvalidValue { ref field, .. } if field == "id");
    }

    #[test]
    fn contains_requires_a_text_column() {
        let criteria = Criteria::contains("id", "1");
        let err = CriteriaTranslator::new("e", COLUMNS)
            .translate(&criteria)
            .unwrap_err();
        assert_matches!(err, CriteriaError::UnsupportedOperator { .. });
    }

    #[test]
    fn contains_escapes_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }

    #[test]
    fn display_shows_the_tree() {
        let criteria = Criteria::equals("id", 1i64).and(Criteria::is_null("trackingCode"));
        assert_eq!(criteria.to_string(), "(id.equals and trackingCode.specified)");
    }

    #[test]
    fn decimal_columns_compare_numerically() {
        let criteria = Criteria::from_query_pairs([("paymentAmount.greaterThan", "100.5")])
            .unwrap()
            .unwrap();
        let sql = render(&criteria);
        assert!(
            sql.contains(r#"CAST("e"."payment_amount" AS NUMERIC) > 100.5"#),
            "{sql}"
        );
    }
}
