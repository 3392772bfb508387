//! Translation of declarative filter and sort descriptors into a diesel query
//! against the `customers` table.
//!
//! Descriptors arrive exactly as a caller sent them - every field optional and
//! every enumeration a plain string - and are validated completely by
//! [`CustomerQuery::compile`] before any connection is taken from the pool.
//!
//! Filter clauses chain left-associatively: each clause after the first is
//! joined to the predicate accumulated so far, so `a AND b OR c` is evaluated
//! as `(a AND b) OR c`. There is no grouping.

use crate::{schema::customers, status::CustomerStatus};
use diesel::{expression::BoxableExpression, pg::Pg, prelude::*, sql_types::Bool};
use itertools::Itertools;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("filter clause {index} is missing its {part}")]
    MissingFilterPart { index: usize, part: &'static str },
    #[error("sort clause {index} is missing its {part}")]
    MissingSortPart { index: usize, part: &'static str },
    #[error("unknown comparison '{0}' - expected one of: matches, like, greater, smaller")]
    UnknownComparison(String),
    #[error("unknown chain type '{0}' - expected one of: and, or")]
    UnknownChainType(String),
    #[error("invalid sort direction '{0}' - expected asc or desc")]
    InvalidSortDirection(String),
    #[error("unknown field '{name}' - expected one of: {expected}")]
    UnknownField { name: String, expected: String },
    #[error("comparison '{comparison}' is not supported on field '{field}'")]
    UnsupportedComparison {
        field: &'static str,
        comparison: &'static str,
    },
    #[error("invalid value for field '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// One filter descriptor as supplied by a caller
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterClause {
    pub field_name: Option<String>,
    pub value: Option<String>,
    pub comparison: Option<String>,
    pub chain_type: Option<String>,
}

impl FilterClause {
    pub fn new(field_name: &str, comparison: &str, value: &str) -> Self {
        Self {
            field_name: Some(field_name.to_owned()),
            value: Some(value.to_owned()),
            comparison: Some(comparison.to_owned()),
            chain_type: None,
        }
    }

    pub fn chained(mut self, chain_type: &str) -> Self {
        self.chain_type = Some(chain_type.to_owned());
        self
    }
}

/// One sort descriptor as supplied by a caller
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortClause {
    pub field_name: Option<String>,
    pub direction: Option<String>,
}

impl SortClause {
    pub fn new(field_name: &str, direction: &str) -> Self {
        Self {
            field_name: Some(field_name.to_owned()),
            direction: Some(direction.to_owned()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Matches,
    Like,
    Greater,
    Smaller,
}

impl Comparison {
    fn as_str(&self) -> &'static str {
        match self {
            Comparison::Matches => "matches",
            Comparison::Like => "like",
            Comparison::Greater => "greater",
            Comparison::Smaller => "smaller",
        }
    }
}

impl FromStr for Comparison {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "matches" => Ok(Comparison::Matches),
            "like" => Ok(Comparison::Like),
            "greater" => Ok(Comparison::Greater),
            "smaller" => Ok(Comparison::Smaller),
            other => Err(Error::UnknownComparison(other.to_owned())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainType {
    And,
    Or,
}

impl FromStr for ChainType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(ChainType::And),
            "or" => Ok(ChainType::Or),
            other => Err(Error::UnknownChainType(other.to_owned())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(Error::InvalidSortDirection(other.to_owned())),
        }
    }
}

/// A free text column of the `customers` table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextField {
    Id,
    Name,
    Email,
    Landline,
    Mobile,
    Address,
    City,
    ZipCode,
    Country,
}

/// A column of the `customers` table that may be filtered or sorted on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Text(TextField),
    Status,
    Creation,
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::Text(TextField::Id),
        Field::Status,
        Field::Creation,
        Field::Text(TextField::Name),
        Field::Text(TextField::Email),
        Field::Text(TextField::Landline),
        Field::Text(TextField::Mobile),
        Field::Text(TextField::Address),
        Field::Text(TextField::City),
        Field::Text(TextField::ZipCode),
        Field::Text(TextField::Country),
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            Field::Text(TextField::Id) => "id",
            Field::Status => "status",
            Field::Creation => "creation",
            Field::Text(TextField::Name) => "name",
            Field::Text(TextField::Email) => "email",
            Field::Text(TextField::Landline) => "landline",
            Field::Text(TextField::Mobile) => "mobile",
            Field::Text(TextField::Address) => "address",
            Field::Text(TextField::City) => "city",
            Field::Text(TextField::ZipCode) => "zip_code",
            Field::Text(TextField::Country) => "country",
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .find(|field| field.column_name() == s)
            .copied()
            .ok_or_else(|| Error::UnknownField {
                name: s.to_owned(),
                expected: Field::ALL.iter().map(Field::column_name).join(", "),
            })
    }
}

/// Comparisons that are meaningful on non-text columns
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ordering {
    Matches,
    Greater,
    Smaller,
}

impl Ordering {
    fn for_field(field: Field, comparison: Comparison) -> Result<Self, Error> {
        match comparison {
            Comparison::Matches => Ok(Ordering::Matches),
            Comparison::Greater => Ok(Ordering::Greater),
            Comparison::Smaller => Ok(Ordering::Smaller),
            Comparison::Like => Err(Error::UnsupportedComparison {
                field: field.column_name(),
                comparison: comparison.as_str(),
            }),
        }
    }
}

/// A single validated `field <op> value` condition with its value already
/// converted to the column's type
#[derive(Clone, Debug, PartialEq)]
enum Condition {
    Text(TextField, Comparison, String),
    Status(Ordering, i16),
    Creation(Ordering, jiff::Timestamp),
}

impl Condition {
    fn compile(field: Field, comparison: Comparison, value: String) -> Result<Self, Error> {
        match field {
            Field::Status => {
                let status = value
                    .parse::<CustomerStatus>()
                    .map_err(|err| Error::InvalidValue {
                        field: field.column_name(),
                        reason: err.to_string(),
                    })?;
                Ok(Condition::Status(
                    Ordering::for_field(field, comparison)?,
                    status.into(),
                ))
            }
            Field::Creation => {
                let timestamp = value
                    .trim()
                    .parse::<jiff::Timestamp>()
                    .map_err(|err| Error::InvalidValue {
                        field: field.column_name(),
                        reason: err.to_string(),
                    })?;
                Ok(Condition::Creation(
                    Ordering::for_field(field, comparison)?,
                    timestamp,
                ))
            }
            Field::Text(text) => Ok(Condition::Text(text, comparison, value)),
        }
    }

    fn predicate(&self) -> CustomerPredicate {
        macro_rules! text {
            ($column:expr, $comparison:expr, $value:expr) => {
                match $comparison {
                    Comparison::Matches => Box::new($column.eq($value)) as CustomerPredicate,
                    Comparison::Like => Box::new($column.like($value)),
                    Comparison::Greater => Box::new($column.gt($value)),
                    Comparison::Smaller => Box::new($column.lt($value)),
                }
            };
        }
        macro_rules! ordered {
            ($column:expr, $ordering:expr, $value:expr) => {
                match $ordering {
                    Ordering::Matches => Box::new($column.eq($value)) as CustomerPredicate,
                    Ordering::Greater => Box::new($column.gt($value)),
                    Ordering::Smaller => Box::new($column.lt($value)),
                }
            };
        }
        match self {
            Condition::Text(field, comparison, value) => {
                let value = value.clone();
                match field {
                    TextField::Id => text!(customers::id, comparison, value),
                    TextField::Name => text!(customers::name, comparison, value),
                    TextField::Email => text!(customers::email, comparison, value),
                    TextField::Landline => text!(customers::landline, comparison, value),
                    TextField::Mobile => text!(customers::mobile, comparison, value),
                    TextField::Address => text!(customers::address, comparison, value),
                    TextField::City => text!(customers::city, comparison, value),
                    TextField::ZipCode => text!(customers::zip_code, comparison, value),
                    TextField::Country => text!(customers::country, comparison, value),
                }
            }
            Condition::Status(ordering, value) => ordered!(customers::status, ordering, *value),
            Condition::Creation(ordering, timestamp) => {
                let value: jiff_diesel::Timestamp = (*timestamp).into();
                ordered!(customers::creation, ordering, value)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SortKey {
    field: Field,
    direction: Direction,
}

pub(crate) type CustomerPredicate = Box<dyn BoxableExpression<customers::table, Pg, SqlType = Bool>>;

/// A validated, ready to execute filter and ordering over the customers table
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomerQuery {
    first: Option<Condition>,
    chained: Vec<(ChainType, Condition)>,
    order: Vec<SortKey>,
}

impl CustomerQuery {
    /// Validates every descriptor and converts it into its typed form. The
    /// chain type of the first filter clause is never looked at.
    pub fn compile(filters: &[FilterClause], sorts: &[SortClause]) -> Result<Self, Error> {
        let mut query = CustomerQuery::default();
        for (index, clause) in filters.iter().enumerate() {
            let missing = |part| Error::MissingFilterPart { index, part };
            let field_name = clause.field_name.as_deref().ok_or_else(|| missing("fieldName"))?;
            let value = clause.value.clone().ok_or_else(|| missing("value"))?;
            let comparison = clause.comparison.as_deref().ok_or_else(|| missing("comparison"))?;
            let comparison = comparison.parse::<Comparison>()?;
            if index == 0 {
                let field = field_name.parse::<Field>()?;
                query.first = Some(Condition::compile(field, comparison, value)?);
            } else {
                let chain_type = clause
                    .chain_type
                    .as_deref()
                    .ok_or_else(|| missing("chainType"))?
                    .parse::<ChainType>()?;
                let field = field_name.parse::<Field>()?;
                query
                    .chained
                    .push((chain_type, Condition::compile(field, comparison, value)?));
            }
        }
        for (index, clause) in sorts.iter().enumerate() {
            let missing = |part| Error::MissingSortPart { index, part };
            let field_name = clause.field_name.as_deref().ok_or_else(|| missing("fieldName"))?;
            let direction = clause.direction.as_deref().ok_or_else(|| missing("direction"))?;
            let direction = direction.parse::<Direction>()?;
            query.order.push(SortKey {
                field: field_name.parse::<Field>()?,
                direction,
            });
        }
        Ok(query)
    }

    /// The composed predicate, `None` when every row is wanted
    pub(crate) fn predicate(&self) -> Option<CustomerPredicate> {
        let first = self.first.as_ref()?.predicate();
        Some(
            self.chained
                .iter()
                .fold(first, |accumulated, (chain_type, condition)| -> CustomerPredicate {
                    match chain_type {
                        ChainType::And => Box::new(accumulated.and(condition.predicate())),
                        ChainType::Or => Box::new(accumulated.or(condition.predicate())),
                    }
                }),
        )
    }

    /// Builds the boxed select statement with the predicate and every sort key applied in order
    pub(crate) fn to_boxed(&self) -> customers::BoxedQuery<'static, Pg> {
        let mut query = customers::table.into_boxed();
        if let Some(predicate) = self.predicate() {
            query = query.filter(predicate);
        }
        macro_rules! sort_by {
            ($query:expr, $direction:expr, $column:expr) => {
                match $direction {
                    Direction::Asc => $query.then_order_by($column.asc()),
                    Direction::Desc => $query.then_order_by($column.desc()),
                }
            };
        }
        for key in &self.order {
            query = match key.field {
                Field::Text(TextField::Id) => sort_by!(query, key.direction, customers::id),
                Field::Status => sort_by!(query, key.direction, customers::status),
                Field::Creation => sort_by!(query, key.direction, customers::creation),
                Field::Text(TextField::Name) => sort_by!(query, key.direction, customers::name),
                Field::Text(TextField::Email) => sort_by!(query, key.direction, customers::email),
                Field::Text(TextField::Landline) => sort_by!(query, key.direction, customers::landline),
                Field::Text(TextField::Mobile) => sort_by!(query, key.direction, customers::mobile),
                Field::Text(TextField::Address) => sort_by!(query, key.direction, customers::address),
                Field::Text(TextField::City) => sort_by!(query, key.direction, customers::city),
                Field::Text(TextField::ZipCode) => sort_by!(query, key.direction, customers::zip_code),
                Field::Text(TextField::Country) => sort_by!(query, key.direction, customers::country),
            };
        }
        query
    }
}
