//! Datastore search filters and their compilation into a Solr query.
//!
//! A filters file is what the advanced search page of the IATI Datastore lets
//! users download: an ordered list of clauses, each naming an index field, a
//! typed value, a comparison operator and the boolean operator joining it to
//! the previous clause. Parentheses are encoded as extra `grouping` clauses
//! whose value is `(` or `)`.
//!
//! [`compile`] turns such a list into the text of the `q` parameter.

mod clause;
mod compile;
mod value;

use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error_handling::FilterError;

pub use clause::{build_tree, Clause};
pub use compile::compile;

/// Value type of a filter; decides how the value is formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Free text, parenthesized and sanitized
    Text,
    /// Value picked from a code list, treated like text
    Combo,
    /// Calendar date, normalized to midnight UTC
    Date,
    /// Decimal number
    Number,
    /// Whole number
    Integer,
    /// Literal `(` or `)`
    Grouping,
    /// Any type this exporter does not know; emitted like text, value unformatted
    #[serde(other)]
    Other,
}

/// Comparison between field and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// `field:value`
    Equals,
    /// `(*:* -field:value)`
    NotEquals,
    /// `field:[* TO value]`
    LessThan,
    /// `field:[value TO *]`
    GreaterThan,
    /// Any operator string this exporter does not know
    #[serde(other)]
    Unsupported,
}

/// Boolean operator joining a clause to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOperator {
    /// Both clauses must match
    And,
    /// Either clause may match
    Or,
    /// Any other non-empty text; joins like `AND` where tolerated
    Unrecognized,
}

impl JoinOperator {
    /// Reads an operator, ignoring case. Blank text is no operator at all.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            None
        } else if text.eq_ignore_ascii_case("and") {
            Some(JoinOperator::And)
        } else if text.eq_ignore_ascii_case("or") {
            Some(JoinOperator::Or)
        } else {
            Some(JoinOperator::Unrecognized)
        }
    }

    /// Query-language keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinOperator::And | JoinOperator::Unrecognized => "AND",
            JoinOperator::Or => "OR",
        }
    }
}

/// One clause of a filters file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Identifier assigned by the search UI (string or number in the file)
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    /// Index field name; empty for grouping filters
    #[serde(default)]
    pub field: String,
    /// Value type
    #[serde(rename = "type")]
    pub kind: FilterType,
    /// Comparison operator; absent for grouping filters
    #[serde(default)]
    pub operator: Option<Operator>,
    /// Value as entered (string or number in the file)
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
    /// Operator joining this clause to the previous one; absent, `null` or blank
    /// text all read as none
    #[serde(default, deserialize_with = "lenient_join_operator")]
    pub join_operator: Option<JoinOperator>,
}

impl Filter {
    /// Whether this is the `(` half of a grouping pair.
    pub fn opens_group(&self) -> bool {
        self.kind == FilterType::Grouping && self.value == "("
    }

    /// Whether this is the `)` half of a grouping pair.
    pub fn closes_group(&self) -> bool {
        self.kind == FilterType::Grouping && self.value == ")"
    }
}

/// Accepts strings, numbers and booleans as text; `null` becomes the empty string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

fn lenient_join_operator<'de, D>(deserializer: D) -> Result<Option<JoinOperator>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = lenient_string(deserializer)?;
    Ok(JoinOperator::parse(&text))
}

/// Parses the contents of a filters file.
///
/// Accepts the `{ "data": [...] }` document the datastore search UI downloads
/// as well as a bare array of filters.
pub fn parse_filters(json: &str) -> Result<Vec<Filter>, serde_json::Error> {
    let document: Value = serde_json::from_str(json)?;
    let list = match document {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or_default(),
        other => other,
    };
    serde_json::from_value(list)
}

/// Reads and parses a filters file.
///
/// # Errors
///
/// Returns `FilterError::Read` when the file cannot be read and
/// `FilterError::Parse` when it is not a filter list.
pub fn load_filters(path: &Path) -> Result<Vec<Filter>, FilterError> {
    let contents = std::fs::read_to_string(path).map_err(|source| FilterError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_filters(&contents).map_err(|source| FilterError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
