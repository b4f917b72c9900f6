//! Client-side filtering and sorting of record lists.
//!
//! [`apply_filters`] never mutates its input: it clones the records that
//! pass every predicate into a new vector and sorts that vector. Predicates
//! compose by logical AND, so the order they run in does not change the
//! result.

use std::{cmp::Ordering, fmt, str::FromStr};

use api_types::Amount;
use serde::{Deserialize, Deserializer, Serialize, de};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{FilterError, Filterable};

/// An id picked from a dropdown, or no restriction.
///
/// Parsed from the raw form value: empty or `"all"` select everything, an
/// integer selects that id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Id(i64),
}

impl Selection {
    fn matches(self, id: Option<i64>) -> bool {
        match self {
            Self::All => true,
            Self::Id(wanted) => id == Some(wanted),
        }
    }
}

impl FromStr for Selection {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "all" {
            return Ok(Self::All);
        }
        trimmed
            .parse::<i64>()
            .map(Self::Id)
            .map_err(|_| FilterError::InvalidSelection(s.to_string()))
    }
}

impl TryFrom<String> for Selection {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Selection> for String {
    fn from(value: Selection) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[serde(alias = "dateCreated")]
    Date,
    Amount,
    Name,
    Client,
}

impl FromStr for SortKey {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" | "dateCreated" => Ok(Self::Date),
            "amount" => Ok(Self::Amount),
            "name" => Ok(Self::Name),
            "client" => Ok(Self::Client),
            other => Err(FilterError::UnknownSortKey(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(FilterError::UnknownSortOrder(other.to_string())),
        }
    }
}

/// Filter and sort options for a record list.
///
/// Empty strings are treated like absent options, matching what form inputs
/// hand over when a field is cleared.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSpec {
    pub category: Selection,
    pub client: Selection,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub date_to: Option<String>,
    #[serde(deserialize_with = "deserialize_bound")]
    pub amount_min: Option<f64>,
    #[serde(deserialize_with = "deserialize_bound")]
    pub amount_max: Option<f64>,
    pub search_text: Option<String>,
    /// Exact status match; `"all"` disables it.
    pub status: Option<String>,
    /// `None` keeps the input order.
    pub sort_by: Option<SortKey>,
    pub sort_order: SortOrder,
}

impl FilterSpec {
    fn sorted(key: SortKey, order: SortOrder) -> Self {
        Self {
            sort_by: Some(key),
            sort_order: order,
            ..Self::default()
        }
    }

    /// Expense list default: newest first.
    pub fn expenses() -> Self {
        Self::sorted(SortKey::Date, SortOrder::Desc)
    }

    pub fn income() -> Self {
        Self::sorted(SortKey::Date, SortOrder::Desc)
    }

    pub fn budgets() -> Self {
        Self::default()
    }

    pub fn goals() -> Self {
        Self::default()
    }

    pub fn projects() -> Self {
        Self::sorted(SortKey::Date, SortOrder::Desc)
    }

    /// Client list default: names from Z to A.
    pub fn clients() -> Self {
        Self::sorted(SortKey::Name, SortOrder::Desc)
    }

    fn matches<R: Filterable>(&self, record: &R) -> bool {
        if !self.category.matches(record.category_id()) {
            return false;
        }
        if !self.client.matches(record.client_id()) {
            return false;
        }
        if let Some(from) = non_empty(&self.date_from)
            && !record.date().is_some_and(|date| date >= from)
        {
            return false;
        }
        if let Some(to) = non_empty(&self.date_to)
            && !record.date().is_some_and(|date| date <= to)
        {
            return false;
        }
        let amount = record.amount().and_then(Amount::as_f64);
        if let Some(min) = self.amount_min
            && !amount.is_some_and(|amount| amount >= min)
        {
            return false;
        }
        if let Some(max) = self.amount_max
            && !amount.is_some_and(|amount| amount <= max)
        {
            return false;
        }
        if let Some(status) = non_empty(&self.status)
            && status != "all"
            && record.status() != Some(status)
        {
            return false;
        }
        if let Some(needle) = non_empty(&self.search_text) {
            let needle = needle.to_lowercase();
            if !record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

/// Amount bounds arrive as numbers or as raw input text; blank text is no
/// bound.
fn deserialize_bound<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(value)) => Ok(Some(value)),
        Some(Raw::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| {
                    <D::Error as de::Error>::custom(format!("invalid amount bound \"{text}\""))
                })
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

/// Returns the records matching `spec`, sorted by its sort key.
///
/// The sort is stable: records with equal keys keep their input order.
pub fn apply_filters<R>(records: &[R], spec: &FilterSpec) -> Vec<R>
where
    R: Filterable + Clone,
{
    let mut out: Vec<R> = records
        .iter()
        .filter(|record| spec.matches(*record))
        .cloned()
        .collect();

    if let Some(key) = spec.sort_by {
        sort_records(&mut out, key, spec.sort_order);
    }
    out
}

fn sort_records<R: Filterable>(records: &mut [R], key: SortKey, order: SortOrder) {
    match key {
        SortKey::Date => records.sort_by(|a, b| {
            order.apply(a.date().unwrap_or("").cmp(b.date().unwrap_or("")))
        }),
        SortKey::Amount => records.sort_by(|a, b| {
            compare_amounts(
                a.amount().and_then(Amount::as_f64),
                b.amount().and_then(Amount::as_f64),
                order,
            )
        }),
        SortKey::Name => {
            records.sort_by_cached_key(|record| collation_key(record.name().unwrap_or("")));
            if order == SortOrder::Desc {
                stable_reverse_by(records, |record| collation_key(record.name().unwrap_or("")));
            }
        }
        SortKey::Client => {
            records
                .sort_by_cached_key(|record| collation_key(record.client_name().unwrap_or("")));
            if order == SortOrder::Desc {
                stable_reverse_by(records, |record| {
                    collation_key(record.client_name().unwrap_or(""))
                });
            }
        }
    }
}

/// Unparseable amounts go last whatever the order.
fn compare_amounts(a: Option<f64>, b: Option<f64>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => order.apply(a.partial_cmp(&b).unwrap_or(Ordering::Equal)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Turns an ascending, stably sorted slice into a descending one while
/// keeping runs of equal keys in their original relative order.
fn stable_reverse_by<R, K, F>(records: &mut [R], key: F)
where
    K: PartialEq,
    F: Fn(&R) -> K,
{
    records.reverse();
    let mut start = 0;
    while start < records.len() {
        let run_key = key(&records[start]);
        let mut end = start + 1;
        while end < records.len() && key(&records[end]) == run_key {
            end += 1;
        }
        records[start..end].reverse();
        start = end;
    }
}

/// Case- and accent-insensitive sort key for display names.
fn collation_key(input: &str) -> String {
    input
        .trim()
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}
