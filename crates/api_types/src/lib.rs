use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Decimal amount as exchanged with the backend.
///
/// The backend renders decimals as strings (`"10.00"`) in serialized records
/// and as plain numbers in aggregates, so both shapes are accepted. The raw
/// text is kept untouched; [`Amount::as_f64`] is the only numeric view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Amount(String);

impl Amount {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the amount as a float. Returns `None` for empty, non-numeric
    /// or non-finite text.
    pub fn as_f64(&self) -> Option<f64> {
        self.0
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Integer(value) => Self(value.to_string()),
            Raw::Float(value) => Self(value.to_string()),
        })
    }
}

/// Access/refresh pair returned by the token endpoint.
pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Credentials {
        pub username: String,
        pub password: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TokenPair {
        pub access: String,
        pub refresh: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenRefresh {
        pub refresh: String,
    }

    /// Response of the refresh endpoint.
    ///
    /// `refresh` is only present when the backend rotates refresh tokens.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccessToken {
        pub access: String,
        #[serde(default)]
        pub refresh: Option<String>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum CategoryType {
        #[default]
        Expense,
        Income,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Category {
        pub id: i64,
        pub name: String,
        #[serde(default)]
        pub category_type: CategoryType,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub category_type: CategoryType,
    }
}

pub mod expense {
    use super::{category::Category, *};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Expense {
        pub id: i64,
        pub category: Category,
        pub amount: Amount,
        /// `YYYY-MM-DD`.
        pub date: String,
        pub note: Option<String>,
    }

    /// Create/update body. The category is referenced by id.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub category_id: i64,
        pub amount: Amount,
        pub date: String,
        pub note: Option<String>,
    }
}

pub mod income {
    use super::{category::Category, *};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Income {
        pub id: i64,
        pub category: Category,
        pub amount: Amount,
        pub date: String,
        pub note: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct IncomeNew {
        pub category_id: i64,
        pub amount: Amount,
        pub date: String,
        pub note: Option<String>,
    }
}

pub mod budget {
    use super::{category::Category, *};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Budget {
        pub id: i64,
        pub category: Category,
        pub start_date: String,
        pub end_date: String,
        pub amount: Amount,
        pub note: Option<String>,
        /// Comma-separated `YYYY-MM-DD` checkpoints.
        #[serde(default)]
        pub dates: String,
        #[serde(default)]
        pub remaining_amount: Option<Amount>,
        /// Whole-number percentage (`82.50` for 82.5%).
        #[serde(default)]
        pub percentage: Option<Amount>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub category_id: i64,
        pub start_date: String,
        pub end_date: String,
        pub amount: Amount,
        pub note: Option<String>,
    }
}

pub mod goal {
    use super::*;

    pub const STATUS_NOT_STARTED: &str = "Not Started";
    pub const STATUS_IN_PROGRESS: &str = "In Progress";
    pub const STATUS_COMPLETED: &str = "Completed";

    /// Statuses offered by the goal forms.
    pub const STATUSES: [&str; 3] = [STATUS_NOT_STARTED, STATUS_IN_PROGRESS, STATUS_COMPLETED];

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Goal {
        pub id: i64,
        pub name: String,
        pub target: Amount,
        pub deadline: String,
        pub note: Option<String>,
        pub status: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub target: Amount,
        pub deadline: String,
        pub note: Option<String>,
        pub status: String,
    }
}

pub mod client {
    use super::*;

    /// A customer the user invoices projects to.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Client {
        pub id: i64,
        pub name: String,
        #[serde(default)]
        pub email: Option<String>,
        #[serde(default)]
        pub phone_number: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ClientNew {
        pub name: String,
        pub email: String,
        pub phone_number: Option<String>,
    }
}

pub mod project {
    use super::{client::Client, *};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Project {
        pub id: i64,
        pub name: String,
        pub date_created: String,
        pub note: Option<String>,
        #[serde(default)]
        pub client: Option<Client>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ProjectNew {
        pub name: String,
        pub date_created: String,
        pub note: Option<String>,
        pub client_id: i64,
    }
}

pub mod dashboard {
    use super::{budget::Budget, expense::Expense, goal::Goal, income::Income, *};

    /// Aggregate returned by `GET /api/dashboard/`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Dashboard {
        pub recent_expenses: Vec<Expense>,
        pub recent_income: Vec<Income>,
        pub recent_budgets: Vec<Budget>,
        pub recent_goals: Vec<Goal>,
        pub income_total: Amount,
        pub expense_total: Amount,
        pub net_total: Amount,
        pub number_of_budgets: u64,
        pub number_of_goals: u64,
    }
}
