use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of transaction kinds, stored as lowercase text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transaction type '{}'", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for TransactionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated insert shape. The owner is supplied separately by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
}

/// Validated partial update. `None` leaves the stored value alone;
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionChanges {
    pub kind: Option<TransactionKind>,
    pub amount: Option<Decimal>,
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
}

impl TransactionChanges {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.amount.is_none() && self.description.is_none() && self.date.is_none()
    }

    /// Apply the supplied fields to `transaction` in place.
    pub fn apply_to(&self, transaction: &mut Transaction) {
        if let Some(kind) = self.kind {
            transaction.kind = kind;
        }
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(description) = &self.description {
            transaction.description = description.clone();
        }
        if let Some(date) = self.date {
            transaction.date = date;
        }
    }
}

/// Raw create/update body. Every field is optional here so that missing or
/// malformed input is reported as a validation error rather than a JSON error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<serde_json::Value>,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// Per-kind sums for one owner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub count: i64,
}

impl From<TransactionTotals> for Summary {
    fn from(totals: TransactionTotals) -> Self {
        let mut income = totals.income;
        let mut expense = totals.expense;
        let mut balance = income - expense;
        income.rescale(2);
        expense.rescale(2);
        balance.rescale(2);
        Self {
            income,
            expense,
            balance,
            count: totals.count,
        }
    }
}
