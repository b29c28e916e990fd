use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Money held in integer minor units (cents). Two decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAmount", into = "String")]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub fn minor(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount has more than two decimal places: {0}")]
    TooPrecise(String),

    #[error("Amount is not a decimal number: {0}")]
    Malformed(String),

    #[error("Amount out of range: {0}")]
    OutOfRange(String),
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Accepts `12`, `12.5`, `12.50` and the comma form `12,50`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let normalized = digits.replace(',', ".");
        let (whole, fraction) = match normalized.split_once('.') {
            Some((w, f)) => (w, f),
            None => (normalized.as_str(), ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() && fraction.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(AmountParseError::Malformed(s.to_string()));
        }
        if fraction.len() > 2 {
            return Err(AmountParseError::TooPrecise(s.to_string()));
        }

        let whole_minor = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .map_err(|_| AmountParseError::OutOfRange(s.to_string()))?
        };
        let fraction_minor = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().unwrap_or(0) * 10,
            _ => fraction.parse::<i64>().unwrap_or(0),
        };

        let minor = whole_minor
            .checked_mul(100)
            .and_then(|m| m.checked_add(fraction_minor))
            .ok_or_else(|| AmountParseError::OutOfRange(s.to_string()))?;

        Ok(Amount(if negative { -minor } else { minor }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

/// Clients send either `"12.50"` or `12.5`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(f64),
}

impl TryFrom<RawAmount> for Amount {
    type Error = AmountParseError;

    fn try_from(raw: RawAmount) -> Result<Self, Self::Error> {
        match raw {
            RawAmount::Text(text) => text.parse(),
            // Shortest round-trip formatting keeps literals like 19.76 exact
            RawAmount::Number(n) if n.is_finite() => n.to_string().parse(),
            RawAmount::Number(n) => Err(AmountParseError::Malformed(n.to_string())),
        }
    }
}

/// Closed set of expense categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Lodging,
    Leisure,
    Shopping,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::Food,
        ExpenseCategory::Transport,
        ExpenseCategory::Lodging,
        ExpenseCategory::Leisure,
        ExpenseCategory::Shopping,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "food",
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Lodging => "lodging",
            ExpenseCategory::Leisure => "leisure",
            ExpenseCategory::Shopping => "shopping",
            ExpenseCategory::Other => "other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown expense category: {s}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub concept: String,
    pub amount: Amount,
    pub category: ExpenseCategory,
    pub spent_on: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(trip_id: Uuid, draft: &NewExpense) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id,
            concept: draft.concept.clone(),
            amount: draft.amount,
            category: draft.category,
            spent_on: draft.spent_on,
            notes: draft.notes.clone(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewExpense {
    pub concept: String,
    pub amount: Amount,
    pub category: ExpenseCategory,
    pub spent_on: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_forms() {
        assert_eq!("12.50".parse::<Amount>().unwrap().minor(), 1250);
        assert_eq!("12.5".parse::<Amount>().unwrap().minor(), 1250);
        assert_eq!("12".parse::<Amount>().unwrap().minor(), 1200);
        assert_eq!("0,01".parse::<Amount>().unwrap().minor(), 1);
        assert_eq!(".75".parse::<Amount>().unwrap().minor(), 75);
        assert_eq!("-3.10".parse::<Amount>().unwrap().minor(), -310);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Amount>(), Err(AmountParseError::Empty));
        assert!(matches!("1.234".parse::<Amount>(), Err(AmountParseError::TooPrecise(_))));
        assert!(matches!("12a".parse::<Amount>(), Err(AmountParseError::Malformed(_))));
        assert!(matches!(".".parse::<Amount>(), Err(AmountParseError::Malformed(_))));
    }

    #[test]
    fn test_display_pads_minor_units() {
        assert_eq!(Amount::from_minor(1976).to_string(), "19.76");
        assert_eq!(Amount::from_minor(5).to_string(), "0.05");
        assert_eq!(Amount::from_minor(-250).to_string(), "-2.50");
    }

    #[test]
    fn test_amount_accepts_json_numbers_and_strings() {
        let from_number: Amount = serde_json::from_str("19.76").unwrap();
        let from_text: Amount = serde_json::from_str("\"7.25\"").unwrap();
        assert_eq!(from_number.minor(), 1976);
        assert_eq!(from_text.minor(), 725);
        assert_eq!(serde_json::to_string(&from_text).unwrap(), "\"7.25\"");
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in ExpenseCategory::ALL {
            assert_eq!(category.as_str().parse::<ExpenseCategory>().unwrap(), category);
        }
        assert!("souvenirs".parse::<ExpenseCategory>().is_err());
    }
}
