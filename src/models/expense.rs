use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::{error::FieldErrors, AppError};

use super::{field, present, text, too_long, BLANK, NULL, REQUIRED};

pub const DEFAULT_CURRENCY: &str = "INR";
pub const TITLE_MAX_LEN: usize = 120;
const MAX_INTEGER_DIGITS: usize = 10;
const DECIMAL_PLACES: u32 = 2;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Expense as returned by the API, with the category name joined in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: i64,
    pub title: String,
    pub amount: Decimal,
    pub currency: String,
    pub expense_date: NaiveDate,
    pub notes: String,
    #[sqlx(rename = "category_id")]
    pub category: i64,
    pub category_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Most recent `expense_date` first, then most recently created
    pub fn default_order(a: &Expense, b: &Expense) -> Ordering {
        b.expense_date
            .cmp(&a.expense_date)
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// Raw request body. Fields stay loosely typed so a wrong type or an explicit
/// `null` becomes a per-field message instead of a rejected body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpensePayload {
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub amount: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub currency: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub expense_date: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Value>,
}

/// Fields that passed validation; `None` means not supplied (or rejected)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub expense_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// A complete, validated expense ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub category_id: i64,
    pub title: String,
    pub amount: Decimal,
    pub currency: String,
    pub expense_date: NaiveDate,
    pub notes: String,
}

impl ExpensePayload {
    /// Checks every supplied field. With `partial == false` the required fields
    /// must be present. Problems are recorded in `errors`.
    pub fn parse(self, partial: bool, errors: &mut FieldErrors) -> ExpensePatch {
        let missing = |name: &str, supplied: bool, errors: &mut FieldErrors| {
            if !partial && !supplied {
                errors.add(name, REQUIRED);
            }
        };
        missing("category", self.category.is_some(), errors);
        missing("title", self.title.is_some(), errors);
        missing("amount", self.amount.is_some(), errors);
        missing("expense_date", self.expense_date.is_some(), errors);

        ExpensePatch {
            category_id: field("category", self.category, errors, parse_category),
            title: field("title", self.title, errors, parse_title),
            amount: field("amount", self.amount, errors, parse_amount),
            currency: field("currency", self.currency, errors, |value| {
                parse_currency(&text(value)?)
            }),
            expense_date: field("expense_date", self.expense_date, errors, parse_date),
            notes: field("notes", self.notes, errors, |value| {
                text(value).map(|notes| notes.trim().to_string())
            }),
        }
    }
}

impl ExpensePatch {
    /// Fills unsupplied fields from `current` (update) or defaults (create)
    pub fn into_draft(self, current: Option<&Expense>) -> crate::Result<ExpenseDraft> {
        let category_id = self.category_id.or(current.map(|c| c.category));
        let title = self.title.or_else(|| current.map(|c| c.title.clone()));
        let amount = self.amount.or(current.map(|c| c.amount));
        let expense_date = self.expense_date.or(current.map(|c| c.expense_date));
        let currency = self
            .currency
            .or_else(|| current.map(|c| c.currency.clone()))
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let notes = self
            .notes
            .or_else(|| current.map(|c| c.notes.clone()))
            .unwrap_or_default();
        match (category_id, title, amount, expense_date) {
            (Some(category_id), Some(title), Some(amount), Some(expense_date)) => {
                Ok(ExpenseDraft {
                    category_id,
                    title,
                    amount,
                    currency,
                    expense_date,
                    notes,
                })
            }
            (category_id, title, amount, expense_date) => {
                let mut errors = FieldErrors::new();
                for (field, present) in [
                    ("category", category_id.is_some()),
                    ("title", title.is_some()),
                    ("amount", amount.is_some()),
                    ("expense_date", expense_date.is_some()),
                ] {
                    if !present {
                        errors.add(field, REQUIRED);
                    }
                }
                Err(AppError::Validation(errors))
            }
        }
    }
}

fn parse_category(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("Incorrect type. Expected pk value, received {n}.")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| "Incorrect type. Expected pk value, received str.".to_string()),
        Value::Bool(_) => Err("Incorrect type. Expected pk value, received bool.".into()),
        Value::Array(_) => Err("Incorrect type. Expected pk value, received list.".into()),
        Value::Object(_) => Err("Incorrect type. Expected pk value, received dict.".into()),
        Value::Null => Err(NULL.into()),
    }
}

fn parse_title(value: &Value) -> Result<String, String> {
    let title = text(value)?;
    let title = title.trim();
    if title.is_empty() {
        Err(BLANK.into())
    } else if title.chars().count() > TITLE_MAX_LEN {
        Err(too_long(TITLE_MAX_LEN))
    } else {
        Ok(title.to_string())
    }
}

/// Parses an amount given as a JSON string or number into a two-place decimal.
/// Precision is checked on the literal itself, so nothing is rounded first.
pub fn parse_amount(value: &Value) -> Result<Decimal, String> {
    const INVALID: &str = "A valid number is required.";
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(INVALID.into()),
    };
    let (integer_digits, decimal_places) = digit_counts(&raw).ok_or(INVALID)?;
    if decimal_places > DECIMAL_PLACES as usize {
        return Err(format!(
            "Ensure that there are no more than {DECIMAL_PLACES} decimal places."
        ));
    }
    if integer_digits > MAX_INTEGER_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {MAX_INTEGER_DIGITS} digits before the decimal point."
        ));
    }
    let mut amount = Decimal::from_str_exact(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| INVALID.to_string())?
        .normalize();
    amount.rescale(DECIMAL_PLACES);
    Ok(amount)
}

/// Significant digits before and after the point of a decimal literal,
/// optionally signed and with an exponent. `None` when it is not a number.
fn digit_counts(raw: &str) -> Option<(usize, usize)> {
    let unsigned = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().ok()?),
        None => (unsigned, 0),
    };
    let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    if !integer.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let digits = [integer, fraction].concat();
    let leading = digits.len() - digits.trim_start_matches('0').len();
    if leading == digits.len() {
        return Some((0, 0));
    }
    let significant_end = digits.trim_end_matches('0').len() as i64;
    let point = integer.len() as i64 + i64::from(exponent);
    let integer_digits = (point - leading as i64).max(0) as usize;
    let decimal_places = (significant_end - point).max(0) as usize;
    Some((integer_digits, decimal_places))
}

fn parse_currency(raw: &str) -> Result<String, String> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(BLANK.into());
    }
    if code.chars().count() > 3 {
        return Err(too_long(3));
    }
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err("Enter a 3-letter currency code.".into());
    }
    Ok(code.to_ascii_uppercase())
}

fn parse_date(value: &Value) -> Result<NaiveDate, String> {
    const WRONG_FORMAT: &str =
        "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
    match value {
        Value::String(s) => {
            NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| WRONG_FORMAT.into())
        }
        _ => Err(WRONG_FORMAT.into()),
    }
}

/// Query string accepted by the expense list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseQuery {
    pub category: Option<i64>,
    pub currency: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ExpenseQuery {
    pub fn validate(&self) -> crate::Result<()> {
        if self.limit.is_some_and(|l| l < 0) || self.offset.is_some_and(|o| o < 0) {
            return Err(AppError::BadRequest(
                "limit and offset must not be negative".into(),
            ));
        }
        Ok(())
    }
    pub fn currency_code(&self) -> Option<String> {
        self.currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_ascii_uppercase)
    }
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
    pub fn matches(&self, expense: &Expense) -> bool {
        if self.category.is_some_and(|c| c != expense.category) {
            return false;
        }
        if let Some(code) = self.currency_code() {
            if !expense.currency.eq_ignore_ascii_case(&code) {
                return false;
            }
        }
        if let Some(term) = self.search_term() {
            let term = term.to_lowercase();
            return expense.title.to_lowercase().contains(&term)
                || expense.notes.to_lowercase().contains(&term);
        }
        true
    }
    /// Applies offset and limit to an already filtered and ordered list
    pub fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = self.offset.unwrap_or(0).max(0) as usize;
        let iter = items.into_iter().skip(offset);
        match self.limit {
            Some(limit) => iter.take(limit.max(0) as usize).collect(),
            None => iter.collect(),
        }
    }
}
