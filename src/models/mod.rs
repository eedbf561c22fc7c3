mod category;
mod exchange;
mod expense;
mod report;
pub use category::*;
pub use exchange::*;
pub use expense::*;
pub use report::*;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::currency_service::CurrencyService;
use crate::error::FieldErrors;
use crate::category_service::CategoryService;
use crate::expense_service::ExpenseService;
use crate::report_service::ReportService;

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const BLANK: &str = "This field may not be blank.";
pub(crate) const NULL: &str = "This field may not be null.";

pub(crate) fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// Keeps an explicit `null` apart from an absent key: absent stays `None`
/// through `#[serde(default)]`, while `null` arrives as `Some(Value::Null)`
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Text fields take strings and coerce plain numbers, like a form field would
pub(crate) fn text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err("Not a valid string.".into()),
    }
}

/// Runs `parse` on a supplied field, recording `null` and parse failures under `name`
pub(crate) fn field<T>(
    name: &str,
    value: Option<Value>,
    errors: &mut FieldErrors,
    parse: impl FnOnce(&Value) -> Result<T, String>,
) -> Option<T> {
    match value? {
        Value::Null => {
            errors.add(name, NULL);
            None
        }
        value => match parse(&value) {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                errors.add(name, message);
                None
            }
        },
    }
}

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    pub category_service: CategoryService,
    pub expense_service: ExpenseService,
    pub report_service: ReportService,
    pub currency_service: CurrencyService,
}
impl AppState {
    pub fn new(
        category_service: CategoryService,
        expense_service: ExpenseService,
        report_service: ReportService,
        currency_service: CurrencyService,
    ) -> Self {
        Self {
            category_service,
            expense_service,
            report_service,
            currency_service,
        }
    }
}
