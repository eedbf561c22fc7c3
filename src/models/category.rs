use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::error::FieldErrors;

use super::{field, present, text};

pub const CATEGORY_NAME_MAX_LEN: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Request body for category create/update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
}

/// A validated category, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
}

impl CategoryPayload {
    /// Validates a full payload (create, PUT)
    pub fn into_new(self) -> crate::Result<NewCategory> {
        let mut errors = FieldErrors::new();
        if self.name.is_none() {
            errors.add("name", super::REQUIRED);
        }
        let name = field("name", self.name, &mut errors, validate_name);
        errors.into_result()?;
        name.map(|name| NewCategory { name })
            .ok_or_else(|| crate::AppError::BadRequest("name is missing".into()))
    }

    /// Validates a partial payload (PATCH) and merges it over the stored category
    pub fn merge(self, current: &Category) -> crate::Result<NewCategory> {
        match self.name {
            Some(_) => self.into_new(),
            None => Ok(NewCategory {
                name: current.name.clone(),
            }),
        }
    }
}

fn validate_name(value: &Value) -> Result<String, String> {
    let name = text(value)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(super::BLANK.into());
    }
    if name.chars().count() > CATEGORY_NAME_MAX_LEN {
        return Err(super::too_long(CATEGORY_NAME_MAX_LEN));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;
    use serde_json::json;

    #[test]
    fn name_is_trimmed() {
        let payload = CategoryPayload {
            name: Some(json!("  Groceries ")),
        };
        assert_eq!(payload.into_new().unwrap().name, "Groceries");
    }

    #[test]
    fn name_rules() {
        let missing = CategoryPayload::default().into_new();
        let blank = CategoryPayload {
            name: Some(json!("   ")),
        }
        .into_new();
        let long = CategoryPayload {
            name: Some(json!("x".repeat(81))),
        }
        .into_new();
        for (result, message) in [
            (missing, super::super::REQUIRED),
            (blank, super::super::BLANK),
            (long, "Ensure this field has no more than 80 characters."),
        ] {
            match result {
                Err(AppError::Validation(errors)) => {
                    assert_eq!(errors.get("name"), Some(&[message.to_string()][..]))
                }
                other => panic!("expected validation error, got {other:?}"),
            }
        }
        assert!(CategoryPayload {
            name: Some(json!("é".repeat(80)))
        }
        .into_new()
        .is_ok());
    }

    #[test]
    fn null_and_number_names() {
        let payload: CategoryPayload = serde_json::from_value(json!({ "name": null })).unwrap();
        match payload.into_new() {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.get("name"), Some(&[super::super::NULL.to_string()][..]))
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        let payload: CategoryPayload = serde_json::from_value(json!({ "name": 2024 })).unwrap();
        assert_eq!(payload.into_new().unwrap().name, "2024");
        let payload: CategoryPayload = serde_json::from_value(json!({ "name": [] })).unwrap();
        assert!(payload.into_new().is_err());
    }

    #[test]
    fn merge_keeps_current_name() {
        let current = Category {
            id: 4,
            name: "Rent".into(),
        };
        let merged = CategoryPayload::default().merge(&current).unwrap();
        assert_eq!(merged.name, "Rent");
        let renamed = CategoryPayload {
            name: Some(json!("Housing")),
        }
        .merge(&current)
        .unwrap();
        assert_eq!(renamed.name, "Housing");
    }
}
