use std::sync::Arc;

use crate::error::FieldErrors;
use crate::models::{Expense, ExpenseDraft, ExpensePatch, ExpensePayload, ExpenseQuery};
use crate::storage::{missing_category_message, Storage};
use crate::{AppError, Result};

#[derive(Clone)]
pub struct ExpenseService {
    storage: Arc<dyn Storage>,
}

impl ExpenseService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        ExpenseService { storage }
    }
    pub async fn list(&self, query: &ExpenseQuery) -> Result<Vec<Expense>> {
        query.validate()?;
        self.storage.list_expenses(query).await
    }
    pub async fn get(&self, id: i64) -> Result<Expense> {
        self.storage.get_expense(id).await?.ok_or(AppError::NotFound)
    }
    pub async fn create(&self, payload: ExpensePayload) -> Result<Expense> {
        let draft = self.validate(payload, false).await?.into_draft(None)?;
        self.storage.create_expense(draft).await
    }
    pub async fn update(&self, id: i64, payload: ExpensePayload) -> Result<Expense> {
        self.save(id, payload, false).await
    }
    pub async fn partial_update(&self, id: i64, payload: ExpensePayload) -> Result<Expense> {
        self.save(id, payload, true).await
    }
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.storage.delete_expense(id).await
    }

    async fn save(&self, id: i64, payload: ExpensePayload, partial: bool) -> Result<Expense> {
        let current = self.get(id).await?;
        let draft: ExpenseDraft = self
            .validate(payload, partial)
            .await?
            .into_draft(Some(&current))?;
        self.storage.update_expense(id, draft).await
    }

    /// Field checks plus the category lookup, reported together
    async fn validate(&self, payload: ExpensePayload, partial: bool) -> Result<ExpensePatch> {
        let mut errors = FieldErrors::new();
        let patch = payload.parse(partial, &mut errors);
        if let Some(category_id) = patch.category_id {
            if self.storage.get_category(category_id).await?.is_none() {
                errors.add("category", missing_category_message(category_id));
            }
        }
        errors.into_result()?;
        Ok(patch)
    }
}
