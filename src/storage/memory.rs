use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::{
    error::FieldErrors,
    models::{Category, Expense, ExpenseDraft, ExpenseQuery, NewCategory},
    AppError, Result,
};

use super::{missing_category, protected, CategoryStorage, ExpenseStorage, DUPLICATE_CATEGORY};

/// Process-local store used when no database is configured, and in tests
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    categories: BTreeMap<i64, Category>,
    expenses: BTreeMap<i64, StoredExpense>,
    last_category_id: i64,
    last_expense_id: i64,
}

struct StoredExpense {
    id: i64,
    category_id: i64,
    title: String,
    amount: Decimal,
    currency: String,
    expense_date: NaiveDate,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.categories
            .values()
            .any(|c| c.name == name && Some(c.id) != except)
    }
    fn joined(&self, stored: &StoredExpense) -> Expense {
        let category_name = self
            .categories
            .get(&stored.category_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        Expense {
            id: stored.id,
            title: stored.title.clone(),
            amount: stored.amount,
            currency: stored.currency.clone(),
            expense_date: stored.expense_date,
            notes: stored.notes.clone(),
            category: stored.category_id,
            category_name,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

#[async_trait]
impl CategoryStorage for MemoryStorage {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let inner = self.inner.read().await;
        let mut categories: Vec<Category> = inner.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }
    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.inner.read().await.categories.get(&id).cloned())
    }
    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let mut inner = self.inner.write().await;
        if inner.name_taken(&category.name, None) {
            return Err(AppError::Validation(FieldErrors::single(
                "name",
                DUPLICATE_CATEGORY,
            )));
        }
        inner.last_category_id += 1;
        let created = Category {
            id: inner.last_category_id,
            name: category.name,
        };
        inner.categories.insert(created.id, created.clone());
        tracing::info!("created category {} '{}'", created.id, created.name);
        Ok(created)
    }
    async fn update_category(&self, id: i64, category: NewCategory) -> Result<Category> {
        let mut inner = self.inner.write().await;
        if !inner.categories.contains_key(&id) {
            return Err(AppError::NotFound);
        }
        if inner.name_taken(&category.name, Some(id)) {
            return Err(AppError::Validation(FieldErrors::single(
                "name",
                DUPLICATE_CATEGORY,
            )));
        }
        let updated = Category {
            id,
            name: category.name,
        };
        inner.categories.insert(id, updated.clone());
        Ok(updated)
    }
    async fn delete_category(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.categories.contains_key(&id) {
            return Err(AppError::NotFound);
        }
        if inner.expenses.values().any(|e| e.category_id == id) {
            return Err(protected());
        }
        inner.categories.remove(&id);
        tracing::info!("deleted category {id}");
        Ok(())
    }
}

#[async_trait]
impl ExpenseStorage for MemoryStorage {
    async fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>> {
        let inner = self.inner.read().await;
        let mut expenses: Vec<Expense> = inner
            .expenses
            .values()
            .map(|stored| inner.joined(stored))
            .filter(|expense| query.matches(expense))
            .collect();
        expenses.sort_by(Expense::default_order);
        Ok(query.window(expenses))
    }
    async fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let inner = self.inner.read().await;
        Ok(inner.expenses.get(&id).map(|stored| inner.joined(stored)))
    }
    async fn create_expense(&self, expense: ExpenseDraft) -> Result<Expense> {
        let mut inner = self.inner.write().await;
        if !inner.categories.contains_key(&expense.category_id) {
            return Err(missing_category(expense.category_id));
        }
        inner.last_expense_id += 1;
        let now = Utc::now();
        let stored = StoredExpense {
            id: inner.last_expense_id,
            category_id: expense.category_id,
            title: expense.title,
            amount: expense.amount,
            currency: expense.currency,
            expense_date: expense.expense_date,
            notes: expense.notes,
            created_at: now,
            updated_at: now,
        };
        let created = inner.joined(&stored);
        inner.expenses.insert(stored.id, stored);
        tracing::info!("created expense {} in category {}", created.id, created.category);
        Ok(created)
    }
    async fn update_expense(&self, id: i64, expense: ExpenseDraft) -> Result<Expense> {
        let mut inner = self.inner.write().await;
        if !inner.categories.contains_key(&expense.category_id) {
            return Err(missing_category(expense.category_id));
        }
        let stored = inner.expenses.get_mut(&id).ok_or(AppError::NotFound)?;
        stored.category_id = expense.category_id;
        stored.title = expense.title;
        stored.amount = expense.amount;
        stored.currency = expense.currency;
        stored.expense_date = expense.expense_date;
        stored.notes = expense.notes;
        stored.updated_at = Utc::now().max(stored.updated_at);
        let inner = &*inner;
        inner
            .expenses
            .get(&id)
            .map(|stored| inner.joined(stored))
            .ok_or(AppError::NotFound)
    }
    async fn delete_expense(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.expenses.remove(&id).ok_or(AppError::NotFound)?;
        tracing::info!("deleted expense {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(category_id: i64, title: &str, cents: i64, date: (i32, u32, u32)) -> ExpenseDraft {
        ExpenseDraft {
            category_id,
            title: title.to_string(),
            amount: Decimal::new(cents, 2),
            currency: "INR".to_string(),
            expense_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            notes: String::new(),
        }
    }

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn categories_are_unique_and_sorted() {
        let storage = MemoryStorage::new();
        let rent = storage.create_category(new_category("Rent")).await.unwrap();
        storage.create_category(new_category("Food")).await.unwrap();
        let duplicate = storage.create_category(new_category("Rent")).await;
        assert!(matches!(duplicate, Err(AppError::Validation(e)) if e.contains("name")));
        let names: Vec<String> = storage
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Food", "Rent"]);
        let renamed = storage
            .update_category(rent.id, new_category("Rent"))
            .await
            .unwrap();
        assert_eq!(renamed.id, rent.id);
        assert!(matches!(
            storage.update_category(99, new_category("X")).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn referenced_category_is_protected() {
        let storage = MemoryStorage::new();
        let food = storage.create_category(new_category("Food")).await.unwrap();
        let empty = storage.create_category(new_category("Empty")).await.unwrap();
        let expense = storage
            .create_expense(draft(food.id, "Lunch", 1250, (2024, 1, 5)))
            .await
            .unwrap();
        assert!(matches!(
            storage.delete_category(food.id).await,
            Err(AppError::Protected(_))
        ));
        storage.delete_category(empty.id).await.unwrap();
        storage.delete_expense(expense.id).await.unwrap();
        storage.delete_category(food.id).await.unwrap();
        assert!(matches!(
            storage.delete_category(food.id).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn expenses_join_names_and_keep_order() {
        let storage = MemoryStorage::new();
        let food = storage.create_category(new_category("Food")).await.unwrap();
        let first = storage
            .create_expense(draft(food.id, "Old", 100, (2024, 1, 1)))
            .await
            .unwrap();
        let second = storage
            .create_expense(draft(food.id, "Same day", 200, (2024, 3, 1)))
            .await
            .unwrap();
        let third = storage
            .create_expense(draft(food.id, "Same day later", 300, (2024, 3, 1)))
            .await
            .unwrap();
        assert_eq!(first.category_name, "Food");
        let ids: Vec<i64> = storage
            .list_expenses(&ExpenseQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, [third.id, second.id, first.id]);

        storage
            .update_category(food.id, new_category("Groceries"))
            .await
            .unwrap();
        let fetched = storage.get_expense(first.id).await.unwrap().unwrap();
        assert_eq!(fetched.category_name, "Groceries");
    }

    #[tokio::test]
    async fn update_checks_category_and_bumps_timestamp() {
        let storage = MemoryStorage::new();
        let food = storage.create_category(new_category("Food")).await.unwrap();
        let created = storage
            .create_expense(draft(food.id, "Lunch", 100, (2024, 1, 1)))
            .await
            .unwrap();
        let missing = storage
            .update_expense(created.id, draft(42, "Lunch", 100, (2024, 1, 1)))
            .await;
        assert!(matches!(missing, Err(AppError::Validation(e)) if e.contains("category")));
        let updated = storage
            .update_expense(created.id, draft(food.id, "Dinner", 900, (2024, 1, 1)))
            .await
            .unwrap();
        assert_eq!(updated.title, "Dinner");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert!(matches!(
            storage
                .update_expense(77, draft(food.id, "Ghost", 1, (2024, 1, 1)))
                .await,
            Err(AppError::NotFound)
        ));
    }
}
