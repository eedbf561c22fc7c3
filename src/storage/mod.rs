mod category;
mod expense;
mod memory;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub use memory::MemoryStorage;

use crate::{
    error::FieldErrors,
    models::{Category, Expense, ExpenseDraft, ExpenseQuery, NewCategory},
    AppError, Result,
};

pub(crate) const DUPLICATE_CATEGORY: &str = "category with this name already exists.";

#[async_trait]
pub trait CategoryStorage: Send + Sync {
    /// All categories ordered by name
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>>;
    async fn create_category(&self, category: NewCategory) -> Result<Category>;
    async fn update_category(&self, id: i64, category: NewCategory) -> Result<Category>;
    /// Fails with [`AppError::Protected`] while expenses still reference the category
    async fn delete_category(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait ExpenseStorage: Send + Sync {
    /// Filtered expenses, newest `expense_date` first
    async fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>>;
    async fn get_expense(&self, id: i64) -> Result<Option<Expense>>;
    async fn create_expense(&self, expense: ExpenseDraft) -> Result<Expense>;
    async fn update_expense(&self, id: i64, expense: ExpenseDraft) -> Result<Expense>;
    async fn delete_expense(&self, id: i64) -> Result<()>;
}

/// Everything the services need from a backend
pub trait Storage: CategoryStorage + ExpenseStorage {}
impl<T: CategoryStorage + ExpenseStorage> Storage for T {}

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}
impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
    pub async fn connect(url: &str, max_connections: u32) -> Result<Arc<Self>> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        let storage = Self::new(pool);
        storage.migrate().await?;
        Ok(Arc::new(storage))
    }
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!().run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }
}

pub(crate) fn protected() -> AppError {
    AppError::Protected(
        "Cannot delete this category because it is referenced by existing expenses.".into(),
    )
}

pub(crate) fn missing_category_message(id: i64) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

pub(crate) fn missing_category(id: i64) -> AppError {
    AppError::Validation(FieldErrors::single(
        "category",
        missing_category_message(id),
    ))
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(e) if e.is_unique_violation())
}

fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(e) if e.is_foreign_key_violation())
}
