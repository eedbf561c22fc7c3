use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::{
    models::{Expense, ExpenseDraft, ExpenseQuery},
    AppError, Result,
};

use super::{is_foreign_key_violation, missing_category, ExpenseStorage, PgStorage};

const EXPENSE_COLUMNS: &str = "e.id, e.title, e.amount, e.currency, e.expense_date, e.notes, \
     e.category_id, c.name AS category_name, e.created_at, e.updated_at";

fn select_expenses() -> String {
    format!("SELECT {EXPENSE_COLUMNS} FROM expenses e JOIN categories c ON c.id = e.category_id")
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl ExpenseStorage for PgStorage {
    async fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>> {
        let mut builder = QueryBuilder::<Postgres>::new(select_expenses());
        builder.push(" WHERE TRUE");
        if let Some(category) = query.category {
            builder.push(" AND e.category_id = ").push_bind(category);
        }
        if let Some(currency) = query.currency_code() {
            builder.push(" AND upper(e.currency) = ").push_bind(currency);
        }
        if let Some(term) = query.search_term() {
            let pattern = format!("%{}%", escape_like(term));
            builder
                .push(" AND (e.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.notes ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder.push(" ORDER BY e.expense_date DESC, e.id DESC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }
        if let Some(offset) = query.offset {
            builder.push(" OFFSET ").push_bind(offset);
        }
        let results = builder
            .build_query_as::<Expense>()
            .fetch_all(&self.pool)
            .await?;
        Ok(results)
    }
    async fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let query = format!("{} WHERE e.id = $1", select_expenses());
        let result = sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(result)
    }
    async fn create_expense(&self, expense: ExpenseDraft) -> Result<Expense> {
        let query = format!(
            "WITH e AS (
                INSERT INTO expenses (category_id, title, amount, currency, expense_date, notes)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT {EXPENSE_COLUMNS} FROM e JOIN categories c ON c.id = e.category_id"
        );
        let category_id = expense.category_id;
        let created = sqlx::query_as::<_, Expense>(&query)
            .bind(expense.category_id)
            .bind(expense.title)
            .bind(expense.amount)
            .bind(expense.currency)
            .bind(expense.expense_date)
            .bind(expense.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    missing_category(category_id)
                } else {
                    e.into()
                }
            })?;
        tracing::info!("created expense {} in category {}", created.id, created.category);
        Ok(created)
    }
    async fn update_expense(&self, id: i64, expense: ExpenseDraft) -> Result<Expense> {
        let query = format!(
            "WITH e AS (
                UPDATE expenses
                SET category_id = $1, title = $2, amount = $3, currency = $4,
                    expense_date = $5, notes = $6, updated_at = GREATEST(now(), updated_at)
                WHERE id = $7
                RETURNING *
            )
            SELECT {EXPENSE_COLUMNS} FROM e JOIN categories c ON c.id = e.category_id"
        );
        let category_id = expense.category_id;
        sqlx::query_as::<_, Expense>(&query)
            .bind(expense.category_id)
            .bind(expense.title)
            .bind(expense.amount)
            .bind(expense.currency)
            .bind(expense.expense_date)
            .bind(expense.notes)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    missing_category(category_id)
                } else {
                    e.into()
                }
            })?
            .ok_or(AppError::NotFound)
    }
    async fn delete_expense(&self, id: i64) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(AppError::NotFound);
        }
        tracing::info!("deleted expense {id}");
        Ok(())
    }
}
