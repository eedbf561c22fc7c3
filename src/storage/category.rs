use async_trait::async_trait;

use crate::{
    error::FieldErrors,
    models::{Category, NewCategory},
    AppError, Result,
};

use super::{
    is_foreign_key_violation, is_unique_violation, protected, CategoryStorage, PgStorage,
    DUPLICATE_CATEGORY,
};

fn duplicate_or(error: sqlx::Error) -> AppError {
    if is_unique_violation(&error) {
        AppError::Validation(FieldErrors::single("name", DUPLICATE_CATEGORY))
    } else {
        error.into()
    }
}

#[async_trait]
impl CategoryStorage for PgStorage {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let query = "SELECT id, name FROM categories ORDER BY name, id";
        let result = sqlx::query_as::<_, Category>(query)
            .fetch_all(&self.pool)
            .await?;
        Ok(result)
    }
    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let query = "SELECT id, name FROM categories WHERE id = $1";
        let result = sqlx::query_as::<_, Category>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(result)
    }
    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let query = "INSERT INTO categories (name) VALUES ($1) RETURNING id, name";
        let created = sqlx::query_as::<_, Category>(query)
            .bind(category.name)
            .fetch_one(&self.pool)
            .await
            .map_err(duplicate_or)?;
        tracing::info!("created category {} '{}'", created.id, created.name);
        Ok(created)
    }
    async fn update_category(&self, id: i64, category: NewCategory) -> Result<Category> {
        let query = "UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name";
        sqlx::query_as::<_, Category>(query)
            .bind(category.name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(duplicate_or)?
            .ok_or(AppError::NotFound)
    }
    async fn delete_category(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let references: i64 =
            sqlx::query_scalar("SELECT count(*) FROM expenses WHERE category_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if references > 0 {
            return Err(protected());
        }
        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    protected()
                } else {
                    e.into()
                }
            })?
            .rows_affected();
        if deleted == 0 {
            return Err(AppError::NotFound);
        }
        tx.commit().await?;
        tracing::info!("deleted category {id}");
        Ok(())
    }
}
