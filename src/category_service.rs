use std::sync::Arc;

use crate::models::{Category, CategoryPayload};
use crate::storage::Storage;
use crate::{AppError, Result};

#[derive(Clone)]
pub struct CategoryService {
    storage: Arc<dyn Storage>,
}

impl CategoryService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        CategoryService { storage }
    }
    pub async fn list(&self) -> Result<Vec<Category>> {
        self.storage.list_categories().await
    }
    pub async fn get(&self, id: i64) -> Result<Category> {
        self.storage
            .get_category(id)
            .await?
            .ok_or(AppError::NotFound)
    }
    pub async fn create(&self, payload: CategoryPayload) -> Result<Category> {
        self.storage.create_category(payload.into_new()?).await
    }
    pub async fn update(&self, id: i64, payload: CategoryPayload) -> Result<Category> {
        self.get(id).await?;
        self.storage.update_category(id, payload.into_new()?).await
    }
    pub async fn partial_update(&self, id: i64, payload: CategoryPayload) -> Result<Category> {
        let current = self.get(id).await?;
        let merged = payload.merge(&current)?;
        if merged.name == current.name {
            return Ok(current);
        }
        self.storage.update_category(id, merged).await
    }
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.storage.delete_category(id).await
    }
}
