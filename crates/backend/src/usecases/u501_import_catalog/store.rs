//! Запись каталога для импорта.
//!
//! Импорт работает через трейт, чтобы в тестах подменять хранилище
//! (в том числе с принудительными отказами).

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::a003_product::repository::NewProduct;
use crate::domain::a003_product::{image_repository, repository, stock_repository, variant_repository};
use crate::domain::{a001_category, a002_size};

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_category(&self, name: &str) -> anyhow::Result<Option<i64>>;
    async fn create_category(&self, name: &str) -> anyhow::Result<i64>;
    async fn find_size(&self, name: &str, category_id: i64) -> anyhow::Result<Option<i64>>;
    async fn create_size(&self, name: &str, category_id: i64) -> anyhow::Result<i64>;
    async fn insert_product(&self, product: &NewProduct) -> anyhow::Result<i64>;
    async fn insert_variant(&self, product_id: i64, color_hex: &str) -> anyhow::Result<i64>;
    async fn insert_image(&self, variant_id: i64, url: &str, order_index: i32)
        -> anyhow::Result<i64>;
    async fn insert_stock(&self, variant_id: i64, size_id: i64, quantity: i32)
        -> anyhow::Result<i64>;
}

/// Хранилище каталога в SQLite
pub struct SeaOrmCatalogStore {
    db: DatabaseConnection,
}

impl SeaOrmCatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for SeaOrmCatalogStore {
    async fn find_category(&self, name: &str) -> anyhow::Result<Option<i64>> {
        Ok(a001_category::repository::find_by_name(&self.db, name)
            .await?
            .map(|c| c.id))
    }

    async fn create_category(&self, name: &str) -> anyhow::Result<i64> {
        a001_category::repository::insert(&self.db, name).await
    }

    async fn find_size(&self, name: &str, category_id: i64) -> anyhow::Result<Option<i64>> {
        Ok(a002_size::repository::find(&self.db, name, category_id)
            .await?
            .map(|s| s.id))
    }

    async fn create_size(&self, name: &str, category_id: i64) -> anyhow::Result<i64> {
        a002_size::repository::insert(&self.db, name, category_id).await
    }

    async fn insert_product(&self, product: &NewProduct) -> anyhow::Result<i64> {
        repository::insert(&self.db, product).await
    }

    async fn insert_variant(&self, product_id: i64, color_hex: &str) -> anyhow::Result<i64> {
        variant_repository::insert(&self.db, product_id, color_hex).await
    }

    async fn insert_image(
        &self,
        variant_id: i64,
        url: &str,
        order_index: i32,
    ) -> anyhow::Result<i64> {
        image_repository::insert(&self.db, variant_id, url, order_index).await
    }

    async fn insert_stock(
        &self,
        variant_id: i64,
        size_id: i64,
        quantity: i32,
    ) -> anyhow::Result<i64> {
        stock_repository::insert(&self.db, variant_id, size_id, quantity).await
    }
}
