//! Get-or-create категорий и размеров.
//!
//! Кэш живет одну сессию импорта. От гонки между параллельными импортами
//! защищают UNIQUE-ограничения в БД: если вставка упала, значение
//! перечитывается.

use std::collections::HashMap;
use std::sync::Arc;

use super::error::ImportError;
use super::store::CatalogStore;

pub struct LookupResolver {
    store: Arc<dyn CatalogStore>,
    categories: HashMap<String, i64>,
    sizes: HashMap<(String, i64), i64>,
}

impl LookupResolver {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            categories: HashMap::new(),
            sizes: HashMap::new(),
        }
    }

    pub async fn resolve_category(&mut self, name: &str) -> Result<i64, ImportError> {
        if let Some(id) = self.categories.get(name) {
            return Ok(*id);
        }

        let lookup_error = |e: anyhow::Error| ImportError::Lookup {
            entity: "category",
            name: name.to_string(),
            reason: e.to_string(),
        };

        let id = match self.store.find_category(name).await.map_err(lookup_error)? {
            Some(id) => id,
            None => match self.store.create_category(name).await {
                Ok(id) => {
                    tracing::info!("Created category '{}' (id {})", name, id);
                    id
                }
                Err(insert_err) => self
                    .store
                    .find_category(name)
                    .await
                    .map_err(lookup_error)?
                    .ok_or_else(|| lookup_error(insert_err))?,
            },
        };

        self.categories.insert(name.to_string(), id);
        Ok(id)
    }

    pub async fn resolve_size(&mut self, name: &str, category_id: i64) -> Result<i64, ImportError> {
        let key = (name.to_string(), category_id);
        if let Some(id) = self.sizes.get(&key) {
            return Ok(*id);
        }

        let lookup_error = |e: anyhow::Error| ImportError::Lookup {
            entity: "size",
            name: name.to_string(),
            reason: e.to_string(),
        };

        let id = match self
            .store
            .find_size(name, category_id)
            .await
            .map_err(lookup_error)?
        {
            Some(id) => id,
            None => match self.store.create_size(name, category_id).await {
                Ok(id) => {
                    tracing::info!("Created size '{}' in category {} (id {})", name, category_id, id);
                    id
                }
                Err(insert_err) => self
                    .store
                    .find_size(name, category_id)
                    .await
                    .map_err(lookup_error)?
                    .ok_or_else(|| lookup_error(insert_err))?,
            },
        };

        self.sizes.insert(key, id);
        Ok(id)
    }
}
