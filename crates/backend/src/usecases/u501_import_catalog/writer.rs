//! Запись сгруппированного товара: товар -> варианты -> изображения и остатки.
//!
//! Ошибка варианта пропускает только его дочерние строки, ошибка строки
//! изображения или остатка пропускает только эту строку.

use contracts::usecases::u501_import_catalog::response::{
    ProductOutcome, RowFailure, RowKind, VariantOutcome,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::error::ImportError;
use super::grouping::GroupedProduct;
use super::store::CatalogStore;
use crate::domain::a003_product::repository::NewProduct;

/// Все, что известно о товаре к моменту записи
#[derive(Debug, Default)]
pub struct WriteContext {
    pub category_id: Option<i64>,
    /// Имя размера -> id или причина, по которой размер не получен
    pub size_ids: HashMap<String, Result<i64, String>>,
    /// Цвет варианта -> файлы, которые не удалось загрузить
    pub upload_failures: HashMap<String, Vec<RowFailure>>,
}

pub struct CatalogWriter {
    store: Arc<dyn CatalogStore>,
}

impl CatalogWriter {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn write_product(&self, product: &GroupedProduct, ctx: &WriteContext) -> ProductOutcome {
        let new_product = NewProduct {
            name: product.name.clone(),
            description: Some(product.description.clone()).filter(|d| !d.is_empty()),
            price: product.price,
            category_id: ctx.category_id,
        };

        let product_id = match self.store.insert_product(&new_product).await {
            Ok(id) => id,
            Err(e) => {
                let err = ImportError::write("product", e);
                tracing::error!("Product '{}': {}", product.name, err);
                return ProductOutcome::failed(&product.name, err.to_string());
            }
        };

        let mut outcome = ProductOutcome::new(&product.name);
        outcome.product_id = Some(product_id);

        for variant in product.variants.values() {
            let mut v = VariantOutcome::new(&variant.color_hex);
            if let Some(failures) = ctx.upload_failures.get(&variant.color_hex) {
                v.failures.extend(failures.iter().cloned());
            }

            let variant_id = match self.store.insert_variant(product_id, &variant.color_hex).await {
                Ok(id) => id,
                Err(e) => {
                    let err = ImportError::write("variant", e);
                    tracing::error!(
                        "Product '{}' variant {}: {}",
                        product.name,
                        variant.color_hex,
                        err
                    );
                    v.fail(err.to_string());
                    outcome.variants.push(v);
                    continue;
                }
            };
            v.variant_id = Some(variant_id);

            for image in &variant.images {
                match self
                    .store
                    .insert_image(variant_id, &image.url, image.order_index)
                    .await
                {
                    Ok(_) => v.images_written += 1,
                    Err(e) => {
                        tracing::warn!("Image {} of variant {}: {}", image.url, variant_id, e);
                        v.add_failure(RowKind::Image, &image.url, e.to_string());
                    }
                }
            }

            for line in &variant.stock {
                let size_id = match ctx.size_ids.get(&line.size_name) {
                    Some(Ok(id)) => *id,
                    Some(Err(reason)) => {
                        v.add_failure(RowKind::Size, &line.size_name, reason.clone());
                        continue;
                    }
                    None => {
                        v.add_failure(RowKind::Size, &line.size_name, "size was not resolved");
                        continue;
                    }
                };
                match self
                    .store
                    .insert_stock(variant_id, size_id, line.quantity)
                    .await
                {
                    Ok(_) => v.stock_written += 1,
                    Err(e) => {
                        tracing::warn!(
                            "Stock {} of variant {}: {}",
                            line.size_name,
                            variant_id,
                            e
                        );
                        v.add_failure(RowKind::Stock, &line.size_name, e.to_string());
                    }
                }
            }

            outcome.variants.push(v);
        }

        outcome.settle();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::super::grouping::{GroupedVariant, StockLine, UploadedImage};
    use super::super::store::SeaOrmCatalogStore;
    use super::super::test_support::CountingStore;
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use contracts::usecases::u501_import_catalog::response::OutcomeStatus;
    use indexmap::IndexMap;

    fn variant(color: &str, images: usize, sizes: &[&str]) -> GroupedVariant {
        GroupedVariant {
            color_hex: color.into(),
            image_folder: color.into(),
            images: (1..=images)
                .map(|i| UploadedImage {
                    url: format!("{}/{}", color, i),
                    order_index: i as i32,
                })
                .collect(),
            stock: sizes
                .iter()
                .map(|s| StockLine {
                    size_name: s.to_string(),
                    quantity: 1,
                })
                .collect(),
        }
    }

    fn product(name: &str, variants: Vec<GroupedVariant>) -> GroupedProduct {
        let mut map = IndexMap::new();
        for v in variants {
            map.insert(v.color_hex.clone(), v);
        }
        GroupedProduct {
            name: name.into(),
            description: String::new(),
            price: 10.0,
            category_name: "Tops".into(),
            variants: map,
        }
    }

    async fn context(store: &CountingStore<SeaOrmCatalogStore>) -> WriteContext {
        let category_id = store.create_category("Tops").await.unwrap();
        let s = store.create_size("S", category_id).await.unwrap();
        let mut ctx = WriteContext {
            category_id: Some(category_id),
            ..Default::default()
        };
        ctx.size_ids.insert("S".into(), Ok(s));
        ctx.size_ids.insert("XL".into(), Err("locked".into()));
        ctx
    }

    #[tokio::test]
    async fn test_failed_variant_does_not_block_siblings() {
        let store = Arc::new(
            CountingStore::new(SeaOrmCatalogStore::new(connect_in_memory().await))
                .fail_variant("#BAD"),
        );
        let ctx = context(&store).await;
        let writer = CatalogWriter::new(store.clone());

        let shirt = product(
            "Shirt",
            vec![
                variant("#BAD", 2, &["S"]),
                variant("#FFF", 2, &["S", "XL"]),
            ],
        );
        let outcome = writer.write_product(&shirt, &ctx).await;

        assert!(outcome.product_id.is_some());
        assert_eq!(outcome.status, OutcomeStatus::Partial);
        assert_eq!(outcome.variants[0].status, OutcomeStatus::Failed);
        assert_eq!(outcome.variants[0].images_written, 0);

        let white = &outcome.variants[1];
        assert_eq!(white.status, OutcomeStatus::Partial);
        assert_eq!(white.images_written, 2);
        assert_eq!(white.stock_written, 1);
        assert_eq!(white.failures.len(), 1);
        assert_eq!(white.failures[0].kind, RowKind::Size);

        // дочерние строки упавшего варианта не пытались записать
        assert_eq!(store.inserts("image"), 2);
        assert_eq!(store.inserts("stock"), 1);

        let hat = product("Hat", vec![variant("#000", 1, &["S"])]);
        let outcome = writer.write_product(&hat, &ctx).await;
        assert_eq!(outcome.status, OutcomeStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_failed_product_row() {
        let store = Arc::new(
            CountingStore::new(SeaOrmCatalogStore::new(connect_in_memory().await))
                .fail_product("Broken"),
        );
        let ctx = context(&store).await;
        let writer = CatalogWriter::new(store.clone());

        let outcome = writer
            .write_product(&product("Broken", vec![variant("#FFF", 1, &["S"])]), &ctx)
            .await;
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert!(outcome.variants.is_empty());
        assert_eq!(store.inserts("variant"), 0);
    }
}
