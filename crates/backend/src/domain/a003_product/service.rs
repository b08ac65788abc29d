use contracts::domain::a003_product::{
    Pagination, Product, ProductDto, ProductFilterQuery, ProductListQuery, ProductListResponse,
    VariantDto,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use std::collections::HashSet;

use super::{image_repository, repository, stock_repository, tree, variant_repository};
use repository::NewProduct;

fn to_new_product(dto: &ProductDto) -> NewProduct {
    NewProduct {
        name: dto.name.trim().to_string(),
        description: dto.description.clone(),
        price: dto.price,
        category_id: dto.category_id,
    }
}

/// Загрузить деревья товаров по id (порядок как у `ids`)
async fn load_products<C: ConnectionTrait>(db: &C, ids: &[i64]) -> anyhow::Result<Vec<Product>> {
    let rows = repository::load_tree_rows(db, ids).await?;
    let mut products = tree::assemble(rows);
    products.sort_by_key(|p| ids.iter().position(|id| *id == p.id));
    Ok(products)
}

/// Постраничный список товаров
pub async fn list_paginated(
    db: &DatabaseConnection,
    query: &ProductListQuery,
) -> anyhow::Result<ProductListResponse> {
    let limit = query.limit();
    let page = query.page();

    let total = repository::count(db).await?;
    let ids = repository::page_ids(db, limit, query.offset()).await?;
    let data = load_products(db, &ids).await?;

    Ok(ProductListResponse {
        message: "Products retrieved successfully".to_string(),
        data,
        pagination: Pagination::new(limit, page, total),
    })
}

pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> anyhow::Result<Option<Product>> {
    let mut products = load_products(db, &[id]).await?;
    Ok(products.pop())
}

pub async fn filter(
    db: &DatabaseConnection,
    query: &ProductFilterQuery,
) -> anyhow::Result<Vec<Product>> {
    let ids = repository::filter_ids(db, query).await?;
    load_products(db, &ids).await
}

async fn write_variant_children<C: ConnectionTrait>(
    db: &C,
    variant_id: i64,
    variant: &VariantDto,
) -> anyhow::Result<()> {
    for image in &variant.images {
        match image.id {
            Some(image_id) => {
                let found =
                    image_repository::update(db, image_id, variant_id, &image.url, image.order_index)
                        .await?;
                if !found {
                    anyhow::bail!("Image {} does not belong to variant {}", image_id, variant_id);
                }
            }
            None => {
                image_repository::insert(db, variant_id, &image.url, image.order_index).await?;
            }
        }
    }
    for stock in &variant.stock {
        stock_repository::upsert(db, variant_id, stock.id, stock.quantity).await?;
    }
    Ok(())
}

async fn insert_tree<C: ConnectionTrait>(db: &C, dto: &ProductDto) -> anyhow::Result<i64> {
    let product_id = repository::insert(db, &to_new_product(dto)).await?;
    for variant in &dto.variants {
        let variant_id = variant_repository::insert(db, product_id, variant.color.trim()).await?;
        write_variant_children(db, variant_id, variant).await?;
    }
    Ok(product_id)
}

async fn update_tree<C: ConnectionTrait>(db: &C, id: i64, dto: &ProductDto) -> anyhow::Result<bool> {
    if !repository::update(db, id, &to_new_product(dto)).await? {
        return Ok(false);
    }

    let keep: HashSet<i64> = dto.variants.iter().filter_map(|v| v.id).collect();
    for existing in variant_repository::list_ids_by_product(db, id).await? {
        if !keep.contains(&existing) {
            variant_repository::delete_with_children(db, existing).await?;
        }
    }

    for variant in &dto.variants {
        let color = variant.color.trim();
        let variant_id = match variant.id {
            Some(variant_id) => {
                if !variant_repository::update_color(db, variant_id, id, color).await? {
                    anyhow::bail!("Variant {} does not belong to product {}", variant_id, id);
                }
                variant_id
            }
            None => variant_repository::insert(db, id, color).await?,
        };
        write_variant_children(db, variant_id, variant).await?;
    }
    Ok(true)
}

/// Создание товара со всеми вариантами в одной транзакции
pub async fn create(db: &DatabaseConnection, dto: ProductDto) -> anyhow::Result<i64> {
    dto.validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    let txn = db.begin().await?;
    match insert_tree(&txn, &dto).await {
        Ok(product_id) => {
            txn.commit().await?;
            tracing::info!("Product {} created with {} variants", product_id, dto.variants.len());
            Ok(product_id)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}

/// Обновление товара. Варианты, которых нет в запросе, удаляются.
/// Возвращает false, если товара нет
pub async fn update(db: &DatabaseConnection, dto: ProductDto) -> anyhow::Result<bool> {
    let id = dto
        .id
        .ok_or_else(|| anyhow::anyhow!("Product id is required"))?;
    dto.validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    let txn = db.begin().await?;
    match update_tree(&txn, id, &dto).await {
        Ok(true) => {
            txn.commit().await?;
            tracing::info!("Product {} updated", id);
            Ok(true)
        }
        Ok(false) => {
            txn.rollback().await?;
            Ok(false)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}

/// Удаление товара с вариантами, изображениями и остатками
pub async fn delete(db: &DatabaseConnection, id: i64) -> anyhow::Result<bool> {
    let txn = db.begin().await?;
    let deleted = repository::delete_cascade(&txn, id).await?;
    txn.commit().await?;
    Ok(deleted)
}
