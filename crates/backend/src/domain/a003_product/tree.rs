//! Сборка дерева товар -> варианты -> изображения / остатки из плоских
//! строк LEFT JOIN.
//!
//! Строки JOIN дают декартово произведение изображений и остатков одного
//! варианта, поэтому изображения схлопываются по id, а остатки по id размера.
//! Пустые стороны LEFT JOIN (NULL) в результат не попадают.

use contracts::domain::a003_product::{Product, ProductImage, ProductVariant, StockEntry};
use indexmap::IndexMap;
use sea_orm::FromQueryResult;

#[derive(Debug, Clone, Default, FromQueryResult)]
pub struct ProductJoinRow {
    pub product_id: i64,
    pub product_name: String,
    pub product_category_id: Option<i64>,
    pub product_description: Option<String>,
    pub product_price: f64,
    pub variant_id: Option<i64>,
    pub variant_color: Option<String>,
    pub image_id: Option<i64>,
    pub image_url: Option<String>,
    pub image_order_index: Option<i32>,
    pub size_id: Option<i64>,
    pub quantity: Option<i32>,
    pub size_name: Option<String>,
}

#[derive(Default)]
struct VariantAcc {
    color: String,
    images: IndexMap<i64, ProductImage>,
    stock: IndexMap<i64, StockEntry>,
}

struct ProductAcc {
    product: Product,
    variants: IndexMap<i64, VariantAcc>,
}

/// Собрать товары в порядке первого появления в строках
pub fn assemble(rows: Vec<ProductJoinRow>) -> Vec<Product> {
    let mut products: IndexMap<i64, ProductAcc> = IndexMap::new();

    for row in rows {
        let acc = products.entry(row.product_id).or_insert_with(|| ProductAcc {
            product: Product {
                id: row.product_id,
                category_id: row.product_category_id,
                name: row.product_name.clone(),
                description: row.product_description.clone(),
                price: row.product_price,
                variants: Vec::new(),
            },
            variants: IndexMap::new(),
        });

        let Some(variant_id) = row.variant_id else {
            continue;
        };
        let variant = acc.variants.entry(variant_id).or_insert_with(|| VariantAcc {
            color: row.variant_color.clone().unwrap_or_default(),
            ..Default::default()
        });

        if let (Some(image_id), Some(url)) = (row.image_id, row.image_url.as_ref()) {
            variant.images.entry(image_id).or_insert_with(|| ProductImage {
                id: image_id,
                url: url.clone(),
                order_index: row.image_order_index.unwrap_or(0),
            });
        }

        if let Some(size_id) = row.size_id {
            variant.stock.entry(size_id).or_insert_with(|| StockEntry {
                id: size_id,
                name: row.size_name.clone().unwrap_or_default(),
                quantity: row.quantity.unwrap_or(0),
            });
        }
    }

    products
        .into_values()
        .map(|acc| {
            let mut product = acc.product;
            product.variants = acc
                .variants
                .into_iter()
                .map(|(id, v)| {
                    let mut images: Vec<ProductImage> = v.images.into_values().collect();
                    images.sort_by_key(|i| (i.order_index, i.id));
                    ProductVariant {
                        id,
                        color: v.color,
                        images,
                        stock: v.stock.into_values().collect(),
                    }
                })
                .collect();
            product
        })
        .collect()
}
