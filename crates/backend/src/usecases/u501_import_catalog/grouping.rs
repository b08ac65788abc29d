//! Свертка плоских строк в дерево товар -> вариант (цвет) -> остатки (размер).
//!
//! Первая строка побеждает: описание, цена, категория товара и папка
//! изображений варианта берутся из первого появления, повтор размера
//! в варианте игнорируется.

use indexmap::IndexMap;
use std::collections::HashSet;

use super::spreadsheet::ImportRow;

#[derive(Debug, Clone, PartialEq)]
pub struct StockLine {
    pub size_name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    pub url: String,
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedVariant {
    pub color_hex: String,
    pub image_folder: String,
    /// Заполняется после загрузки изображений
    pub images: Vec<UploadedImage>,
    pub stock: Vec<StockLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_name: String,
    /// По цвету, в порядке первого появления
    pub variants: IndexMap<String, GroupedVariant>,
}

#[derive(Debug, Default)]
pub struct Grouping {
    pub products: IndexMap<String, GroupedProduct>,
    pub warnings: Vec<String>,
}

pub fn group_rows(rows: &[ImportRow]) -> Grouping {
    let mut grouping = Grouping::default();
    let mut reported: HashSet<(String, String)> = HashSet::new();

    for row in rows {
        let product = grouping
            .products
            .entry(row.name.clone())
            .or_insert_with(|| GroupedProduct {
                name: row.name.clone(),
                description: row.description.clone(),
                price: row.price,
                category_name: row.category.clone(),
                variants: IndexMap::new(),
            });

        if product.category_name != row.category
            && reported.insert((row.name.clone(), row.category.clone()))
        {
            grouping.warnings.push(format!(
                "Product '{}' listed under category '{}' and '{}', rows merged into '{}'",
                row.name, product.category_name, row.category, product.category_name
            ));
        }

        let variant = product
            .variants
            .entry(row.color_hex.clone())
            .or_insert_with(|| GroupedVariant {
                color_hex: row.color_hex.clone(),
                image_folder: row.folder_name.clone(),
                images: Vec::new(),
                stock: Vec::new(),
            });

        if row.size.is_empty() {
            continue;
        }
        if !variant.stock.iter().any(|s| s.size_name == row.size) {
            variant.stock.push(StockLine {
                size_name: row.size.clone(),
                quantity: row.quantity,
            });
        }
    }

    grouping
}
