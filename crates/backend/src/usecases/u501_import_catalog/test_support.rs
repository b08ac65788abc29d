//! Общие тестовые заготовки импорта: таблицы и архивы в памяти,
//! подменные хранилища.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Mutex;

use super::spreadsheet::COLUMNS;
use super::store::CatalogStore;
use crate::domain::a003_product::repository::NewProduct;
use crate::shared::assets::{AssetError, AssetStore};

pub enum Cell {
    T(&'static str),
    N(f64),
}

/// xlsx с заголовком импорта и строками данных
pub fn build_xlsx(rows: &[Vec<Cell>]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (r as u32 + 1, c as u16);
            match cell {
                Cell::T(s) => sheet.write_string(r, c, *s).unwrap(),
                Cell::N(n) => sheet.write_number(r, c, *n).unwrap(),
            };
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// zip из (путь, содержимое); `None` - каталог
pub fn build_zip(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, content) in entries {
        match content {
            Some(bytes) => {
                writer.start_file(*name, options).unwrap();
                writer.write_all(bytes).unwrap();
            }
            None => {
                writer.add_directory(*name, options).unwrap();
            }
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Хранилище ассетов в памяти. Возвращает "<folder>/<public_id>"
#[derive(Default)]
pub struct FakeAssetStore {
    fail: HashSet<String>,
    uploaded: Mutex<Vec<String>>,
}

impl FakeAssetStore {
    pub fn failing_on(public_ids: &[&str]) -> Self {
        Self {
            fail: public_ids.iter().map(|s| s.to_string()).collect(),
            uploaded: Mutex::new(Vec::new()),
        }
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for FakeAssetStore {
    async fn upload(&self, _path: &Path, folder: &str, public_id: &str) -> Result<String, AssetError> {
        if self.fail.contains(public_id) {
            return Err(AssetError::Rejected(format!("{} refused", public_id)));
        }
        let id = format!("{}/{}", folder, public_id);
        self.uploaded.lock().unwrap().push(id.clone());
        Ok(id)
    }

    fn provider_name(&self) -> &str {
        "fake"
    }
}

/// Обертка над хранилищем каталога: считает вставки и роняет выбранные
pub struct CountingStore<S> {
    inner: S,
    fail_products: HashSet<String>,
    fail_variants: HashSet<String>,
    inserts: Mutex<HashMap<&'static str, usize>>,
}

impl<S: CatalogStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_products: HashSet::new(),
            fail_variants: HashSet::new(),
            inserts: Mutex::new(HashMap::new()),
        }
    }

    pub fn fail_product(mut self, name: &str) -> Self {
        self.fail_products.insert(name.to_string());
        self
    }

    pub fn fail_variant(mut self, color_hex: &str) -> Self {
        self.fail_variants.insert(color_hex.to_string());
        self
    }

    pub fn inserts(&self, entity: &str) -> usize {
        self.inserts.lock().unwrap().get(entity).copied().unwrap_or(0)
    }

    fn count(&self, entity: &'static str) {
        *self.inserts.lock().unwrap().entry(entity).or_insert(0) += 1;
    }
}

#[async_trait]
impl<S: CatalogStore> CatalogStore for CountingStore<S> {
    async fn find_category(&self, name: &str) -> anyhow::Result<Option<i64>> {
        self.inner.find_category(name).await
    }

    async fn create_category(&self, name: &str) -> anyhow::Result<i64> {
        self.count("category");
        self.inner.create_category(name).await
    }

    async fn find_size(&self, name: &str, category_id: i64) -> anyhow::Result<Option<i64>> {
        self.inner.find_size(name, category_id).await
    }

    async fn create_size(&self, name: &str, category_id: i64) -> anyhow::Result<i64> {
        self.count("size");
        self.inner.create_size(name, category_id).await
    }

    async fn insert_product(&self, product: &NewProduct) -> anyhow::Result<i64> {
        if self.fail_products.contains(&product.name) {
            anyhow::bail!("forced failure for product {}", product.name);
        }
        self.count("product");
        self.inner.insert_product(product).await
    }

    async fn insert_variant(&self, product_id: i64, color_hex: &str) -> anyhow::Result<i64> {
        if self.fail_variants.contains(color_hex) {
            anyhow::bail!("forced failure for variant {}", color_hex);
        }
        self.count("variant");
        self.inner.insert_variant(product_id, color_hex).await
    }

    async fn insert_image(&self, variant_id: i64, url: &str, order_index: i32) -> anyhow::Result<i64> {
        self.count("image");
        self.inner.insert_image(variant_id, url, order_index).await
    }

    async fn insert_stock(&self, variant_id: i64, size_id: i64, quantity: i32) -> anyhow::Result<i64> {
        self.count("stock");
        self.inner.insert_stock(variant_id, size_id, quantity).await
    }
}
