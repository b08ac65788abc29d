use contracts::usecases::u501_import_catalog::response::{
    ImportReport, ImportResponse, ProductOutcome, RowFailure, RowKind,
};
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_import_catalog::ImportCatalog;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::archive::{self, ImageFolderMap};
use super::error::ImportError;
use super::grouping::{self, GroupedProduct};
use super::lookup::LookupResolver;
use super::spreadsheet::{self, ParsedSheet};
use super::store::CatalogStore;
use super::uploader::AssetUploader;
use super::writer::{CatalogWriter, WriteContext};
use crate::shared::assets::AssetStore;

/// Этапы импорта
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Received,
    Extracted,
    Parsed,
    Grouped,
    ResolveLookups,
    UploadAssets,
    Write,
    Completed,
    Rejected,
    Failed,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStage::Received => "received",
            ImportStage::Extracted => "extracted",
            ImportStage::Parsed => "parsed",
            ImportStage::Grouped => "grouped",
            ImportStage::ResolveLookups => "resolve_lookups",
            ImportStage::UploadAssets => "upload_assets",
            ImportStage::Write => "write",
            ImportStage::Completed => "completed",
            ImportStage::Rejected => "rejected",
            ImportStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Executor для UseCase импорта каталога из таблицы и архива изображений
pub struct ImportExecutor {
    store: Arc<dyn CatalogStore>,
    assets: Arc<dyn AssetStore>,
    temp_root: PathBuf,
    root_folder: String,
}

impl ImportExecutor {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        assets: Arc<dyn AssetStore>,
        temp_root: PathBuf,
        root_folder: impl Into<String>,
    ) -> Self {
        Self {
            store,
            assets,
            temp_root,
            root_folder: root_folder.into(),
        }
    }

    /// Импортировать каталог. Отклоняется только при нечитаемых файлах,
    /// сбой диска на сервере дает failed, ошибки отдельных товаров и строк
    /// попадают в отчет
    pub async fn import_catalog(&self, spreadsheet: Vec<u8>, archive: Vec<u8>) -> ImportResponse {
        let import_id = uuid::Uuid::new_v4();
        tracing::info!(
            "{} {}: {} bytes spreadsheet, {} bytes archive",
            ImportCatalog::full_name(),
            import_id,
            spreadsheet.len(),
            archive.len()
        );
        stage(import_id, ImportStage::Received);

        match self.run(import_id, spreadsheet, archive).await {
            Ok(report) => {
                stage(import_id, ImportStage::Completed);
                tracing::info!(
                    "Import {}: {} products written, {} failed, {} rows failed",
                    import_id,
                    report.products_written,
                    report.products_failed,
                    report.rows_failed()
                );
                ImportResponse::completed(report)
            }
            Err(e) if e.is_input_error() => {
                stage(import_id, ImportStage::Rejected);
                tracing::warn!("Import {} rejected: {}", import_id, e);
                ImportResponse::rejected(e.to_string())
            }
            Err(e) => {
                stage(import_id, ImportStage::Failed);
                tracing::error!("Import {} failed: {}", import_id, e);
                ImportResponse::failed(format!("Import failed: {}", e))
            }
        }
    }

    async fn run(
        &self,
        import_id: uuid::Uuid,
        spreadsheet_bytes: Vec<u8>,
        archive_bytes: Vec<u8>,
    ) -> Result<ImportReport, ImportError> {
        std::fs::create_dir_all(&self.temp_root)?;
        // Каталог удаляется при выходе из функции на любом пути
        let temp_dir = tempfile::Builder::new()
            .prefix("catalog-import-")
            .tempdir_in(&self.temp_root)?;
        let dest = temp_dir.path().join("archive");

        let folders = run_blocking(move || archive::extract_image_groups(archive_bytes, &dest)).await?;
        stage(import_id, ImportStage::Extracted);

        let sheet: ParsedSheet = run_blocking(move || spreadsheet::parse_rows(spreadsheet_bytes)).await?;
        stage(import_id, ImportStage::Parsed);

        let grouping = grouping::group_rows(&sheet.rows);
        stage(import_id, ImportStage::Grouped);

        let mut report = ImportReport::new(sheet.rows_read);
        report.warnings.extend(sheet.warnings);
        report.warnings.extend(grouping.warnings);

        let mut resolver = LookupResolver::new(self.store.clone());
        let uploader = AssetUploader::new(self.assets.clone());
        let writer = CatalogWriter::new(self.store.clone());

        for (_, mut product) in grouping.products {
            stage(import_id, ImportStage::ResolveLookups);
            let mut ctx = match resolve_lookups(&mut resolver, &product).await {
                Ok(ctx) => ctx,
                Err(e) => {
                    tracing::error!("Import {}: product '{}' skipped: {}", import_id, product.name, e);
                    report.push_product(ProductOutcome::failed(&product.name, e.to_string()));
                    continue;
                }
            };

            stage(import_id, ImportStage::UploadAssets);
            self.upload_assets(&uploader, &folders, &mut product, &mut ctx, &mut report)
                .await;

            stage(import_id, ImportStage::Write);
            let outcome = writer.write_product(&product, &ctx).await;
            report.push_product(outcome);
        }

        report.finish();
        // temp_dir удаляется здесь
        drop(temp_dir);
        Ok(report)
    }

    async fn upload_assets(
        &self,
        uploader: &AssetUploader,
        folders: &ImageFolderMap,
        product: &mut GroupedProduct,
        ctx: &mut WriteContext,
        report: &mut ImportReport,
    ) {
        for variant in product.variants.values_mut() {
            let Some(files) = folders.get(&variant.image_folder) else {
                report.warn(format!(
                    "Product '{}' variant {}: image folder '{}' not found in archive",
                    product.name, variant.color_hex, variant.image_folder
                ));
                continue;
            };

            let namespace = format!("{}/{}", self.root_folder, variant.image_folder);
            let upload = uploader.upload_group(files, &namespace).await;
            variant.images = upload.images;

            if !upload.failures.is_empty() {
                let failures = upload
                    .failures
                    .into_iter()
                    .map(|e| match e {
                        ImportError::Upload { file, reason } => RowFailure {
                            kind: RowKind::Upload,
                            key: file,
                            reason,
                        },
                        other => RowFailure {
                            kind: RowKind::Upload,
                            key: variant.image_folder.clone(),
                            reason: other.to_string(),
                        },
                    })
                    .collect();
                ctx.upload_failures.insert(variant.color_hex.clone(), failures);
            }
        }
    }
}

/// Категория товара и размеры всех его остатков.
/// Ошибка категории делает товар незаписываемым, ошибка размера - только строку
async fn resolve_lookups(
    resolver: &mut LookupResolver,
    product: &GroupedProduct,
) -> Result<WriteContext, ImportError> {
    let mut ctx = WriteContext::default();
    if product.category_name.is_empty() {
        return Err(ImportError::Lookup {
            entity: "category",
            name: String::new(),
            reason: format!("product '{}' has no category", product.name),
        });
    }
    let category_id = resolver.resolve_category(&product.category_name).await?;
    ctx.category_id = Some(category_id);

    for variant in product.variants.values() {
        for line in &variant.stock {
            if ctx.size_ids.contains_key(&line.size_name) {
                continue;
            }
            let resolved = resolver
                .resolve_size(&line.size_name, category_id)
                .await
                .map_err(|e| e.to_string());
            ctx.size_ids.insert(line.size_name.clone(), resolved);
        }
    }
    Ok(ctx)
}

fn stage(import_id: uuid::Uuid, stage: ImportStage) {
    tracing::debug!("Import {}: stage {}", import_id, stage);
}

async fn run_blocking<T, F>(f: F) -> Result<T, ImportError>
where
    F: FnOnce() -> Result<T, ImportError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ImportError::Io(std::io::Error::other(e)))?
}

#[cfg(test)]
mod tests {
    use super::super::store::SeaOrmCatalogStore;
    use super::super::test_support::{build_xlsx, build_zip, Cell, CountingStore, FakeAssetStore};
    use super::*;
    use crate::domain::a003_product::service;
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a003_product::ProductListQuery;
    use contracts::usecases::u501_import_catalog::response::{ImportStatus, OutcomeStatus};
    use sea_orm::DatabaseConnection;

    fn shirt_rows() -> Vec<Vec<Cell>> {
        vec![
            vec![Cell::T("Shirt"), Cell::T("desc"), Cell::T("Tops"), Cell::N(100.0), Cell::T("#FFF"), Cell::T("S"), Cell::N(5.0), Cell::T("f1")],
            vec![Cell::T("Shirt"), Cell::T("desc"), Cell::T("Tops"), Cell::N(100.0), Cell::T("#FFF"), Cell::T("M"), Cell::N(3.0), Cell::T("f1")],
            vec![Cell::T("Shirt"), Cell::T("desc"), Cell::T("Tops"), Cell::N(100.0), Cell::T("#000"), Cell::T("S"), Cell::N(2.0), Cell::T("f2")],
        ]
    }

    fn shirt_archive() -> Vec<u8> {
        build_zip(&[
            ("f1/1.jpg", Some(b"one".as_slice())),
            ("f1/2.jpg", Some(b"two".as_slice())),
            ("f2/", None),
        ])
    }

    struct Harness {
        db: DatabaseConnection,
        assets: Arc<FakeAssetStore>,
        temp: tempfile::TempDir,
        executor: ImportExecutor,
    }

    async fn harness(store_wrap: impl FnOnce(SeaOrmCatalogStore) -> Arc<dyn CatalogStore>) -> Harness {
        let db = connect_in_memory().await;
        let assets = Arc::new(FakeAssetStore::default());
        let temp = tempfile::tempdir().unwrap();
        let executor = ImportExecutor::new(
            store_wrap(SeaOrmCatalogStore::new(db.clone())),
            assets.clone(),
            temp.path().join("imports"),
            "productos",
        );
        Harness {
            db,
            assets,
            temp,
            executor,
        }
    }

    fn temp_is_clean(h: &Harness) -> bool {
        std::fs::read_dir(h.temp.path().join("imports"))
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }

    #[tokio::test]
    async fn test_shirt_end_to_end() {
        let h = harness(|s| Arc::new(s) as Arc<dyn CatalogStore>).await;

        let response = h
            .executor
            .import_catalog(build_xlsx(&shirt_rows()), shirt_archive())
            .await;
        assert_eq!(response.status, ImportStatus::Ok);
        assert_eq!(response.message, "Products imported successfully");

        let report = response.report.unwrap();
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.products_written, 1);
        assert_eq!(report.images_written, 2);
        assert_eq!(report.stock_written, 3);

        let listed = service::list_paginated(&h.db, &ProductListQuery::default())
            .await
            .unwrap();
        assert_eq!(listed.data.len(), 1);
        let shirt = &listed.data[0];
        assert_eq!(shirt.name, "Shirt");
        assert_eq!(shirt.price, 100.0);
        assert_eq!(shirt.variants.len(), 2);

        let white = &shirt.variants[0];
        assert_eq!(white.color, "#FFF");
        let stock: Vec<(&str, i32)> = white.stock.iter().map(|s| (s.name.as_str(), s.quantity)).collect();
        assert_eq!(stock, vec![("S", 5), ("M", 3)]);
        let urls: Vec<&str> = white.images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["productos/f1/1", "productos/f1/2"]);

        let black = &shirt.variants[1];
        assert_eq!(black.color, "#000");
        assert_eq!(black.stock.len(), 1);
        assert_eq!(black.stock[0].name, "S");
        assert_eq!(black.stock[0].quantity, 2);
        assert!(black.images.is_empty());

        // S у обоих вариантов - один размер
        assert_eq!(white.stock[0].id, black.stock[0].id);
        assert_eq!(h.assets.uploaded().len(), 2);
        assert!(temp_is_clean(&h));
    }

    #[tokio::test]
    async fn test_missing_folder_gives_empty_images_and_warning() {
        let h = harness(|s| Arc::new(s) as Arc<dyn CatalogStore>).await;
        let archive = build_zip(&[("f1/1.jpg", Some(b"one".as_slice()))]);

        let response = h.executor.import_catalog(build_xlsx(&shirt_rows()), archive).await;
        let report = response.report.unwrap();
        assert!(!report.has_errors());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("'f2'"));
        assert_eq!(report.products[0].variants[1].images_written, 0);
        assert_eq!(report.products[0].variants[1].stock_written, 1);
    }

    #[tokio::test]
    async fn test_nan_price_is_written_as_zero() {
        let h = harness(|s| Arc::new(s) as Arc<dyn CatalogStore>).await;
        let rows = vec![vec![
            Cell::T("Shirt"), Cell::T("desc"), Cell::T("Tops"), Cell::T("NaN"),
            Cell::T("#FFF"), Cell::T("S"), Cell::N(5.0), Cell::T("f1"),
        ]];

        let response = h.executor.import_catalog(build_xlsx(&rows), shirt_archive()).await;
        let report = response.report.unwrap();
        assert_eq!(report.products_written, 1);
        assert_eq!(report.products[0].status, OutcomeStatus::Succeeded);
        assert!(report.warnings.iter().any(|w| w.contains("invalid price 'NaN'")));

        let shirt = service::get_by_id(&h.db, 1).await.unwrap().unwrap();
        assert_eq!(shirt.price, 0.0);
    }

    #[tokio::test]
    async fn test_failures_are_isolated_and_reported() {
        let h = harness(|s| {
            let store = CountingStore::new(s)
                .fail_variant("#000")
                .fail_product("Broken");
            Arc::new(store) as Arc<dyn CatalogStore>
        })
        .await;
        let mut rows = shirt_rows();
        rows.push(vec![Cell::T("Broken"), Cell::T(""), Cell::T("Tops"), Cell::N(1.0), Cell::T("#F00"), Cell::T("S"), Cell::N(1.0), Cell::T("f1")]);
        rows.push(vec![Cell::T("Hat"), Cell::T(""), Cell::T("Caps"), Cell::N(1.0), Cell::T("#F00"), Cell::T("M"), Cell::N(4.0), Cell::T("f1")]);

        let response = h.executor.import_catalog(build_xlsx(&rows), shirt_archive()).await;
        assert_eq!(response.status, ImportStatus::Ok);
        assert_ne!(response.message, "Products imported successfully");

        let report = response.report.unwrap();
        assert_eq!(report.products_total, 3);
        assert_eq!(report.products_written, 2);
        assert_eq!(report.products_failed, 1);
        assert_eq!(report.variants_failed, 1);

        let statuses: Vec<OutcomeStatus> = report.products.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![OutcomeStatus::Partial, OutcomeStatus::Failed, OutcomeStatus::Succeeded]
        );

        let filter = contracts::domain::a003_product::ProductFilterQuery {
            name: Some("Hat".into()),
            ..Default::default()
        };
        let hats = service::filter(&h.db, &filter).await.unwrap();
        assert_eq!(hats.len(), 1);
        assert_eq!(hats[0].variants[0].images.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_failures_reach_report() {
        let db = connect_in_memory().await;
        let temp = tempfile::tempdir().unwrap();
        let executor = ImportExecutor::new(
            Arc::new(SeaOrmCatalogStore::new(db)),
            Arc::new(FakeAssetStore::failing_on(&["2"])),
            temp.path().to_path_buf(),
            "productos",
        );

        let response = executor
            .import_catalog(build_xlsx(&shirt_rows()), shirt_archive())
            .await;
        let report = response.report.unwrap();
        assert_eq!(report.images_written, 1);
        assert_eq!(report.images_failed, 1);
        let white = &report.products[0].variants[0];
        assert_eq!(white.status, OutcomeStatus::Partial);
        assert_eq!(white.failures[0].key, "2.jpg");
    }

    #[tokio::test]
    async fn test_unreadable_inputs_are_rejected() {
        let h = harness(|s| Arc::new(s) as Arc<dyn CatalogStore>).await;

        let response = h
            .executor
            .import_catalog(build_xlsx(&shirt_rows()), b"not a zip".to_vec())
            .await;
        assert!(response.is_rejected());
        assert!(response.message.starts_with("Error reading ZIP file"));
        assert!(temp_is_clean(&h));

        let response = h
            .executor
            .import_catalog(b"\xFF\xFE garbage".to_vec(), shirt_archive())
            .await;
        assert!(response.is_rejected());
        assert!(response.message.starts_with("Error reading spreadsheet"));
        assert!(temp_is_clean(&h));
        assert!(h.assets.uploaded().is_empty());
    }

    #[tokio::test]
    async fn test_unwritable_temp_root_is_server_failure() {
        let db = connect_in_memory().await;
        let temp = tempfile::tempdir().unwrap();
        // temp_root указывает на файл - каталог создать нельзя
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let executor = ImportExecutor::new(
            Arc::new(SeaOrmCatalogStore::new(db)),
            Arc::new(FakeAssetStore::default()),
            blocker.join("imports"),
            "productos",
        );

        let response = executor
            .import_catalog(build_xlsx(&shirt_rows()), shirt_archive())
            .await;
        assert_eq!(response.status, ImportStatus::Failed);
        assert!(!response.is_rejected());
        assert!(response.message.starts_with("Import failed"));
    }
}
