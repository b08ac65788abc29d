use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Итог запроса импорта: "ok" - конвейер дошел до конца (возможно с ошибками
/// отдельных строк, см. `report`), "rejected" - таблица или архив не читаются,
/// "failed" - сбой на стороне сервера (диск, временный каталог).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Ok,
    Rejected,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub status: ImportStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ImportReport>,
}

impl ImportResponse {
    pub fn completed(report: ImportReport) -> Self {
        let message = if report.has_errors() {
            format!(
                "Products imported with errors: {} of {} products written, {} rows failed",
                report.products_written,
                report.products_total,
                report.rows_failed()
            )
        } else {
            "Products imported successfully".to_string()
        };
        Self {
            status: ImportStatus::Ok,
            message,
            report: Some(report),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: ImportStatus::Rejected,
            message: message.into(),
            report: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ImportStatus::Failed,
            message: message.into(),
            report: None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.status == ImportStatus::Rejected
    }
}

/// Результат записи одной сущности
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded,
    /// Сущность записана, но часть дочерних строк потеряна
    Partial,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Upload,
    Image,
    Size,
    Stock,
}

/// Строка, которую не удалось записать
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFailure {
    pub kind: RowKind,
    /// Имя файла или размера
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantOutcome {
    pub color_hex: String,
    pub variant_id: Option<i64>,
    pub status: OutcomeStatus,
    pub error: Option<String>,
    pub images_written: usize,
    pub stock_written: usize,
    #[serde(default)]
    pub failures: Vec<RowFailure>,
}

impl VariantOutcome {
    pub fn new(color_hex: impl Into<String>) -> Self {
        Self {
            color_hex: color_hex.into(),
            variant_id: None,
            status: OutcomeStatus::Succeeded,
            error: None,
            images_written: 0,
            stock_written: 0,
            failures: Vec::new(),
        }
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = OutcomeStatus::Failed;
        self.error = Some(error.into());
    }

    pub fn add_failure(&mut self, kind: RowKind, key: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(RowFailure {
            kind,
            key: key.into(),
            reason: reason.into(),
        });
    }

    /// Пересчитать статус после записи дочерних строк
    pub fn settle(&mut self) {
        if self.status == OutcomeStatus::Failed {
            return;
        }
        self.status = if self.failures.is_empty() {
            OutcomeStatus::Succeeded
        } else {
            OutcomeStatus::Partial
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOutcome {
    pub name: String,
    pub product_id: Option<i64>,
    pub status: OutcomeStatus,
    pub error: Option<String>,
    #[serde(default)]
    pub variants: Vec<VariantOutcome>,
}

impl ProductOutcome {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            product_id: None,
            status: OutcomeStatus::Succeeded,
            error: None,
            variants: Vec::new(),
        }
    }

    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        let mut outcome = Self::new(name);
        outcome.status = OutcomeStatus::Failed;
        outcome.error = Some(error.into());
        outcome
    }

    pub fn settle(&mut self) {
        if self.status == OutcomeStatus::Failed {
            return;
        }
        for variant in &mut self.variants {
            variant.settle();
        }
        self.status = if self
            .variants
            .iter()
            .all(|v| v.status == OutcomeStatus::Succeeded)
        {
            OutcomeStatus::Succeeded
        } else {
            OutcomeStatus::Partial
        };
    }
}

/// Отчет импорта по товарам и вариантам
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    pub rows_read: usize,
    pub products_total: usize,
    pub products_written: usize,
    pub products_failed: usize,
    pub variants_written: usize,
    pub variants_failed: usize,
    pub images_written: usize,
    pub images_failed: usize,
    pub stock_written: usize,
    pub stock_failed: usize,

    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub products: Vec<ProductOutcome>,
}

impl ImportReport {
    pub fn new(rows_read: usize) -> Self {
        Self {
            started_at: Utc::now(),
            completed_at: None,
            rows_read,
            products_total: 0,
            products_written: 0,
            products_failed: 0,
            variants_written: 0,
            variants_failed: 0,
            images_written: 0,
            images_failed: 0,
            stock_written: 0,
            stock_failed: 0,
            warnings: Vec::new(),
            products: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Добавить итог по товару и обновить счетчики
    pub fn push_product(&mut self, mut outcome: ProductOutcome) {
        outcome.settle();
        self.products_total += 1;
        if outcome.status == OutcomeStatus::Failed {
            self.products_failed += 1;
        } else {
            self.products_written += 1;
        }
        for variant in &outcome.variants {
            if variant.status == OutcomeStatus::Failed {
                self.variants_failed += 1;
            } else {
                self.variants_written += 1;
            }
            self.images_written += variant.images_written;
            self.stock_written += variant.stock_written;
            for failure in &variant.failures {
                match failure.kind {
                    RowKind::Upload | RowKind::Image => self.images_failed += 1,
                    RowKind::Size | RowKind::Stock => self.stock_failed += 1,
                }
            }
        }
        self.products.push(outcome);
    }

    pub fn finish(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn rows_failed(&self) -> usize {
        self.images_failed + self.stock_failed
    }

    pub fn has_errors(&self) -> bool {
        self.products_failed > 0 || self.variants_failed > 0 || self.rows_failed() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_partial_product() {
        let mut ok_variant = VariantOutcome::new("#FFF");
        ok_variant.variant_id = Some(1);
        ok_variant.images_written = 2;
        ok_variant.stock_written = 2;

        let mut bad_variant = VariantOutcome::new("#000");
        bad_variant.fail("insert failed");

        let mut product = ProductOutcome::new("Shirt");
        product.product_id = Some(10);
        product.variants = vec![ok_variant, bad_variant];

        let mut report = ImportReport::new(3);
        report.push_product(product);

        assert_eq!(report.products_written, 1);
        assert_eq!(report.variants_written, 1);
        assert_eq!(report.variants_failed, 1);
        assert_eq!(report.images_written, 2);
        assert_eq!(report.products[0].status, OutcomeStatus::Partial);
        assert!(report.has_errors());
    }

    #[test]
    fn test_row_failures_make_variant_partial() {
        let mut variant = VariantOutcome::new("#FFF");
        variant.add_failure(RowKind::Upload, "1.jpg", "rejected");
        variant.add_failure(RowKind::Stock, "M", "constraint");

        let mut product = ProductOutcome::new("Shirt");
        product.variants.push(variant);

        let mut report = ImportReport::new(1);
        report.push_product(product);

        assert_eq!(report.products[0].variants[0].status, OutcomeStatus::Partial);
        assert_eq!(report.images_failed, 1);
        assert_eq!(report.stock_failed, 1);
        assert_eq!(report.rows_failed(), 2);
    }

    #[test]
    fn test_response_serializes_status_lowercase() {
        let response = ImportResponse::rejected("Error reading ZIP file");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "rejected");
        assert!(value.get("report").is_none());

        let value = serde_json::to_value(ImportResponse::failed("disk full")).unwrap();
        assert_eq!(value["status"], "failed");

        let response = ImportResponse::completed(ImportReport::new(0));
        assert_eq!(response.status, ImportStatus::Ok);
        assert_eq!(response.message, "Products imported successfully");
    }
}
