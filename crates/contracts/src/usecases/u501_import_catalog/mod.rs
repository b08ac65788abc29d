pub mod response;

pub use response::{
    ImportReport, ImportResponse, ImportStatus, OutcomeStatus, ProductOutcome, RowFailure,
    RowKind, VariantOutcome,
};

use crate::usecases::common::UseCaseMetadata;

pub struct ImportCatalog;

impl UseCaseMetadata for ImportCatalog {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "import_catalog"
    }

    fn display_name() -> &'static str {
        "Импорт каталога из Excel + ZIP"
    }

    fn description() -> &'static str {
        "Загрузка товаров, вариантов, остатков и изображений из таблицы и архива папок с фото"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert_eq!(ImportCatalog::full_name(), "u501_import_catalog");
    }
}
