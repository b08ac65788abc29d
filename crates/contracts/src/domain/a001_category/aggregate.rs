use serde::{Deserialize, Serialize};

/// Категория товаров (справочник, создается по имени при импорте)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}
