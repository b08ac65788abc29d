use serde::{Deserialize, Serialize};

/// Размер, привязанный к категории.
/// Одно и то же имя в разных категориях - разные записи.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
}
